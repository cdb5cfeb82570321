//! Quiz Selector: uniform random pick from the active question pool with
//! client-side exclusion and per-type option normalization.

use std::collections::HashSet;
use std::time::Duration;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::db::operations::quiz::{self, QuizQuestionRow};
use crate::db::DatabaseProxy;

const POOL_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Question types whose `options` carry structure the client interprets
/// itself; their payload is passed through untouched, never flattened or
/// shuffled.
pub const STRUCTURED_OPTION_TYPES: [&str; 3] = ["matching", "cloze_test", "error_correction"];

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("no quiz questions available{} (pool size {pool_size})",
            .level.as_deref().map(|l| format!(" for level {l}")).unwrap_or_default())]
    Exhausted {
        level: Option<String>,
        pool_size: usize,
    },
    #[error("quiz pool fetch timed out")]
    Timeout,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i32,
    pub question_type: String,
    pub hsk_level: String,
    pub question: String,
    pub pinyin: Option<String>,
    pub correct_answer: String,
    pub options: Option<Value>,
    pub acceptable_answers: Option<Value>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub lesson_id: Option<i32>,
    pub total_questions_in_pool_before_exclusion: usize,
}

/// Accepts `"3"` and `"hsk3"`/`"HSK3"` spellings; everything normalizes to
/// the stored `HSK<n>` form. Blank input means no level filter.
pub fn normalize_level(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("HSK{trimmed}"));
    }
    Some(trimmed.to_uppercase())
}

/// Lenient comma-separated id list; non-numeric fragments are dropped.
pub fn parse_exclude(raw: &str) -> HashSet<i32> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i32>().ok())
        .collect()
}

/// Uniform pick over the non-excluded questions. Exhaustion reports the
/// pre-exclusion pool size so the client can tell "level empty" from
/// "everything already seen".
pub fn choose_question<'a, R: Rng>(
    pool: &'a [QuizQuestionRow],
    exclude: &HashSet<i32>,
    level: Option<&str>,
    rng: &mut R,
) -> Result<&'a QuizQuestionRow, QuizError> {
    let candidates: Vec<&QuizQuestionRow> =
        pool.iter().filter(|q| !exclude.contains(&q.id)).collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| QuizError::Exhausted {
            level: level.map(str::to_string),
            pool_size: pool.len(),
        })
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Flattens the stored options into plain display strings: arrays keep
/// element order, `{"text": ...}` wrappers are unwrapped, keyed objects
/// contribute their values.
pub fn flatten_options(options: &Value) -> Vec<String> {
    match options {
        Value::Array(items) => items.iter().map(display_string).collect(),
        Value::Object(map) => map.values().map(display_string).collect(),
        other => vec![display_string(other)],
    }
}

/// Normalizes `options` for delivery. Structured types pass through
/// verbatim; everything else is flattened to strings and shuffled with an
/// unbiased Fisher-Yates so the correct answer's position carries no signal.
pub fn prepare_options<R: Rng>(
    question_type: &str,
    options: Option<&Value>,
    rng: &mut R,
) -> Option<Value> {
    let options = options?;
    if STRUCTURED_OPTION_TYPES.contains(&question_type) {
        return Some(options.clone());
    }

    let mut flat = flatten_options(options);
    flat.shuffle(rng);
    Some(Value::Array(flat.into_iter().map(Value::String).collect()))
}

fn build_question<R: Rng>(row: &QuizQuestionRow, pool_size: usize, rng: &mut R) -> QuizQuestion {
    QuizQuestion {
        id: row.id,
        question_type: row.question_type.clone(),
        hsk_level: row.hsk_level.clone(),
        question: row.question.clone(),
        pinyin: row.pinyin.clone(),
        correct_answer: row.correct_answer.clone(),
        options: prepare_options(&row.question_type, row.options.as_ref(), rng),
        acceptable_answers: row.acceptable_answers.clone(),
        audio_url: row.audio_url.clone(),
        image_url: row.image_url.clone(),
        lesson_id: row.lesson_id,
        total_questions_in_pool_before_exclusion: pool_size,
    }
}

/// Serves the next question. The pool is re-fetched on every call; there is
/// no server-side cursor, the client's exclusion list is the only state.
pub async fn next_question(
    proxy: Option<&DatabaseProxy>,
    level: Option<&str>,
    exclude: &HashSet<i32>,
) -> Result<QuizQuestion, QuizError> {
    let normalized = level.and_then(normalize_level);

    let pool = match proxy {
        Some(proxy) => tokio::time::timeout(
            POOL_FETCH_TIMEOUT,
            quiz::fetch_question_pool(proxy, normalized.as_deref()),
        )
        .await
        .map_err(|_| QuizError::Timeout)??,
        None => Vec::new(),
    };

    let mut rng = rand::rng();
    let picked = choose_question(&pool, exclude, normalized.as_deref(), &mut rng)?;
    Ok(build_question(picked, pool.len(), &mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn row(id: i32, question_type: &str, options: Option<Value>) -> QuizQuestionRow {
        QuizQuestionRow {
            id,
            question_type: question_type.to_string(),
            hsk_level: "HSK1".to_string(),
            question: format!("question {id}"),
            pinyin: None,
            correct_answer: "answer".to_string(),
            options,
            acceptable_answers: None,
            audio_url: None,
            image_url: None,
            lesson_id: None,
        }
    }

    #[test]
    fn level_spellings_normalize() {
        assert_eq!(normalize_level("3"), Some("HSK3".to_string()));
        assert_eq!(normalize_level("hsk3"), Some("HSK3".to_string()));
        assert_eq!(normalize_level(" HSK2 "), Some("HSK2".to_string()));
        assert_eq!(normalize_level(""), None);
        assert_eq!(normalize_level("   "), None);
    }

    #[test]
    fn exclude_list_is_lenient() {
        let parsed = parse_exclude("1, 2,abc, 3,,4");
        assert_eq!(parsed, HashSet::from([1, 2, 3, 4]));
        assert!(parse_exclude("").is_empty());
    }

    #[test]
    fn excluded_ids_are_never_served() {
        let pool = vec![row(1, "multiple_choice", None), row(2, "multiple_choice", None)];
        let exclude = HashSet::from([1]);
        let mut rng = rand::rng();
        for _ in 0..50 {
            let picked = choose_question(&pool, &exclude, None, &mut rng).unwrap();
            assert_eq!(picked.id, 2);
        }
    }

    #[test]
    fn exhaustion_reports_pre_exclusion_pool_size() {
        let pool = vec![row(1, "multiple_choice", None), row(2, "multiple_choice", None)];
        let exclude = HashSet::from([1, 2]);
        let mut rng = rand::rng();
        let err = choose_question(&pool, &exclude, Some("HSK1"), &mut rng).unwrap_err();
        match err {
            QuizError::Exhausted { level, pool_size } => {
                assert_eq!(level.as_deref(), Some("HSK1"));
                assert_eq!(pool_size, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_pool_is_exhausted() {
        let mut rng = rand::rng();
        let err = choose_question(&[], &HashSet::new(), None, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::Exhausted { pool_size: 0, .. }));
    }

    #[test]
    fn structured_options_pass_through_verbatim() {
        let payload = json!({"pairs": [{"left": "你", "right": "you"}]});
        let mut rng = rand::rng();
        for question_type in STRUCTURED_OPTION_TYPES {
            let prepared = prepare_options(question_type, Some(&payload), &mut rng);
            assert_eq!(prepared, Some(payload.clone()));
        }
    }

    #[test]
    fn text_wrappers_are_unwrapped() {
        let options = json!([{"text": "a"}, {"text": "b"}, "c"]);
        let flat = flatten_options(&options);
        assert_eq!(flat, vec!["a", "b", "c"]);
    }

    #[test]
    fn keyed_objects_contribute_values() {
        let options = json!({"a": "apple", "b": "banana"});
        let flat = flatten_options(&options);
        assert_eq!(flat.len(), 2);
        assert!(flat.contains(&"apple".to_string()));
        assert!(flat.contains(&"banana".to_string()));
    }

    #[test]
    fn missing_options_stay_missing() {
        let mut rng = rand::rng();
        assert_eq!(prepare_options("multiple_choice", None, &mut rng), None);
    }

    proptest! {
        #[test]
        fn shuffled_options_are_a_permutation(options in prop::collection::vec("[a-z]{1,8}", 0..12)) {
            let value = Value::Array(options.iter().cloned().map(Value::String).collect());
            let mut rng = rand::rng();
            let prepared = prepare_options("multiple_choice", Some(&value), &mut rng).unwrap();
            let mut served: Vec<String> = prepared
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect();
            let mut expected = options.clone();
            served.sort();
            expected.sort();
            prop_assert_eq!(served, expected);
        }
    }
}

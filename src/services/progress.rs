//! Progress Tracker: per-user, per-lesson section visitation and explicit
//! lesson completion, plus the aggregate user stats.

use serde::Serialize;
use serde_json::json;

use crate::db::operations::progress::{self, LessonProgressRow, VocabProgressRow};
use crate::db::operations::study_sessions;
use crate::db::DatabaseProxy;
use crate::services::study_time;

/// The five fixed lesson sections. Anything else is rejected before any
/// store call.
pub const SECTIONS: [&str; 5] = ["audio", "dialogue", "vocab", "grammar", "practice"];

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub words_learned: i64,
    pub streak: i64,
    pub accuracy: i64,
}

impl UserStats {
    pub fn zero() -> Self {
        Self {
            words_learned: 0,
            streak: 0,
            accuracy: 0,
        }
    }
}

pub fn is_known_section(section: &str) -> bool {
    SECTIONS.contains(&section)
}

/// All five keys present, all false. Used as the insert default so every
/// stored row carries the complete key set.
pub fn default_section_progress() -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for section in SECTIONS {
        map.insert(section.to_string(), json!(false));
    }
    serde_json::Value::Object(map)
}

/// One section set true, every other key untouched. This is the same merge
/// the store applies on the upsert's conflict path.
pub fn merge_section(progress: &serde_json::Value, section: &str) -> serde_json::Value {
    let mut map = progress.as_object().cloned().unwrap_or_default();
    map.insert(section.to_string(), json!(true));
    serde_json::Value::Object(map)
}

/// Sets one section flag to true, preserving the others. Idempotent: marking
/// an already-true section re-executes the write but changes nothing.
pub async fn update_section_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
    section: &str,
) -> Result<LessonProgressRow, ProgressError> {
    if !is_known_section(section) {
        return Err(ProgressError::Validation(format!(
            "unknown section '{section}', expected one of: {}",
            SECTIONS.join(", ")
        )));
    }

    let initial = merge_section(&default_section_progress(), section);
    let row = progress::upsert_section(proxy, user_id, lesson_id, section, &initial).await?;
    Ok(row)
}

/// Completion is an explicit action: no particular section state is required.
pub async fn mark_lesson_complete(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
) -> Result<LessonProgressRow, ProgressError> {
    let row =
        progress::mark_complete(proxy, user_id, lesson_id, &default_section_progress()).await?;
    Ok(row)
}

pub async fn get_lesson_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
) -> Result<Option<LessonProgressRow>, ProgressError> {
    Ok(progress::get_lesson_progress(proxy, user_id, lesson_id).await?)
}

pub async fn list_lesson_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<LessonProgressRow>, ProgressError> {
    Ok(progress::list_lesson_progress(proxy, user_id).await?)
}

pub async fn record_quiz_result(
    proxy: &DatabaseProxy,
    user_id: i64,
    vocabulary_id: i32,
    correct: bool,
) -> Result<VocabProgressRow, ProgressError> {
    Ok(progress::update_vocab_progress(proxy, user_id, vocabulary_id, correct).await?)
}

pub async fn list_vocab_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<VocabProgressRow>, ProgressError> {
    Ok(progress::list_vocab_progress(proxy, user_id).await?)
}

/// Aggregate stats: distinct vocabulary items with any interaction, overall
/// answer accuracy, and the study-session day streak.
pub async fn get_user_stats(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<UserStats, ProgressError> {
    let counts = progress::attempt_counts(proxy, user_id).await?;

    let sessions = study_sessions::list_sessions(proxy, user_id).await?;
    let dates: std::collections::HashSet<chrono::NaiveDate> =
        sessions.iter().map(|s| s.session_date).collect();
    let streak = study_time::current_streak(&dates, chrono::Utc::now().date_naive());

    Ok(UserStats {
        words_learned: counts.len() as i64,
        streak,
        accuracy: compute_accuracy(&counts),
    })
}

/// `round(100 * correct / total)`, 0 when there are no attempts.
pub fn compute_accuracy(counts: &[(i32, i32)]) -> i64 {
    let correct: i64 = counts.iter().map(|&(c, _)| c as i64).sum();
    let incorrect: i64 = counts.iter().map(|&(_, i)| i as i64).sum();
    let total = correct + incorrect;
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sections_are_exactly_five() {
        for section in ["audio", "dialogue", "vocab", "grammar", "practice"] {
            assert!(is_known_section(section));
        }
        assert!(!is_known_section("listening"));
        assert!(!is_known_section(""));
        assert!(!is_known_section("Vocab"));
    }

    #[test]
    fn default_map_has_all_sections_false() {
        let map = default_section_progress();
        let obj = map.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for section in SECTIONS {
            assert_eq!(obj.get(section), Some(&serde_json::json!(false)));
        }
    }

    #[test]
    fn marking_a_section_preserves_the_others() {
        let after_vocab = merge_section(&default_section_progress(), "vocab");
        assert_eq!(after_vocab["vocab"], serde_json::json!(true));
        assert_eq!(after_vocab["audio"], serde_json::json!(false));

        let after_grammar = merge_section(&after_vocab, "grammar");
        assert_eq!(after_grammar["vocab"], serde_json::json!(true));
        assert_eq!(after_grammar["grammar"], serde_json::json!(true));
        assert_eq!(after_grammar["audio"], serde_json::json!(false));
        assert_eq!(after_grammar["dialogue"], serde_json::json!(false));
        assert_eq!(after_grammar["practice"], serde_json::json!(false));
        assert_eq!(after_grammar.as_object().unwrap().len(), 5);
    }

    #[test]
    fn re_marking_a_section_changes_nothing() {
        let once = merge_section(&default_section_progress(), "audio");
        let twice = merge_section(&once, "audio");
        assert_eq!(once, twice);
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        assert_eq!(compute_accuracy(&[]), 0);
        assert_eq!(compute_accuracy(&[(0, 0), (0, 0)]), 0);
    }

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        assert_eq!(compute_accuracy(&[(1, 2)]), 33);
        assert_eq!(compute_accuracy(&[(2, 1)]), 67);
        assert_eq!(compute_accuracy(&[(3, 0), (2, 5)]), 50);
        assert_eq!(compute_accuracy(&[(7, 0)]), 100);
    }
}

//! Study-time aggregation: today's minutes, the current Monday-based week,
//! the consecutive-day streak, and the lifetime total. All aggregates are
//! derived by scanning the append-only session log at read time.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::db::operations::study_sessions::{self, StudySessionRow};
use crate::db::DatabaseProxy;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, thiserror::Error)]
pub enum StudyTimeError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMinutes {
    pub day: &'static str,
    pub date: NaiveDate,
    pub minutes: i64,
    pub is_today: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    pub today_minutes: i64,
    pub week: Vec<DayMinutes>,
    pub streak_days: i64,
    pub total_minutes: i64,
}

impl StudySummary {
    /// What a user with no recorded sessions sees; also the degraded-mode
    /// response when the store is down.
    pub fn empty(today: NaiveDate) -> Self {
        compute_summary(&[], today)
    }
}

pub async fn record_session(
    proxy: &DatabaseProxy,
    user_id: i64,
    activity: &str,
    duration_minutes: i32,
    session_date: Option<NaiveDate>,
) -> Result<StudySessionRow, StudyTimeError> {
    if activity.trim().is_empty() {
        return Err(StudyTimeError::Validation(
            "activity must not be empty".to_string(),
        ));
    }
    if duration_minutes < 0 {
        return Err(StudyTimeError::Validation(
            "durationMinutes must not be negative".to_string(),
        ));
    }

    let date = session_date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let row =
        study_sessions::insert_session(proxy, user_id, activity.trim(), duration_minutes, date)
            .await?;
    Ok(row)
}

pub async fn summarize(proxy: &DatabaseProxy, user_id: i64) -> Result<StudySummary, StudyTimeError> {
    let sessions = study_sessions::list_sessions(proxy, user_id).await?;
    let pairs: Vec<(NaiveDate, i32)> = sessions
        .iter()
        .map(|s| (s.session_date, s.duration_minutes))
        .collect();
    Ok(compute_summary(&pairs, chrono::Utc::now().date_naive()))
}

/// Pure aggregation over (date, minutes) pairs, anchored at `today`.
pub fn compute_summary(sessions: &[(NaiveDate, i32)], today: NaiveDate) -> StudySummary {
    let mut per_day: HashMap<NaiveDate, i64> = HashMap::new();
    let mut total: i64 = 0;
    for &(date, minutes) in sessions {
        *per_day.entry(date).or_insert(0) += minutes as i64;
        total += minutes as i64;
    }

    let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
    let week = (0..7)
        .map(|offset| {
            let date = monday + Days::new(offset);
            DayMinutes {
                day: DAY_NAMES[offset as usize],
                date,
                minutes: per_day.get(&date).copied().unwrap_or(0),
                is_today: date == today,
            }
        })
        .collect();

    let dates: HashSet<NaiveDate> = per_day.keys().copied().collect();

    StudySummary {
        today_minutes: per_day.get(&today).copied().unwrap_or(0),
        week,
        streak_days: current_streak(&dates, today),
        total_minutes: total,
    }
}

/// Consecutive days with at least one session, counted backwards. A streak
/// is still alive if the last session was yesterday; the anchor is today when
/// today has a session, otherwise yesterday.
pub fn current_streak(dates: &HashSet<NaiveDate>, today: NaiveDate) -> i64 {
    let anchor = if dates.contains(&today) {
        today
    } else {
        let yesterday = today - Days::new(1);
        if dates.contains(&yesterday) {
            yesterday
        } else {
            return 0;
        }
    };

    let mut streak = 0;
    let mut cursor = anchor;
    while dates.contains(&cursor) {
        streak += 1;
        match cursor.checked_sub_days(Days::new(1)) {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_summary_has_seven_zero_days() {
        let today = date(2026, 8, 26);
        let summary = StudySummary::empty(today);
        assert_eq!(summary.today_minutes, 0);
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.streak_days, 0);
        assert_eq!(summary.week.len(), 7);
        assert!(summary.week.iter().all(|d| d.minutes == 0));
    }

    #[test]
    fn week_starts_on_monday_and_flags_today() {
        // 2026-08-26 is a Wednesday.
        let today = date(2026, 8, 26);
        let summary = compute_summary(&[], today);
        assert_eq!(summary.week[0].day, "Monday");
        assert_eq!(summary.week[0].date, date(2026, 8, 24));
        assert_eq!(summary.week[6].day, "Sunday");
        assert_eq!(summary.week[6].date, date(2026, 8, 30));
        assert!(summary.week[2].is_today);
        assert_eq!(summary.week.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn minutes_accumulate_per_day() {
        let today = date(2026, 8, 26);
        let sessions = [
            (today, 10),
            (today, 15),
            (date(2026, 8, 24), 20),
            (date(2026, 8, 10), 30),
        ];
        let summary = compute_summary(&sessions, today);
        assert_eq!(summary.today_minutes, 25);
        assert_eq!(summary.week[0].minutes, 20);
        assert_eq!(summary.total_minutes, 75);
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let today = date(2026, 8, 26);
        let dates = HashSet::from([today, date(2026, 8, 25), date(2026, 8, 24), date(2026, 8, 21)]);
        assert_eq!(current_streak(&dates, today), 3);
    }

    #[test]
    fn streak_survives_one_missing_today() {
        let today = date(2026, 8, 26);
        let dates = HashSet::from([date(2026, 8, 25), date(2026, 8, 24)]);
        assert_eq!(current_streak(&dates, today), 2);
    }

    #[test]
    fn streak_breaks_after_a_full_gap_day() {
        let today = date(2026, 8, 26);
        let dates = HashSet::from([date(2026, 8, 24), date(2026, 8, 23)]);
        assert_eq!(current_streak(&dates, today), 0);
    }
}

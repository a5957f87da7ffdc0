//! Raw wire shapes
//!
//! What the backend actually returns, before validation. Conversions
//! into domain types are the schema boundary: anything structurally
//! wrong becomes a field-level validation error, with one exception —
//! an unparseable persisted reminder time degrades to `None` so a single
//! bad string cannot make the whole profile unusable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use gr_core::error::AppError;
use gr_core::journal::{GratitudeEntry, Statements};
use gr_core::profile::{DailyGoal, Profile, ReminderTime};
use gr_core::streak::Streak;
use gr_core::throwback::ThrowbackFrequency;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub onboarding_completed: Option<bool>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub push_token: Option<String>,
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub throwback_enabled: Option<bool>,
    #[serde(default)]
    pub throwback_frequency: Option<String>,
    #[serde(default)]
    pub daily_gratitude_goal: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let reminder_time = match row.reminder_time.as_deref() {
            None => None,
            Some(raw) => match ReminderTime::parse(raw) {
                Ok(time) => Some(time),
                Err(_) => {
                    warn!(raw, "discarding unparseable persisted reminder time");
                    None
                }
            },
        };

        let daily_gratitude_goal = row
            .daily_gratitude_goal
            .map(DailyGoal::try_from)
            .transpose()?;

        Ok(Profile {
            id: row.id,
            username: row.username,
            onboarding_completed: row.onboarding_completed.unwrap_or(false),
            notifications_enabled: row.notifications_enabled.unwrap_or(false),
            push_token: row.push_token,
            reminder_time,
            throwback_enabled: row.throwback_enabled.unwrap_or(false),
            throwback_frequency: row
                .throwback_frequency
                .as_deref()
                .map(ThrowbackFrequency::parse)
                .unwrap_or_default(),
            daily_gratitude_goal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Result shape of the `calculate_streak` RPC.
#[derive(Debug, Clone, Deserialize)]
pub struct StreakRow {
    pub current_streak: i64,
    pub longest_streak: i64,
    #[serde(default)]
    pub last_entry_date: Option<NaiveDate>,
}

impl TryFrom<StreakRow> for Streak {
    type Error = AppError;

    fn try_from(row: StreakRow) -> Result<Self, Self::Error> {
        let counter = |field: &str, value: i64| -> Result<u32, AppError> {
            u32::try_from(value)
                .map_err(|_| AppError::validation(field, format!("{field} out of range: {value}")))
        };

        Ok(Streak {
            current: counter("current_streak", row.current_streak)?,
            longest: counter("longest_streak", row.longest_streak)?,
            last_entry_date: row.last_entry_date,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub statements: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<EntryRow> for GratitudeEntry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(GratitudeEntry {
            id: row.id,
            user_id: row.user_id,
            entry_date: row.entry_date,
            statements: Statements::try_from(row.statements)?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_row() -> ProfileRow {
        serde_json::from_value(serde_json::json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7"
        }))
        .unwrap()
    }

    #[test]
    fn profile_defaults_apply_for_absent_fields() {
        let profile = Profile::try_from(minimal_row()).unwrap();
        assert!(!profile.onboarding_completed);
        assert!(!profile.notifications_enabled);
        assert_eq!(profile.throwback_frequency, ThrowbackFrequency::Weekly);
        assert!(profile.daily_gratitude_goal.is_none());
    }

    #[test]
    fn bad_reminder_time_degrades_to_none() {
        let mut row = minimal_row();
        row.reminder_time = Some("9am".into());
        let profile = Profile::try_from(row).unwrap();
        assert!(profile.reminder_time.is_none());
    }

    #[test]
    fn nonpositive_goal_is_a_validation_error() {
        let mut row = minimal_row();
        row.daily_gratitude_goal = Some(0);
        let err = Profile::try_from(row).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn entry_with_empty_statements_fails_validation() {
        let row = EntryRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            entry_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            statements: vec![],
            created_at: None,
        };
        assert!(GratitudeEntry::try_from(row).is_err());
    }

    #[test]
    fn negative_streak_counter_is_a_validation_error() {
        let row = StreakRow {
            current_streak: -1,
            longest_streak: 3,
            last_entry_date: None,
        };
        assert!(Streak::try_from(row).is_err());
    }
}

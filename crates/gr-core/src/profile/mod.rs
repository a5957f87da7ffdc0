//! Profile domain models
//!
//! The profile is the user's account record: display name, onboarding
//! flag, notification/reminder preferences, throwback preferences and the
//! daily gratitude goal. It is created server-side on signup and only
//! partially updated from the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::throwback::ThrowbackFrequency;

/// Validated daily gratitude goal. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DailyGoal(u32);

impl DailyGoal {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for DailyGoal {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 || value > u32::MAX as i64 {
            return Err(AppError::validation(
                "daily_gratitude_goal",
                "daily_gratitude_goal must be a positive integer",
            ));
        }
        Ok(DailyGoal(value as u32))
    }
}

impl From<DailyGoal> for i64 {
    fn from(goal: DailyGoal) -> Self {
        goal.0 as i64
    }
}

/// A reminder time of day in strict `HH:MM:SS` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ReminderTime {
    pub fn new(hour: u8, minute: u8, second: u8) -> AppResult<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(AppError::validation(
                "reminder_time",
                "reminder_time components out of range",
            ));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Strict `HH:MM:SS` parse. Anything else is a validation error.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let bytes = raw.as_bytes();
        let malformed =
            || AppError::validation("reminder_time", format!("invalid reminder time: {raw:?}"));

        if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
            return Err(malformed());
        }
        let digits = |range: std::ops::Range<usize>| -> AppResult<u8> {
            let part = &raw[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u8>().map_err(|_| malformed())
        };

        Self::new(digits(0..2)?, digits(3..5)?, digits(6..8)?)
    }
}

impl std::str::FromStr for ReminderTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReminderTime> for String {
    fn from(time: ReminderTime) -> Self {
        time.to_string()
    }
}

/// The user's profile as held by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
    pub push_token: Option<String>,
    pub reminder_time: Option<ReminderTime>,
    #[serde(default)]
    pub throwback_enabled: bool,
    #[serde(default)]
    pub throwback_frequency: ThrowbackFrequency,
    pub daily_gratitude_goal: Option<DailyGoal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update payload sent to the backend.
///
/// Fields are raw wire values; `validate` is the client-side schema gate
/// that must pass before any network call is issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throwback_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throwback_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_gratitude_goal: Option<i64>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self == &ProfilePatch::default()
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(goal) = self.daily_gratitude_goal {
            DailyGoal::try_from(goal)?;
        }
        if let Some(time) = self.reminder_time.as_deref() {
            ReminderTime::parse(time)?;
        }
        if let Some(frequency) = self.throwback_frequency.as_deref() {
            if ThrowbackFrequency::parse(frequency) == ThrowbackFrequency::Unknown {
                return Err(AppError::validation(
                    "throwback_frequency",
                    format!("unknown throwback frequency: {frequency:?}"),
                ));
            }
        }
        if let Some(username) = self.username.as_deref() {
            if username.trim().is_empty() {
                return Err(AppError::validation("username", "username must not be empty"));
            }
        }
        Ok(())
    }
}

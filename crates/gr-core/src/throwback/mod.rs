//! Throwback gate
//!
//! Decides whether enough time and enough journal history have
//! accumulated to resurface a past entry. Pure decision logic; the store
//! layer does the fetching.

use serde::{Deserialize, Serialize};

/// Minimum entry counts before a throwback is worth showing.
pub const MIN_ENTRIES_DAILY: u64 = 1;
pub const MIN_ENTRIES_WEEKLY: u64 = 7;
pub const MIN_ENTRIES_MONTHLY: u64 = 15;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Cool-down windows per frequency. Daily is slightly under a full day so
/// a throwback shown at 09:00 is eligible again the next morning.
pub const WINDOW_DAILY_MS: i64 = 23 * HOUR_MS;
pub const WINDOW_WEEKLY_MS: i64 = 7 * DAY_MS;
pub const WINDOW_MONTHLY_MS: i64 = 30 * DAY_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowbackFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
    /// Unrecognized wire value. Never shows.
    #[serde(other)]
    Unknown,
}

impl ThrowbackFrequency {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "daily" => ThrowbackFrequency::Daily,
            "weekly" => ThrowbackFrequency::Weekly,
            "monthly" => ThrowbackFrequency::Monthly,
            _ => ThrowbackFrequency::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThrowbackFrequency::Daily => "daily",
            ThrowbackFrequency::Weekly => "weekly",
            ThrowbackFrequency::Monthly => "monthly",
            ThrowbackFrequency::Unknown => "unknown",
        }
    }

    fn min_entries(&self) -> Option<u64> {
        match self {
            ThrowbackFrequency::Daily => Some(MIN_ENTRIES_DAILY),
            ThrowbackFrequency::Weekly => Some(MIN_ENTRIES_WEEKLY),
            ThrowbackFrequency::Monthly => Some(MIN_ENTRIES_MONTHLY),
            ThrowbackFrequency::Unknown => None,
        }
    }

    fn window_ms(&self) -> Option<i64> {
        match self {
            ThrowbackFrequency::Daily => Some(WINDOW_DAILY_MS),
            ThrowbackFrequency::Weekly => Some(WINDOW_WEEKLY_MS),
            ThrowbackFrequency::Monthly => Some(WINDOW_MONTHLY_MS),
            ThrowbackFrequency::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowbackSkipReason {
    Disabled,
    NotEnoughEntries { required: u64, actual: u64 },
    CoolingDown { remaining_ms: i64 },
    UnknownFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowbackDecision {
    Show,
    Skip(ThrowbackSkipReason),
}

impl ThrowbackDecision {
    pub fn should_show(&self) -> bool {
        matches!(self, ThrowbackDecision::Show)
    }
}

/// Evaluate the throwback gate.
///
/// The content gate is checked before the time gate: below the per-frequency
/// entry threshold no amount of elapsed time makes a throwback eligible.
/// `last_shown_at_ms = None` means "never shown" and passes the time gate.
pub fn evaluate(
    enabled: bool,
    frequency: ThrowbackFrequency,
    total_entries: u64,
    last_shown_at_ms: Option<i64>,
    now_ms: i64,
) -> ThrowbackDecision {
    if !enabled {
        return ThrowbackDecision::Skip(ThrowbackSkipReason::Disabled);
    }

    let (required, window_ms) = match (frequency.min_entries(), frequency.window_ms()) {
        (Some(required), Some(window)) => (required, window),
        _ => return ThrowbackDecision::Skip(ThrowbackSkipReason::UnknownFrequency),
    };

    if total_entries < required {
        return ThrowbackDecision::Skip(ThrowbackSkipReason::NotEnoughEntries {
            required,
            actual: total_entries,
        });
    }

    if let Some(last_shown) = last_shown_at_ms {
        let elapsed = now_ms - last_shown;
        if elapsed < window_ms {
            return ThrowbackDecision::Skip(ThrowbackSkipReason::CoolingDown {
                remaining_ms: window_ms - elapsed,
            });
        }
    }

    ThrowbackDecision::Show
}

//! Streak domain model
//!
//! Streaks are computed server-side and read-only from the client's
//! perspective. A missing streak record is a valid state for new users.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub last_entry_date: Option<NaiveDate>,
}

impl Streak {
    /// Whether the streak is still alive as of `today`: the last entry was
    /// made today or yesterday.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.last_entry_date {
            Some(last) => (today - last).num_days() <= 1,
            None => false,
        }
    }
}

//! Gratitude journal entries
//!
//! One entry per user per calendar date; the backend enforces the
//! `(user_id, entry_date)` uniqueness. The statements list is never empty
//! in validated form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Ordered, non-empty list of non-empty gratitude statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Statements(Vec<String>);

impl Statements {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<String>> for Statements {
    type Error = AppError;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        let trimmed: Vec<String> = raw
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect();
        if trimmed.is_empty() {
            return Err(AppError::validation(
                "statements",
                "at least one statement is required",
            ));
        }
        if trimmed.iter().any(|s| s.is_empty()) {
            return Err(AppError::validation(
                "statements",
                "statements must not be empty",
            ));
        }
        Ok(Statements(trimmed))
    }
}

impl From<Statements> for Vec<String> {
    fn from(statements: Statements) -> Self {
        statements.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratitudeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub statements: Statements,
    pub created_at: Option<DateTime<Utc>>,
}

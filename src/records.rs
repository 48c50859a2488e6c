use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_USERNAME_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 50;

/// Who is playing. Captured by the host before a score can be submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub username: String,
    pub email: String,
}

impl PlayerIdentity {
    /// Both fields present after trimming. Incomplete identities never leave
    /// the host.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// A finished game's result as sent to the score service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub username: String,
    pub email: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

/// A stored leaderboard entry. `date` and `week` are derived from the
/// service clock at ingest time and drive the query scopes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub week: u32,
}

impl ScoreRecord {
    /// Normalize a submission into a record stamped with `now`. Names are
    /// trimmed and truncated rather than rejected; only absent identity
    /// fields fail validation.
    pub fn from_submission(
        submission: &ScoreSubmission,
        now: DateTime<Utc>,
    ) -> Result<ScoreRecord, SubmissionError> {
        let username = clean_field(&submission.username, MAX_USERNAME_LEN);
        if username.is_empty() {
            return Err(SubmissionError::MissingUsername);
        }
        let email = clean_field(&submission.email, MAX_EMAIL_LEN);
        if email.is_empty() {
            return Err(SubmissionError::MissingEmail);
        }

        let date = now.date_naive();
        Ok(ScoreRecord {
            id: now.timestamp_millis(),
            username,
            email,
            score: submission.score,
            level: submission.level.max(1),
            lines: submission.lines,
            timestamp: now,
            date,
            week: iso_week_number(date),
        })
    }
}

fn clean_field(raw: &str, max_len: usize) -> String {
    raw.trim().chars().take(max_len).collect()
}

/// ISO 8601 week number, used so "this week" means the same thing on both
/// sides of a weekend-crossing submission.
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    MissingUsername,
    MissingEmail,
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::MissingUsername => write!(f, "username is required"),
            SubmissionError::MissingEmail => write!(f, "email is required"),
        }
    }
}

impl std::error::Error for SubmissionError {}

/// Time window for a leaderboard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryScope {
    /// Records stamped with today's date.
    #[default]
    Today,
    /// Records from the current ISO week.
    Week,
    /// Everything stored.
    All,
}

impl QueryScope {
    /// Parse the `type` query parameter. Absent means today; anything
    /// unrecognized falls back to the all-time view.
    pub fn from_param(param: Option<&str>) -> QueryScope {
        match param {
            None => QueryScope::Today,
            Some("today") => QueryScope::Today,
            Some("week") => QueryScope::Week,
            Some(_) => QueryScope::All,
        }
    }
}

pub const DEFAULT_QUERY_LIMIT: usize = 10;

/// Seam between the game host and whatever stores scores, so tests can run
/// against an in-memory double.
pub trait Leaderboard {
    type Error: std::error::Error;

    /// Ingest a submission, returning the normalized stored record.
    fn append(
        &mut self,
        submission: &ScoreSubmission,
        now: DateTime<Utc>,
    ) -> Result<ScoreRecord, Self::Error>;

    /// Top records for a scope, best first, at most `limit` entries.
    fn query(&self, scope: QueryScope, limit: usize, today: NaiveDate) -> Vec<ScoreRecord>;
}

/// Wire shape of a successful submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub score: ScoreRecord,
}

/// Wire shape of an error response from the score service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

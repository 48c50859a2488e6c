use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::records::{
    Leaderboard, QueryScope, ScoreRecord, ScoreSubmission, SubmissionError, iso_week_number,
};

/// Hard cap on stored records; the oldest entries are evicted first.
pub const MAX_STORED_SCORES: usize = 1_000;

#[derive(Debug)]
pub enum StoreError {
    /// The submission failed validation and nothing was written.
    Rejected(SubmissionError),
    Io(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Rejected(err) => write!(f, "submission rejected: {err}"),
            StoreError::Io(err) => write!(f, "score store io error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<SubmissionError> for StoreError {
    fn from(err: SubmissionError) -> Self {
        StoreError::Rejected(err)
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// JSON-file-backed leaderboard. The whole record set lives in memory and is
/// rewritten atomically on every append; at the capped size that stays cheap
/// and keeps the on-disk file human-readable.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
    records: Vec<ScoreRecord>,
}

impl ScoreStore {
    /// Open a store at `path`, loading any existing records. A missing or
    /// corrupt file starts the store empty rather than failing.
    pub fn open(path: PathBuf) -> Self {
        let records = fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Vec<ScoreRecord>>(&bytes).ok())
            .unwrap_or_default();
        Self { path, records }
    }

    pub fn from_env() -> Self {
        let path = std::env::var_os("BLOCKFALL_SCORES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("blockfall_scores.json"));
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        atomic_write(&self.path, json.as_bytes())
    }
}

impl Leaderboard for ScoreStore {
    type Error = StoreError;

    /// Ingest a submission. A player keeps at most one record per day and
    /// one per ISO week: earlier records with the same email from the same
    /// day or the same week are replaced by the new one, whatever its score.
    fn append(
        &mut self,
        submission: &ScoreSubmission,
        now: DateTime<Utc>,
    ) -> Result<ScoreRecord, StoreError> {
        let record = ScoreRecord::from_submission(submission, now)?;

        let new_week_year = record.date.iso_week().year();
        self.records.retain(|existing| {
            if existing.email != record.email {
                return true;
            }
            let same_day = existing.date == record.date;
            let same_week = existing.week == record.week
                && existing.date.iso_week().year() == new_week_year;
            !(same_day || same_week)
        });

        self.records.push(record.clone());
        if self.records.len() > MAX_STORED_SCORES {
            let excess = self.records.len() - MAX_STORED_SCORES;
            self.records.drain(..excess);
        }

        self.save()?;
        Ok(record)
    }

    /// Best scores first within the scope. Records with a blank username
    /// (possible only via hand-edited files) are skipped.
    fn query(&self, scope: QueryScope, limit: usize, today: NaiveDate) -> Vec<ScoreRecord> {
        let week = iso_week_number(today);
        let week_year = today.iso_week().year();

        let mut matches: Vec<ScoreRecord> = self
            .records
            .iter()
            .filter(|record| match scope {
                QueryScope::Today => record.date == today,
                QueryScope::Week => {
                    record.week == week && record.date.iso_week().year() == week_year
                }
                QueryScope::All => true,
            })
            .filter(|record| !record.username.trim().is_empty())
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);
        matches
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}

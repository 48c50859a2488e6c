use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::records::{ScoreRecord, iso_week_number};

/// Player-local preferences. Small on purpose; everything competitive lives
/// in the score service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub muted: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            muted: false,
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        Self {
            path: config_path("BLOCKFALL_SETTINGS_PATH", "settings.json"),
        }
    }

    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        serde_json::from_slice::<PlayerSettings>(&bytes)
            .map(PlayerSettings::sanitized)
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &PlayerSettings) -> io::Result<()> {
        write_json(&self.path, settings)
    }
}

/// Last leaderboard views successfully fetched from the score service, kept
/// so the host can still show something when the service is unreachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardCache {
    #[serde(default)]
    pub today: Vec<ScoreRecord>,
    #[serde(default)]
    pub week: Vec<ScoreRecord>,
}

impl LeaderboardCache {
    /// Drop cached entries that no longer belong to their window as of
    /// `today`, so a cache from last Tuesday never shows as today's board.
    pub fn pruned(mut self, today: NaiveDate) -> Self {
        let week = iso_week_number(today);
        let week_year = today.iso_week().year();
        self.today.retain(|record| record.date == today);
        self.week.retain(|record| {
            record.week == week && record.date.iso_week().year() == week_year
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardCacheStore {
    path: PathBuf,
}

impl LeaderboardCacheStore {
    pub fn from_env() -> Self {
        Self {
            path: config_path("BLOCKFALL_CACHE_PATH", "leaderboards.json"),
        }
    }

    pub fn load(&self, today: NaiveDate) -> LeaderboardCache {
        let Ok(bytes) = fs::read(&self.path) else {
            return LeaderboardCache::default();
        };
        serde_json::from_slice::<LeaderboardCache>(&bytes)
            .map(|cache| cache.pruned(today))
            .unwrap_or_default()
    }

    pub fn save(&self, cache: &LeaderboardCache) -> io::Result<()> {
        write_json(&self.path, cache)
    }
}

fn config_path(env_override: &str, file_name: &str) -> PathBuf {
    if let Some(explicit) = std::env::var_os(env_override) {
        return PathBuf::from(explicit);
    }

    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| {
                let mut p = PathBuf::from(home);
                p.push(".config");
                p
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));

    let mut path = base;
    path.push("blockfall");
    path.push(file_name);
    path
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)
}

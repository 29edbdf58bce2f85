//! Personal-best persistence
//!
//! Per-track record lap times survive across sessions in a small JSON file
//! next to the datalogs. The store is advisory: a missing or unreadable file
//! seeds empty records, and a failed write is logged and ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const RECORDS_FILE: &str = "personal-bests.json";

/// Fastest known lap per track, in milliseconds (absent = unset).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersonalBests {
    laps: HashMap<String, u32>,
}

impl PersonalBests {
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(RECORDS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "ignoring unreadable personal-best store");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn store(&self, dir: &Path) -> Result<()> {
        let path = dir.join(RECORDS_FILE);
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, data)
            .with_context(|| format!("cannot write personal-best store {}", path.display()))
    }

    /// Record for `track`, 0 when none exists.
    pub fn get(&self, track: &str) -> u32 {
        self.laps.get(track).copied().unwrap_or(0)
    }

    pub fn set(&mut self, track: &str, duration_ms: u32) {
        self.laps.insert(track.to_string(), duration_ms);
    }
}

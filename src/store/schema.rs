use serde::{Deserialize, Serialize};

use crate::engine::category::Mode;
use crate::engine::progress::ProgressStore;
use crate::session::result::SessionResult;

const SCHEMA_VERSION: u32 = 1;

/// Results kept in history; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    #[serde(default)]
    pub last_mode: Mode,
    #[serde(default)]
    pub unlocked: ProgressStore,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_mode: Mode::default(),
            unlocked: ProgressStore::default(),
        }
    }
}

impl ProgressData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl HistoryData {
    pub fn push(&mut self, result: SessionResult) {
        self.sessions.push(result);
        if self.sessions.len() > HISTORY_LIMIT {
            let excess = self.sessions.len() - HISTORY_LIMIT;
            self.sessions.drain(..excess);
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::category::ProgressKey;
use crate::session::quiz::QuizSession;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub key: ProgressKey,
    pub level: u8,
    pub score: u32,
    pub correct: usize,
    pub total: usize,
    #[serde(default)]
    pub time_up: bool,
    #[serde(default)]
    pub self_checked: bool,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
}

impl SessionResult {
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            key: session.key,
            level: session.level,
            score: session.score(),
            correct: session.correct,
            total: session.sample_size(),
            time_up: session.timed_out(),
            self_checked: session.self_graded,
            elapsed_secs: session.elapsed_secs(),
            timestamp: Utc::now(),
        }
    }
}

/// Best score recorded for `key` at `level`, if it has been played.
pub fn best_score(history: &[SessionResult], key: ProgressKey, level: u8) -> Option<u32> {
    history
        .iter()
        .filter(|r| r.key == key && r.level == level)
        .map(|r| r.score)
        .max()
}

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::category::Mode;
use crate::engine::scoring::DEFAULT_PASS_SCORE;

/// Per-mode time limits in seconds. Zero means untimed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimits {
    #[serde(default)]
    pub easy: u32,
    #[serde(default = "default_normal_limit")]
    pub normal: u32,
    #[serde(default = "default_hard_limit")]
    pub hard: u32,
    #[serde(default = "default_oni_limit")]
    pub oni: u32,
}

fn default_normal_limit() -> u32 {
    75
}
fn default_hard_limit() -> u32 {
    50
}
fn default_oni_limit() -> u32 {
    25
}

impl Default for TimeLimits {
    fn default() -> Self {
        Self {
            easy: 0,
            normal: default_normal_limit(),
            hard: default_hard_limit(),
            oni: default_oni_limit(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_mode")]
    pub default_mode: Mode,
    #[serde(default = "default_questions_per_session")]
    pub questions_per_session: usize,
    #[serde(default = "default_pass_score")]
    pub pass_score: u32,
    #[serde(default)]
    pub question_dir: Option<String>,
    #[serde(default)]
    pub bank_url: Option<String>,
    #[serde(default = "default_bank_cache_dir")]
    pub bank_cache_dir: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub time_limits: TimeLimits,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_mode() -> Mode {
    Mode::Easy
}
fn default_questions_per_session() -> usize {
    5
}
fn default_pass_score() -> u32 {
    DEFAULT_PASS_SCORE
}
fn default_bank_cache_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanjidr")
        .join("bank")
        .to_string_lossy()
        .to_string()
}
fn default_tick_ms() -> u64 {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_mode: default_mode(),
            questions_per_session: default_questions_per_session(),
            pass_score: default_pass_score(),
            question_dir: None,
            bank_url: None,
            bank_cache_dir: default_bank_cache_dir(),
            tick_ms: default_tick_ms(),
            log_level: default_log_level(),
            time_limits: TimeLimits::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanjidr")
            .join("config.toml")
    }

    /// Clamp numeric settings into usable ranges and drop blank paths.
    pub fn validate(&mut self) {
        self.questions_per_session = self.questions_per_session.clamp(1, 20);
        self.pass_score = self.pass_score.clamp(1, 100);
        self.tick_ms = self.tick_ms.clamp(20, 1000);
        for secs in [
            &mut self.time_limits.easy,
            &mut self.time_limits.normal,
            &mut self.time_limits.hard,
            &mut self.time_limits.oni,
        ] {
            *secs = (*secs).min(3600);
        }
        if self.question_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
            self.question_dir = None;
        }
        if self.bank_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.bank_url = None;
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

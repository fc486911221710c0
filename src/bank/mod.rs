//! Question banks: where stage files come from.
//!
//! Every source yields a parsed [`StageFile`] per category. Loading is the
//! only fallible step before a session starts; on failure no session state
//! is created.

pub mod directory;
pub mod embedded;
pub mod remote;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Config;
use crate::engine::category::Category;
use crate::session::question::StageFile;

pub use directory::DirectoryBank;
pub use embedded::EmbeddedBank;
pub use remote::RemoteBank;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank has no stage for {}", .0.to_key())]
    StageNotFound(Category),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("stage {} has no level {level}", .category.to_key())]
    MissingLevel { category: Category, level: u8 },
    #[error("stage {} level {level} has no questions", .category.to_key())]
    EmptyLevel { category: Category, level: u8 },
    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },
}

pub trait QuestionSource {
    fn load_stage(&self, category: Category) -> Result<StageFile, BankError>;

    /// Short human-readable origin, shown in the UI header.
    fn describe(&self) -> String;
}

/// Pick a source from config: a local directory wins over a remote URL,
/// and the bundled bank is the fallback.
pub fn from_config(config: &Config) -> Box<dyn QuestionSource> {
    if let Some(dir) = config.question_dir.as_deref() {
        log::info!("using question directory {dir}");
        return Box::new(DirectoryBank::new(PathBuf::from(dir)));
    }
    if let Some(url) = config.bank_url.as_deref() {
        log::info!("using remote question bank {url}");
        return Box::new(RemoteBank::new(url, PathBuf::from(&config.bank_cache_dir)));
    }
    Box::new(EmbeddedBank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_bundled_bank() {
        let mut config = Config::default();
        config.bank_url = None;
        config.question_dir = None;
        assert_eq!(from_config(&config).describe(), "bundled");
    }

    #[test]
    fn test_directory_overrides_url() {
        let mut config = Config::default();
        config.question_dir = Some("/tmp/kanji".to_string());
        config.bank_url = Some("https://example.com/bank".to_string());
        assert!(from_config(&config).describe().contains("/tmp/kanji"));
    }

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = BankError::EmptyLevel {
            category: Category::Usage,
            level: 3,
        };
        assert_eq!(err.to_string(), "stage d3 level 3 has no questions");
    }
}

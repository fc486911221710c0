use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::bank::{BankError, QuestionSource};
use crate::engine::category::Category;
use crate::session::question::StageFile;

/// Stage files read from a directory on disk, e.g. a user's own bank.
pub struct DirectoryBank {
    base_dir: PathBuf,
}

impl DirectoryBank {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

impl QuestionSource for DirectoryBank {
    fn load_stage(&self, category: Category) -> Result<StageFile, BankError> {
        let path = self.base_dir.join(category.stage_file());
        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                BankError::StageNotFound(category)
            } else {
                BankError::Io { path, source }
            }
        })?;
        StageFile::parse(&content)
    }

    fn describe(&self) -> String {
        self.base_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loads_stage_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("stage_d4.json"),
            r#"{"levels":[{"level":1,"questions":[{"q":"「一石二鳥」の意味は？","a":"一つのことで二つの得","choices":["一つのことで二つの得","石で鳥をとる"]}]}]}"#,
        )
        .unwrap();

        let bank = DirectoryBank::new(dir.path().to_path_buf());
        let stage = bank.load_stage(Category::Compound).unwrap();
        assert_eq!(stage.level(1).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_stage_not_found() {
        let dir = TempDir::new().unwrap();
        let bank = DirectoryBank::new(dir.path().to_path_buf());
        assert!(matches!(
            bank.load_stage(Category::Reading),
            Err(BankError::StageNotFound(Category::Reading))
        ));
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stage_d1.json"), "not json").unwrap();
        let bank = DirectoryBank::new(dir.path().to_path_buf());
        assert!(matches!(
            bank.load_stage(Category::Reading),
            Err(BankError::Parse(_))
        ));
    }
}

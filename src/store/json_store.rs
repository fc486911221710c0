use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{HistoryData, ProgressData};

const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanjidr");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn has_progress(&self) -> bool {
        self.file_path(PROGRESS_FILE).exists()
    }

    /// Load and deserialize progress. Returns None if the file exists but
    /// cannot be parsed (schema mismatch / corruption).
    pub fn load_progress(&self) -> Option<ProgressData> {
        let path = self.file_path(PROGRESS_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            Some(ProgressData::default())
        }
    }

    pub fn save_progress(&self, data: &ProgressData) -> Result<()> {
        self.save(PROGRESS_FILE, data)
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    /// Remove all persisted progress and history.
    pub fn reset(&self) -> Result<()> {
        for name in [PROGRESS_FILE, HISTORY_FILE] {
            let path = self.file_path(name);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::category::{Category, Mode, ProgressKey};
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let (_dir, store) = make_test_store();
        assert!(!store.has_progress());
        assert_eq!(store.load_progress(), Some(ProgressData::default()));
        assert!(store.load_history().sessions.is_empty());
    }

    #[test]
    fn test_progress_round_trip() {
        let (_dir, store) = make_test_store();
        let mut data = ProgressData::default();
        data.last_mode = Mode::Hard;
        data.unlocked
            .set(ProgressKey::new(Category::Compound, Mode::Hard), 4);
        data.unlocked
            .set(ProgressKey::new(Category::Reading, Mode::Easy), 6);
        store.save_progress(&data).unwrap();

        let loaded = store.load_progress().unwrap();
        assert_eq!(loaded, data);

        let raw = fs::read_to_string(store.file_path(PROGRESS_FILE)).unwrap();
        assert!(raw.contains("\"d4_hard\": 4"));
        assert!(raw.contains("\"last_mode\": \"hard\""));
    }

    #[test]
    fn test_corrupt_progress_is_none() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{ nope").unwrap();
        assert!(store.load_progress().is_none());
    }

    #[test]
    fn test_corrupt_history_falls_back_to_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(HISTORY_FILE), "not json").unwrap();
        assert!(store.load_history().sessions.is_empty());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.save_progress(&ProgressData::default()).unwrap();
        store.save_history(&HistoryData::default()).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_reset_removes_files() {
        let (_dir, store) = make_test_store();
        store.save_progress(&ProgressData::default()).unwrap();
        store.save_history(&HistoryData::default()).unwrap();
        store.reset().unwrap();
        assert!(!store.file_path(PROGRESS_FILE).exists());
        assert!(!store.file_path(HISTORY_FILE).exists());
        // resetting an empty store is fine
        store.reset().unwrap();
    }
}

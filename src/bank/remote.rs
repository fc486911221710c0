use std::fs;
use std::path::PathBuf;

use crate::bank::{BankError, QuestionSource};
use crate::engine::category::Category;
use crate::session::question::StageFile;

/// Last successfully fetched copy of each stage file.
pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::read_to_string(path).ok()
    }

    pub fn put(&self, key: &str, content: &str) -> bool {
        if fs::create_dir_all(&self.base_dir).is_err() {
            return false;
        }
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::write(path, content).is_ok()
    }

    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Stage files fetched from `<base_url>/stage_<category>.json`.
///
/// A fetched file is only cached after it parses. When the fetch fails the
/// cached copy is used, if any.
pub struct RemoteBank {
    base_url: String,
    cache: DiskCache,
}

impl RemoteBank {
    pub fn new(base_url: &str, cache_dir: PathBuf) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: DiskCache::new(cache_dir),
        }
    }

    fn stage_url(&self, category: Category) -> String {
        format!("{}/{}", self.base_url, category.stage_file())
    }
}

impl RemoteBank {
    /// Turn a fetch outcome into a stage, falling back to the cached copy
    /// when the fetch failed or its body does not parse.
    fn resolve(
        &self,
        category: Category,
        fetched: Result<String, String>,
    ) -> Result<StageFile, BankError> {
        let url = self.stage_url(category);
        let key = category.stage_file();
        let reason = match fetched {
            Ok(body) => match StageFile::parse(&body) {
                Ok(stage) => {
                    if !self.cache.put(&key, &body) {
                        log::warn!("could not cache {url}");
                    }
                    return Ok(stage);
                }
                Err(e) => match self.cache.get(&key) {
                    Some(_) => e.to_string(),
                    None => return Err(e),
                },
            },
            Err(reason) => reason,
        };
        match self.cache.get(&key) {
            Some(cached) => {
                log::warn!("fetch of {url} failed ({reason}), using cached copy");
                StageFile::parse(&cached)
            }
            None => Err(BankError::Network { url, reason }),
        }
    }
}

impl QuestionSource for RemoteBank {
    fn load_stage(&self, category: Category) -> Result<StageFile, BankError> {
        self.resolve(category, fetch_url(&self.stage_url(category)))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;
    let response = client.get(url).send().map_err(|e| e.to_string())?;
    if response.status().is_success() {
        response.text().map_err(|e| e.to_string())
    } else {
        Err(format!("HTTP {}", response.status()))
    }
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str) -> Result<String, String> {
    Err("built without network support".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(DiskCache::sanitize_key("stage_d1.json"), "stage_d1.json");
        assert_eq!(DiskCache::sanitize_key("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_cache_round_trip_creates_dir() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("nested"));
        assert!(cache.get("stage_d1.json").is_none());
        assert!(cache.put("stage_d1.json", "{}"));
        assert_eq!(cache.get("stage_d1.json").as_deref(), Some("{}"));
    }

    #[test]
    fn test_stage_url_strips_trailing_slash() {
        let dir = TempDir::new().unwrap();
        let bank = RemoteBank::new("https://example.com/kanji/", dir.path().to_path_buf());
        assert_eq!(
            bank.stage_url(Category::Nuance),
            "https://example.com/kanji/stage_d5.json"
        );
    }

    #[test]
    fn test_unreachable_host_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let bank = RemoteBank::new("http://127.0.0.1:9", dir.path().to_path_buf());
        assert!(matches!(
            bank.load_stage(Category::Reading),
            Err(BankError::Network { .. })
        ));

        bank.cache.put(
            "stage_d1.json",
            r#"{"levels":[{"level":1,"questions":[{"q":"「森林」","a":"しんりん","choices":["しんりん","もりばやし"]}]}]}"#,
        );
        let stage = bank.load_stage(Category::Reading).unwrap();
        assert_eq!(stage.level(1).unwrap()[0].answer, "しんりん");
    }

    #[test]
    fn test_unparsable_body_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let bank = RemoteBank::new("http://bank.invalid", dir.path().to_path_buf());
        let portal = Ok("<html>sign in to continue</html>".to_string());

        assert!(matches!(
            bank.resolve(Category::Usage, portal.clone()),
            Err(BankError::Parse(_))
        ));

        bank.cache.put(
            "stage_d3.json",
            r#"{"levels":[{"level":1,"questions":[{"q":"時間を（はかる）。","a":"計る","choices":["計る","測る"]}]}]}"#,
        );
        let stage = bank.resolve(Category::Usage, portal).unwrap();
        assert_eq!(stage.level(1).unwrap()[0].answer, "計る");
        // the bad body never replaces the cached copy
        assert!(bank.cache.get("stage_d3.json").unwrap().contains("計る"));
    }
}

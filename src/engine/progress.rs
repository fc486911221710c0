use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::category::{Category, Mode, ProgressKey};

pub const FIRST_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;
/// Stored once the last level has been passed.
pub const MASTERED: u8 = MAX_LEVEL + 1;

/// Unlocked level per (category, mode). Values only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProgressStore {
    unlocked: BTreeMap<ProgressKey, u8>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLevel {
    Number(i64),
    Other(IgnoredAny),
}

/// Entries are read one by one: unknown keys and non-numeric levels are
/// skipped, numbers are clamped to the valid range.
impl<'de> Deserialize<'de> for ProgressStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, StoredLevel>::deserialize(deserializer)?;
        let mut unlocked = BTreeMap::new();
        for (name, level) in raw {
            let key = match ProgressKey::try_from(name) {
                Ok(key) => key,
                Err(e) => {
                    log::warn!("skipping progress entry: {e}");
                    continue;
                }
            };
            match level {
                StoredLevel::Number(n) => {
                    let level = n.clamp(FIRST_LEVEL as i64, MASTERED as i64) as u8;
                    unlocked.insert(key, level);
                }
                StoredLevel::Other(_) => log::warn!("skipping non-numeric level for {key}"),
            }
        }
        Ok(Self { unlocked })
    }
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ProgressKey) -> u8 {
        self.unlocked
            .get(&key)
            .copied()
            .unwrap_or(FIRST_LEVEL)
            .clamp(FIRST_LEVEL, MASTERED)
    }

    /// Record `level` as unlocked. Returns true if the stored value grew.
    pub fn set(&mut self, key: ProgressKey, level: u8) -> bool {
        let current = self.get(key);
        let level = level.clamp(FIRST_LEVEL, MASTERED);
        if level > current {
            self.unlocked.insert(key, level);
            true
        } else {
            false
        }
    }

    pub fn is_playable(&self, key: ProgressKey, level: u8) -> bool {
        (FIRST_LEVEL..=MAX_LEVEL).contains(&level) && level <= self.get(key)
    }

    /// A level counts as cleared once the next one has been unlocked.
    pub fn is_cleared(&self, key: ProgressKey, level: u8) -> bool {
        self.get(key) > level
    }

    pub fn is_mastered(&self, key: ProgressKey) -> bool {
        self.get(key) >= MASTERED
    }

    pub fn display_level(&self, key: ProgressKey) -> u8 {
        self.get(key).min(MAX_LEVEL)
    }

    pub fn mode_mastered(&self, mode: Mode) -> bool {
        Category::all()
            .iter()
            .all(|&cat| self.is_mastered(ProgressKey::new(cat, mode)))
    }

    pub fn mastered_count(&self) -> usize {
        ProgressKey::all().filter(|&k| self.is_mastered(k)).count()
    }
}

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TimeLimits;

// --- Category ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Reading,
    Writing,
    Usage,
    Compound,
    Nuance,
}

/// How answers to a category's questions are collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerStyle {
    /// Pick one of the shuffled choices.
    Choice,
    /// Write the answer on paper, then self-report the count at the end.
    SelfCheck,
}

impl Category {
    pub fn to_key(self) -> &'static str {
        match self {
            Category::Reading => "d1",
            Category::Writing => "d2",
            Category::Usage => "d3",
            Category::Compound => "d4",
            Category::Nuance => "d5",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "d1" => Some(Category::Reading),
            "d2" => Some(Category::Writing),
            "d3" => Some(Category::Usage),
            "d4" => Some(Category::Compound),
            "d5" => Some(Category::Nuance),
            _ => None,
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Reading,
            Category::Writing,
            Category::Usage,
            Category::Compound,
            Category::Nuance,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Reading => "漢字の読み",
            Category::Writing => "漢字の書き",
            Category::Usage => "漢字・語句の使い分け",
            Category::Compound => "熟語の意味・使い方",
            Category::Nuance => "まぎらわしい語句の使い分け",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Reading => "読み",
            Category::Writing => "書き",
            Category::Usage => "使い分け",
            Category::Compound => "熟語",
            Category::Nuance => "究極",
        }
    }

    pub fn answer_style(self) -> AnswerStyle {
        match self {
            Category::Writing => AnswerStyle::SelfCheck,
            _ => AnswerStyle::Choice,
        }
    }

    /// File name of this category's stage in a question bank.
    pub fn stage_file(self) -> String {
        format!("stage_{}.json", self.to_key())
    }
}

// --- Mode ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Easy,
    Normal,
    Hard,
    Oni,
}

impl Mode {
    pub fn to_key(self) -> &'static str {
        match self {
            Mode::Easy => "easy",
            Mode::Normal => "normal",
            Mode::Hard => "hard",
            Mode::Oni => "oni",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Mode::Easy),
            "normal" => Some(Mode::Normal),
            "hard" => Some(Mode::Hard),
            "oni" => Some(Mode::Oni),
            _ => None,
        }
    }

    pub fn all() -> &'static [Mode] {
        &[Mode::Easy, Mode::Normal, Mode::Hard, Mode::Oni]
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Easy => "かんたん",
            Mode::Normal => "ふつう",
            Mode::Hard => "むずかしい",
            Mode::Oni => "おに",
        }
    }

    /// `None` means the mode is untimed.
    pub fn time_limit(self, limits: &TimeLimits) -> Option<Duration> {
        let secs = match self {
            Mode::Easy => limits.easy,
            Mode::Normal => limits.normal,
            Mode::Hard => limits.hard,
            Mode::Oni => limits.oni,
        };
        (secs > 0).then(|| Duration::from_secs(u64::from(secs)))
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&m| m == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&m| m == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

// --- Progress key ---

/// The (category, mode) pair that progress is tracked under.
///
/// Serialized as `"<category>_<mode>"`, e.g. `"d1_easy"`, so it can be used
/// as a JSON object key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProgressKey {
    pub category: Category,
    pub mode: Mode,
}

impl ProgressKey {
    pub fn new(category: Category, mode: Mode) -> Self {
        Self { category, mode }
    }

    pub fn all() -> impl Iterator<Item = ProgressKey> {
        Category::all()
            .iter()
            .flat_map(|&c| Mode::all().iter().map(move |&m| ProgressKey::new(c, m)))
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category.to_key(), self.mode.to_key())
    }
}

impl From<ProgressKey> for String {
    fn from(key: ProgressKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for ProgressKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (cat, mode) = value
            .split_once('_')
            .ok_or_else(|| format!("malformed progress key: {value}"))?;
        match (Category::from_key(cat), Mode::from_key(mode)) {
            (Some(category), Some(mode)) => Ok(ProgressKey { category, mode }),
            _ => Err(format!("unknown progress key: {value}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_category_keys_round_trip() {
        for &cat in Category::all() {
            assert_eq!(Category::from_key(cat.to_key()), Some(cat));
        }
        assert_eq!(Category::from_key("d6"), None);
    }

    #[test]
    fn test_only_writing_is_self_checked() {
        let self_checked: Vec<Category> = Category::all()
            .iter()
            .copied()
            .filter(|c| c.answer_style() == AnswerStyle::SelfCheck)
            .collect();
        assert_eq!(self_checked, vec![Category::Writing]);
    }

    #[test]
    fn test_default_time_limits() {
        let limits = TimeLimits::default();
        assert_eq!(Mode::Easy.time_limit(&limits), None);
        assert_eq!(Mode::Normal.time_limit(&limits), Some(Duration::from_secs(75)));
        assert_eq!(Mode::Hard.time_limit(&limits), Some(Duration::from_secs(50)));
        assert_eq!(Mode::Oni.time_limit(&limits), Some(Duration::from_secs(25)));
    }

    #[test]
    fn test_mode_cycles() {
        assert_eq!(Mode::Oni.next(), Mode::Easy);
        assert_eq!(Mode::Easy.prev(), Mode::Oni);
        assert_eq!(Mode::Normal.next().prev(), Mode::Normal);
    }

    #[test]
    fn test_progress_key_as_json_map_key() {
        let mut map = BTreeMap::new();
        map.insert(ProgressKey::new(Category::Usage, Mode::Hard), 3u8);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"d3_hard":3}"#);

        let back: BTreeMap<ProgressKey, u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_progress_key_rejects_garbage() {
        assert!(ProgressKey::try_from("d1".to_string()).is_err());
        assert!(ProgressKey::try_from("d9_easy".to_string()).is_err());
        assert!(ProgressKey::try_from("d1_extreme".to_string()).is_err());
    }

    #[test]
    fn test_all_keys_cover_every_pair() {
        assert_eq!(ProgressKey::all().count(), 20);
    }
}

use std::borrow::Cow;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::bank::BankError;
use crate::engine::category::Category;

/// Placeholder a writing prompt uses for the kanji to be written.
pub const BLANK: &str = "（　）";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub prompt: String,
    #[serde(rename = "a")]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Reading shown in place of the blank in writing prompts.
    #[serde(rename = "k", default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.answer
    }

    /// Prompt with the first blank filled by the hint, if there is one.
    pub fn display_prompt(&self) -> Cow<'_, str> {
        if !self.prompt.contains(BLANK) {
            return Cow::Borrowed(&self.prompt);
        }
        let hint = self.hint.as_deref().unwrap_or("");
        Cow::Owned(self.prompt.replacen(BLANK, &format!("（ {hint} ）"), 1))
    }

    fn normalized(self, nfc: &ComposingNormalizerBorrowed<'_>) -> Self {
        let norm = |s: String| nfc.normalize(&s).into_owned();
        Self {
            prompt: norm(self.prompt),
            answer: norm(self.answer),
            choices: self.choices.into_iter().map(norm).collect(),
            explanation: self.explanation.map(norm),
            hint: self.hint.map(norm),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelSet {
    pub level: u8,
    pub questions: Vec<Question>,
}

/// One category's question bank, as stored in `stage_<category>.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StageFile {
    pub levels: Vec<LevelSet>,
}

impl StageFile {
    pub fn parse(json: &str) -> Result<Self, BankError> {
        let stage: StageFile = serde_json::from_str(json)?;
        let nfc = ComposingNormalizerBorrowed::new_nfc();
        let levels = stage
            .levels
            .into_iter()
            .map(|set| LevelSet {
                level: set.level,
                questions: set.questions.into_iter().map(|q| q.normalized(&nfc)).collect(),
            })
            .collect();
        Ok(Self { levels })
    }

    pub fn level(&self, level: u8) -> Option<&[Question]> {
        self.levels
            .iter()
            .find(|set| set.level == level)
            .map(|set| set.questions.as_slice())
    }

    /// Question pool for `level`, failing if it is absent or empty.
    pub fn pool(&self, category: Category, level: u8) -> Result<&[Question], BankError> {
        match self.level(level) {
            None => Err(BankError::MissingLevel { category, level }),
            Some([]) => Err(BankError::EmptyLevel { category, level }),
            Some(questions) => Ok(questions),
        }
    }
}

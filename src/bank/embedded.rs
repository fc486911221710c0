use rust_embed::Embed;

use crate::bank::{BankError, QuestionSource};
use crate::engine::category::Category;
use crate::session::question::StageFile;

#[derive(Embed)]
#[folder = "assets/questions/"]
struct QuestionAssets;

/// The question bank compiled into the binary.
pub struct EmbeddedBank;

impl QuestionSource for EmbeddedBank {
    fn load_stage(&self, category: Category) -> Result<StageFile, BankError> {
        let file = QuestionAssets::get(&category.stage_file())
            .ok_or(BankError::StageNotFound(category))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        StageFile::parse(&content)
    }

    fn describe(&self) -> String {
        "bundled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::category::AnswerStyle;
    use crate::engine::progress::{FIRST_LEVEL, MAX_LEVEL};
    use crate::session::question::BLANK;

    #[test]
    fn test_every_category_has_every_level() {
        for &cat in Category::all() {
            let stage = EmbeddedBank.load_stage(cat).unwrap();
            for level in FIRST_LEVEL..=MAX_LEVEL {
                let pool = stage.pool(cat, level).unwrap();
                assert!(pool.len() >= 5, "{} level {level} too small", cat.to_key());
            }
        }
    }

    #[test]
    fn test_choice_answers_are_among_choices() {
        for &cat in Category::all() {
            if cat.answer_style() != AnswerStyle::Choice {
                continue;
            }
            let stage = EmbeddedBank.load_stage(cat).unwrap();
            for set in &stage.levels {
                for q in &set.questions {
                    assert!(
                        q.choices.iter().any(|c| q.is_correct(c)),
                        "{}: answer {} missing from choices",
                        q.prompt,
                        q.answer
                    );
                    assert!(q.choices.len() >= 2);
                }
            }
        }
    }

    #[test]
    fn test_writing_prompts_have_blank_and_hint() {
        let stage = EmbeddedBank.load_stage(Category::Writing).unwrap();
        for set in &stage.levels {
            for q in &set.questions {
                assert!(q.prompt.contains(BLANK), "{}", q.prompt);
                assert!(q.hint.is_some(), "{}", q.prompt);
            }
        }
    }
}

use crate::engine::category::ProgressKey;
use crate::engine::progress::{MASTERED, MAX_LEVEL, ProgressStore};

pub const DEFAULT_PASS_SCORE: u32 = 100;

/// Percentage score, truncated. An empty session scores 0.
pub fn compute_score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    (correct * 100 / total) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Score below the pass threshold.
    Failed,
    /// Passed and the next level became playable.
    Unlocked { next: u8 },
    /// Passed a level whose successor was already unlocked.
    AlreadyUnlocked,
    /// Passed the last level.
    Mastered,
}

impl UnlockOutcome {
    pub fn passed(self) -> bool {
        !matches!(self, UnlockOutcome::Failed)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScoreEvaluator {
    pass_score: u32,
}

impl ScoreEvaluator {
    pub fn new(pass_score: u32) -> Self {
        Self {
            pass_score: pass_score.min(100),
        }
    }

    pub fn pass_score(&self) -> u32 {
        self.pass_score
    }

    pub fn compute(&self, correct: usize, total: usize) -> u32 {
        compute_score(correct, total)
    }

    pub fn decide(&self, score: u32, current_level: u8, unlocked_level: u8) -> UnlockOutcome {
        if score < self.pass_score {
            return UnlockOutcome::Failed;
        }
        if current_level >= MAX_LEVEL {
            return UnlockOutcome::Mastered;
        }
        let next = current_level + 1;
        if next > unlocked_level {
            UnlockOutcome::Unlocked { next }
        } else {
            UnlockOutcome::AlreadyUnlocked
        }
    }

    /// Decide and write the outcome through to `progress`.
    pub fn apply(
        &self,
        progress: &mut ProgressStore,
        key: ProgressKey,
        level: u8,
        score: u32,
    ) -> UnlockOutcome {
        let outcome = self.decide(score, level, progress.get(key));
        match outcome {
            UnlockOutcome::Unlocked { next } => {
                progress.set(key, next);
            }
            UnlockOutcome::Mastered => {
                progress.set(key, MASTERED);
            }
            UnlockOutcome::Failed | UnlockOutcome::AlreadyUnlocked => {}
        }
        outcome
    }
}

impl Default for ScoreEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::category::{Category, Mode};

    #[test]
    fn test_five_question_scores_step_by_twenty() {
        let scores: Vec<u32> = (0..=5).map(|c| compute_score(c, 5)).collect();
        assert_eq!(scores, vec![0, 20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_score_of_empty_session_is_zero() {
        assert_eq!(compute_score(0, 0), 0);
    }

    #[test]
    fn test_score_caps_at_hundred() {
        assert_eq!(compute_score(9, 5), 100);
    }

    #[test]
    fn test_default_threshold_requires_perfect() {
        let eval = ScoreEvaluator::default();
        assert_eq!(eval.decide(80, 1, 1), UnlockOutcome::Failed);
        assert_eq!(eval.decide(100, 1, 1), UnlockOutcome::Unlocked { next: 2 });
    }

    #[test]
    fn test_configurable_threshold() {
        let eval = ScoreEvaluator::new(80);
        assert_eq!(eval.decide(60, 2, 2), UnlockOutcome::Failed);
        assert_eq!(eval.decide(80, 2, 2), UnlockOutcome::Unlocked { next: 3 });
    }

    #[test]
    fn test_replaying_cleared_level() {
        let eval = ScoreEvaluator::default();
        assert_eq!(eval.decide(100, 1, 3), UnlockOutcome::AlreadyUnlocked);
    }

    #[test]
    fn test_last_level_masters() {
        let eval = ScoreEvaluator::default();
        assert_eq!(eval.decide(100, MAX_LEVEL, MAX_LEVEL), UnlockOutcome::Mastered);
    }

    #[test]
    fn test_unlock_then_fail_keeps_progress() {
        let eval = ScoreEvaluator::default();
        let mut progress = ProgressStore::new();
        let key = ProgressKey::new(Category::Reading, Mode::Easy);

        let first = eval.apply(&mut progress, key, 1, 100);
        assert_eq!(first, UnlockOutcome::Unlocked { next: 2 });
        assert_eq!(progress.get(key), 2);

        let second = eval.apply(&mut progress, key, 1, 60);
        assert_eq!(second, UnlockOutcome::Failed);
        assert_eq!(progress.get(key), 2);
    }

    #[test]
    fn test_repeated_passes_are_monotonic() {
        let eval = ScoreEvaluator::default();
        let mut progress = ProgressStore::new();
        let key = ProgressKey::new(Category::Nuance, Mode::Oni);
        let mut last = progress.get(key);
        for level in [1, 2, 1, 3, 2, 4, 5, 1, 5] {
            if progress.is_playable(key, level) {
                eval.apply(&mut progress, key, level, 100);
            }
            assert!(progress.get(key) >= last);
            last = progress.get(key);
        }
        assert!(progress.is_mastered(key));
    }
}

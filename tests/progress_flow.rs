use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use kanjidr::bank::{DirectoryBank, EmbeddedBank, QuestionSource};
use kanjidr::engine::category::{Category, Mode, ProgressKey};
use kanjidr::engine::progress::{MASTERED, MAX_LEVEL};
use kanjidr::engine::scoring::{ScoreEvaluator, UnlockOutcome};
use kanjidr::session::quiz::QuizSession;
use kanjidr::store::json_store::JsonStore;
use kanjidr::store::schema::{HistoryData, ProgressData};

fn play(
    key: ProgressKey,
    level: u8,
    bank: &dyn QuestionSource,
    rng: &mut SmallRng,
    miss: usize,
) -> QuizSession {
    let stage = bank.load_stage(key.category).unwrap();
    let pool = stage.pool(key.category, level).unwrap();
    let mut session = QuizSession::start(key, level, pool, 5, None, rng).unwrap();
    let mut missed = 0;
    while let Some(current) = session.current() {
        let want_correct = missed >= miss;
        let idx = current
            .choices
            .iter()
            .position(|c| current.question.is_correct(c) == want_correct)
            .unwrap();
        if !want_correct {
            missed += 1;
        }
        session.choose(idx);
        session.next();
    }
    session
}

#[test]
fn test_climb_to_mastery_and_reload() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let evaluator = ScoreEvaluator::default();
    let mut rng = SmallRng::seed_from_u64(7);
    let key = ProgressKey::new(Category::Compound, Mode::Normal);

    let mut progress = ProgressData::default();
    let mut history = HistoryData::default();

    // One miss out of five is 80 points: not enough
    let session = play(key, 1, &EmbeddedBank, &mut rng, 1);
    let result = session.result().unwrap();
    assert_eq!(result.score, 80);
    assert_eq!(
        evaluator.apply(&mut progress.unlocked, key, 1, result.score),
        UnlockOutcome::Failed
    );
    history.push(result);

    for level in 1..=MAX_LEVEL {
        let session = play(key, level, &EmbeddedBank, &mut rng, 0);
        let result = session.result().unwrap();
        let outcome = evaluator.apply(&mut progress.unlocked, key, level, result.score);
        if level < MAX_LEVEL {
            assert_eq!(outcome, UnlockOutcome::Unlocked { next: level + 1 });
        } else {
            assert_eq!(outcome, UnlockOutcome::Mastered);
        }
        history.push(result);
    }

    store.save_progress(&progress).unwrap();
    store.save_history(&history).unwrap();

    let reloaded = store.load_progress().unwrap();
    assert_eq!(reloaded.unlocked.get(key), MASTERED);
    assert!(reloaded.unlocked.is_mastered(key));
    assert_eq!(reloaded.unlocked.display_level(key), MAX_LEVEL);
    // Other modes are untouched
    assert_eq!(
        reloaded
            .unlocked
            .get(ProgressKey::new(Category::Compound, Mode::Hard)),
        1
    );
    assert_eq!(store.load_history().sessions.len(), 6);
}

#[test]
fn test_hand_written_progress_file_loads() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("progress.json"),
        r#"{
            "schema_version": 1,
            "last_mode": "oni",
            "unlocked": {"d1_oni": 3, "d5_easy": 9, "d2_hard": 0}
        }"#,
    )
    .unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let data = store.load_progress().unwrap();

    assert_eq!(data.last_mode, Mode::Oni);
    assert_eq!(data.unlocked.get(ProgressKey::new(Category::Reading, Mode::Oni)), 3);
    // Out-of-range values clamp on read
    assert_eq!(data.unlocked.get(ProgressKey::new(Category::Nuance, Mode::Easy)), MASTERED);
    assert_eq!(data.unlocked.get(ProgressKey::new(Category::Writing, Mode::Hard)), 1);
}

#[test]
fn test_directory_bank_drives_a_session() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stage_d1.json"),
        r#"{"levels": [{"level": 1, "questions": [
            {"q": "「信号」の読みは？", "a": "しんごう", "choices": ["しんごう", "しんこう"]},
            {"q": "「辞書」の読みは？", "a": "じしょ", "choices": ["じしょ", "じしょう"]}
        ]}]}"#,
    )
    .unwrap();
    let bank = DirectoryBank::new(dir.path().to_path_buf());
    let mut rng = SmallRng::seed_from_u64(1);
    let key = ProgressKey::new(Category::Reading, Mode::Easy);

    // Pool smaller than the requested sample: every question once
    let session = play(key, 1, &bank, &mut rng, 0);
    assert_eq!(session.sample_size(), 2);
    assert_eq!(session.result().unwrap().score, 100);

    assert!(bank.load_stage(Category::Writing).is_err());
}

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::{self, QuestionSource};
use crate::config::Config;
use crate::engine::category::{AnswerStyle, Category, Mode, ProgressKey};
use crate::engine::progress::{FIRST_LEVEL, MAX_LEVEL};
use crate::engine::scoring::{ScoreEvaluator, UnlockOutcome};
use crate::session::quiz::{QuizSession, SessionEvent};
use crate::session::result::SessionResult;
use crate::store::json_store::JsonStore;
use crate::store::schema::{HistoryData, ProgressData};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    CategorySelect,
    LevelSelect,
    Quiz,
    SelfCheck,
    Score,
}

pub struct App {
    pub screen: AppScreen,
    pub mode: Mode,
    pub category_selected: usize,
    pub level_selected: u8,
    pub session: Option<QuizSession>,
    pub last_result: Option<SessionResult>,
    pub last_outcome: Option<UnlockOutcome>,
    pub notice: Option<String>,
    pub confirm_reset: bool,
    pub self_check_count: usize,
    pub progress: ProgressData,
    pub history: HistoryData,
    pub config: Config,
    pub theme: &'static Theme,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    bank: Box<dyn QuestionSource>,
    evaluator: ScoreEvaluator,
    rng: SmallRng,
    last_tick: Instant,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("progress will not be saved: {e}");
                None
            }
        };
        let bank = bank::from_config(&config);
        Self::with_parts(config, store, bank, SmallRng::from_entropy())
    }

    pub fn with_parts(
        config: Config,
        store: Option<JsonStore>,
        bank: Box<dyn QuestionSource>,
        rng: SmallRng,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let fresh = ProgressData {
            last_mode: config.default_mode,
            ..ProgressData::default()
        };
        let (progress, history) = match store {
            Some(ref s) => {
                let progress = if !s.has_progress() {
                    fresh
                } else {
                    match s.load_progress() {
                        Some(pd) if !pd.needs_reset() => pd,
                        _ => {
                            log::warn!("discarding unreadable progress data");
                            fresh
                        }
                    }
                };
                (progress, s.load_history())
            }
            None => (fresh, HistoryData::default()),
        };

        let evaluator = ScoreEvaluator::new(config.pass_score);
        log::info!(
            "questions from {}, pass score {}",
            bank.describe(),
            evaluator.pass_score()
        );

        Self {
            screen: AppScreen::CategorySelect,
            mode: progress.last_mode,
            category_selected: 0,
            level_selected: FIRST_LEVEL,
            session: None,
            last_result: None,
            last_outcome: None,
            notice: None,
            confirm_reset: false,
            self_check_count: 0,
            progress,
            history,
            config,
            theme,
            store,
            should_quit: false,
            bank,
            evaluator,
            rng,
            last_tick: Instant::now(),
        }
    }

    pub fn bank_description(&self) -> String {
        self.bank.describe()
    }

    pub fn pass_score(&self) -> u32 {
        self.evaluator.pass_score()
    }

    pub fn selected_category(&self) -> Category {
        Category::all()[self.category_selected.min(Category::all().len() - 1)]
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(self.selected_category(), self.mode)
    }

    pub fn unlocked_level(&self) -> u8 {
        self.progress.unlocked.get(self.key())
    }

    // --- Category / mode selection ---

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.progress.last_mode = mode;
        self.save_progress();
    }

    pub fn next_mode(&mut self) {
        self.set_mode(self.mode.next());
    }

    pub fn prev_mode(&mut self) {
        self.set_mode(self.mode.prev());
    }

    pub fn next_category(&mut self) {
        self.category_selected = (self.category_selected + 1) % Category::all().len();
    }

    pub fn prev_category(&mut self) {
        let len = Category::all().len();
        self.category_selected = (self.category_selected + len - 1) % len;
    }

    pub fn select_category(&mut self, category: Category) {
        if let Some(idx) = Category::all().iter().position(|&c| c == category) {
            self.category_selected = idx;
        }
        self.open_levels();
    }

    pub fn open_levels(&mut self) {
        self.notice = None;
        self.level_selected = self.progress.unlocked.display_level(self.key());
        self.screen = AppScreen::LevelSelect;
    }

    pub fn next_level_selection(&mut self) {
        if self.level_selected < MAX_LEVEL {
            self.level_selected += 1;
        }
    }

    pub fn prev_level_selection(&mut self) {
        if self.level_selected > FIRST_LEVEL {
            self.level_selected -= 1;
        }
    }

    pub fn go_to_categories(&mut self) {
        self.session = None;
        self.notice = None;
        self.confirm_reset = false;
        self.screen = AppScreen::CategorySelect;
    }

    // --- Sessions ---

    /// Load the bank and start `level`. On any failure the app is left as it was,
    /// apart from the notice explaining why.
    pub fn start_level(&mut self, level: u8) {
        let key = self.key();
        if !self.progress.unlocked.is_playable(key, level) {
            self.notice = Some(format!(
                "Level {level} is locked. Clear level {} with {} points first.",
                level.saturating_sub(1).max(FIRST_LEVEL),
                self.evaluator.pass_score()
            ));
            return;
        }

        let stage = match self.bank.load_stage(key.category) {
            Ok(stage) => stage,
            Err(e) => {
                log::error!("loading {} failed: {e}", key.category.to_key());
                self.notice = Some(format!("Could not load questions: {e}"));
                return;
            }
        };
        let pool = match stage.pool(key.category, level) {
            Ok(pool) => pool,
            Err(e) => {
                log::error!("{e}");
                self.notice = Some(format!("Could not load questions: {e}"));
                return;
            }
        };

        let time_limit = key.mode.time_limit(&self.config.time_limits);
        match QuizSession::start(
            key,
            level,
            pool,
            self.config.questions_per_session,
            time_limit,
            &mut self.rng,
        ) {
            Ok(session) => {
                log::info!(
                    "start {key} level {level}: {} questions, limit {:?}",
                    session.sample_size(),
                    time_limit
                );
                self.session = Some(session);
                self.level_selected = level;
                self.notice = None;
                self.last_tick = Instant::now();
                self.screen = AppScreen::Quiz;
            }
            Err(e) => {
                log::error!("could not start {key} level {level}: {e}");
                self.notice = Some(format!("Could not start level {level}: {e}"));
            }
        }
    }

    /// Advance the session timer by the wall-clock time since the last tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.tick_by(dt);
    }

    pub fn tick_by(&mut self, dt: Duration) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(SessionEvent::TimeUp) = session.tick(dt) {
            log::info!("time up at question {}", session.position + 1);
            self.notice = Some("Time's up!".to_string());
            self.on_session_complete();
        }
    }

    pub fn choose(&mut self, index: usize) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.choose(index);
        }
    }

    pub fn next_question(&mut self) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        let complete = match self.session.as_mut() {
            Some(session) => {
                session.next();
                session.is_complete()
            }
            None => false,
        };
        if complete {
            self.on_session_complete();
        }
    }

    fn on_session_complete(&mut self) {
        let awaiting = self
            .session
            .as_ref()
            .is_some_and(|s| s.awaiting_self_grade());
        if awaiting {
            self.self_check_count = 0;
            self.screen = AppScreen::SelfCheck;
        } else {
            self.finish_session();
        }
    }

    pub fn self_check_increment(&mut self) {
        let max = self.session.as_ref().map_or(0, |s| s.sample_size());
        self.self_check_count = (self.self_check_count + 1).min(max);
    }

    pub fn self_check_decrement(&mut self) {
        self.self_check_count = self.self_check_count.saturating_sub(1);
    }

    pub fn set_self_check_count(&mut self, count: usize) {
        let max = self.session.as_ref().map_or(0, |s| s.sample_size());
        self.self_check_count = count.min(max);
    }

    pub fn submit_self_check(&mut self) {
        if self.screen != AppScreen::SelfCheck {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.self_grade(self.self_check_count);
        }
        self.finish_session();
    }

    fn finish_session(&mut self) {
        let Some(result) = self.session.as_ref().and_then(|s| s.result()) else {
            return;
        };

        let outcome =
            self.evaluator
                .apply(&mut self.progress.unlocked, result.key, result.level, result.score);
        log::info!(
            "finished {} level {}: score {} -> {:?}",
            result.key,
            result.level,
            result.score,
            outcome
        );

        self.history.push(result.clone());
        self.last_result = Some(result);
        self.last_outcome = Some(outcome);
        self.screen = AppScreen::Score;
        self.save_data();
    }

    /// Leave a session without scoring it.
    pub fn abandon_session(&mut self) {
        if let Some(ref session) = self.session {
            log::info!("abandoned {} level {}", session.key, session.level);
        }
        self.session = None;
        self.notice = None;
        self.screen = AppScreen::LevelSelect;
    }

    pub fn retry(&mut self) {
        if let Some(level) = self.last_result.as_ref().map(|r| r.level) {
            self.start_level(level);
        }
    }

    pub fn can_advance(&self) -> bool {
        matches!(
            (self.last_result.as_ref(), self.last_outcome),
            (Some(r), Some(outcome)) if outcome.passed() && r.level < MAX_LEVEL
        )
    }

    pub fn advance_level(&mut self) {
        if !self.can_advance() {
            return;
        }
        if let Some(level) = self.last_result.as_ref().map(|r| r.level) {
            self.start_level(level + 1);
        }
    }

    pub fn is_free_write(&self) -> bool {
        self.selected_category().answer_style() == AnswerStyle::SelfCheck
    }

    // --- Persistence ---

    pub fn request_reset(&mut self) {
        self.confirm_reset = true;
    }

    pub fn cancel_reset(&mut self) {
        self.confirm_reset = false;
    }

    pub fn confirm_reset(&mut self) {
        self.confirm_reset = false;
        if let Some(ref store) = self.store {
            if let Err(e) = store.reset() {
                log::error!("reset failed: {e}");
                self.notice = Some(format!("Reset failed: {e}"));
                return;
            }
        }
        log::info!("progress reset");
        self.progress = ProgressData::default();
        self.history = HistoryData::default();
        self.mode = self.progress.last_mode;
        self.last_result = None;
        self.last_outcome = None;
        self.notice = Some("Progress reset.".to_string());
    }

    fn save_progress(&self) {
        if let Some(ref store) = self.store {
            if let Err(e) = store.save_progress(&self.progress) {
                log::warn!("saving progress failed: {e}");
            }
        }
    }

    fn save_data(&self) {
        self.save_progress();
        if let Some(ref store) = self.store {
            if let Err(e) = store.save_history(&self.history) {
                log::warn!("saving history failed: {e}");
            }
        }
    }
}

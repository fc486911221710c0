use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::engine::category::{AnswerStyle, ProgressKey};
use crate::engine::scoring;
use crate::engine::timer::Countdown;
use crate::session::question::Question;
use crate::session::result::SessionResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no questions to sample from")]
    EmptyPool,
    #[error("sample size must be at least one")]
    ZeroSample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    Answered,
    TimeUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    TimeUp,
}

/// Shown after a choice is picked, until the user moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub chosen: String,
    pub answer: String,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SessionQuestion {
    pub question: Question,
    /// Choices in display order, shuffled once at start.
    pub choices: Vec<String>,
}

pub struct QuizSession {
    pub key: ProgressKey,
    pub level: u8,
    pub questions: Vec<SessionQuestion>,
    pub position: usize,
    pub correct: usize,
    pub feedback: Option<Feedback>,
    pub countdown: Option<Countdown>,
    pub finished: Option<FinishReason>,
    pub self_graded: bool,
    pub started_at: Instant,
    pub finished_at: Option<Instant>,
}

impl QuizSession {
    /// Sample up to `sample_size` distinct questions from `pool` in random order.
    pub fn start<R: Rng + ?Sized>(
        key: ProgressKey,
        level: u8,
        pool: &[Question],
        sample_size: usize,
        time_limit: Option<Duration>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        if sample_size == 0 {
            return Err(SessionError::ZeroSample);
        }

        let mut indices: Vec<usize> = (0..pool.len()).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size.min(pool.len()));

        let questions = indices
            .into_iter()
            .map(|i| {
                let question = pool[i].clone();
                let mut choices = question.choices.clone();
                choices.shuffle(rng);
                SessionQuestion { question, choices }
            })
            .collect();

        Ok(Self {
            key,
            level,
            questions,
            position: 0,
            correct: 0,
            feedback: None,
            countdown: time_limit.map(Countdown::new),
            finished: None,
            self_graded: false,
            started_at: Instant::now(),
            finished_at: None,
        })
    }

    pub fn answer_style(&self) -> AnswerStyle {
        self.key.category.answer_style()
    }

    pub fn sample_size(&self) -> usize {
        self.questions.len()
    }

    pub fn current(&self) -> Option<&SessionQuestion> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.position)
    }

    pub fn is_complete(&self) -> bool {
        self.finished.is_some()
    }

    /// Count one answer and move to the next question.
    pub fn record_answer(&mut self, is_correct: bool) {
        if self.is_complete() {
            return;
        }
        if is_correct {
            self.correct += 1;
        }
        self.advance();
    }

    /// Answer the current question with the choice at `index`.
    ///
    /// The tally is committed immediately; the position only moves on `next`.
    pub fn choose(&mut self, index: usize) -> Option<&Feedback> {
        if self.feedback.is_some() || self.answer_style() != AnswerStyle::Choice {
            return None;
        }
        let current = self.current()?;
        let chosen = current.choices.get(index)?.clone();
        let correct = current.question.is_correct(&chosen);
        let feedback = Feedback {
            correct,
            chosen,
            answer: current.question.answer.clone(),
            explanation: current.question.explanation.clone(),
        };
        if correct {
            self.correct += 1;
        }
        self.feedback = Some(feedback);
        self.feedback.as_ref()
    }

    /// Move past the current question.
    ///
    /// For choice questions this requires an answer first. Self-checked
    /// questions are skipped without scoring.
    pub fn next(&mut self) {
        if self.is_complete() {
            return;
        }
        match self.answer_style() {
            AnswerStyle::Choice => {
                if self.feedback.take().is_some() {
                    self.advance();
                }
            }
            AnswerStyle::SelfCheck => self.advance(),
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        if self.position >= self.questions.len() {
            self.finish(FinishReason::Answered);
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.finished.is_none() {
            self.finished = Some(reason);
            self.finished_at = Some(Instant::now());
        }
    }

    /// Advance the countdown. Yields `TimeUp` once, on the tick that expires it.
    pub fn tick(&mut self, dt: Duration) -> Option<SessionEvent> {
        if self.is_complete() {
            return None;
        }
        let expired = self.countdown.as_mut().is_some_and(|c| c.tick(dt));
        if expired {
            self.feedback = None;
            self.finish(FinishReason::TimeUp);
            Some(SessionEvent::TimeUp)
        } else {
            None
        }
    }

    pub fn timed_out(&self) -> bool {
        self.finished == Some(FinishReason::TimeUp)
    }

    /// Self-reported count for a finished free-write session.
    pub fn self_grade(&mut self, count: usize) {
        if !self.is_complete() || self.answer_style() != AnswerStyle::SelfCheck {
            return;
        }
        self.correct = count.min(self.sample_size());
        self.self_graded = true;
    }

    pub fn awaiting_self_grade(&self) -> bool {
        self.is_complete() && self.answer_style() == AnswerStyle::SelfCheck && !self.self_graded
    }

    pub fn score(&self) -> u32 {
        scoring::compute_score(self.correct, self.sample_size())
    }

    pub fn elapsed_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Instant::now);
        end.duration_since(self.started_at).as_secs_f64()
    }

    /// The scored result, once there is one to apply.
    pub fn result(&self) -> Option<SessionResult> {
        if !self.is_complete() || self.awaiting_self_grade() {
            return None;
        }
        Some(SessionResult::from_session(self))
    }
}

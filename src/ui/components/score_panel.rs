use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::scoring::UnlockOutcome;
use crate::session::result::SessionResult;
use crate::ui::theme::Theme;

pub struct ScorePanel<'a> {
    pub result: &'a SessionResult,
    pub outcome: UnlockOutcome,
    pub pass_score: u32,
    pub theme: &'a Theme,
}

impl<'a> ScorePanel<'a> {
    pub fn new(
        result: &'a SessionResult,
        outcome: UnlockOutcome,
        pass_score: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            result,
            outcome,
            pass_score,
            theme,
        }
    }

    fn outcome_line(&self) -> (String, Color) {
        let colors = &self.theme.colors;
        match self.outcome {
            UnlockOutcome::Failed => (
                format!("{} points needed to clear. Try again!", self.pass_score),
                colors.warning(),
            ),
            UnlockOutcome::Unlocked { next } => {
                (format!("Clear! Level {next} unlocked."), colors.success())
            }
            UnlockOutcome::AlreadyUnlocked => ("Clear!".to_string(), colors.success()),
            UnlockOutcome::Mastered => (
                "All levels cleared. Category mastered!".to_string(),
                colors.star(),
            ),
        }
    }
}

impl Widget for ScorePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let block = Block::bordered()
            .title(format!(
                " {} Lv.{} ",
                result.key.category.name(),
                result.level
            ))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let score_color = if result.score >= self.pass_score {
            colors.success()
        } else if result.score >= self.pass_score / 2 {
            colors.warning()
        } else {
            colors.error()
        };
        let (message, message_color) = self.outcome_line();

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("Score  ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{} 点", result.score),
                    Style::default()
                        .fg(score_color)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("{}/{} correct  {:.1}s", result.correct, result.total, result.elapsed_secs),
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
        ];
        if result.time_up {
            lines.push(Line::from(Span::styled(
                "Time's up!",
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            )));
        }
        if result.self_checked {
            lines.push(Line::from(Span::styled(
                "(self-checked)",
                Style::default().fg(colors.text_muted()),
            )));
        }
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(message_color).add_modifier(Modifier::BOLD),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::category::{Category, Mode, ProgressKey};
    use chrono::Utc;

    fn result(score: u32, time_up: bool) -> SessionResult {
        SessionResult {
            key: ProgressKey::new(Category::Reading, Mode::Oni),
            level: 2,
            score,
            correct: (score / 20) as usize,
            total: 5,
            time_up,
            self_checked: false,
            elapsed_secs: 12.0,
            timestamp: Utc::now(),
        }
    }

    fn render_text(panel: ScorePanel) -> String {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_unlock_message() {
        let theme = Theme::default();
        let r = result(100, false);
        let text = render_text(ScorePanel::new(
            &r,
            UnlockOutcome::Unlocked { next: 3 },
            100,
            &theme,
        ));
        assert!(text.contains("Level 3 unlocked"));
        assert!(!text.contains("Time's up"));
    }

    #[test]
    fn test_time_up_failure() {
        let theme = Theme::default();
        let r = result(40, true);
        let text = render_text(ScorePanel::new(&r, UnlockOutcome::Failed, 100, &theme));
        assert!(text.contains("Time's up"));
        assert!(text.contains("100 points needed"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::category::ProgressKey;
use crate::engine::progress::{FIRST_LEVEL, MAX_LEVEL, ProgressStore};
use crate::session::result::{SessionResult, best_score};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelState {
    Cleared,
    Open,
    Locked,
}

pub fn level_state(progress: &ProgressStore, key: ProgressKey, level: u8) -> LevelState {
    if progress.is_cleared(key, level) {
        LevelState::Cleared
    } else if progress.is_playable(key, level) {
        LevelState::Open
    } else {
        LevelState::Locked
    }
}

pub struct LevelSelect<'a> {
    pub key: ProgressKey,
    pub progress: &'a ProgressStore,
    pub history: &'a [SessionResult],
    pub selected: u8,
    pub theme: &'a Theme,
}

impl<'a> LevelSelect<'a> {
    pub fn new(
        key: ProgressKey,
        progress: &'a ProgressStore,
        history: &'a [SessionResult],
        selected: u8,
        theme: &'a Theme,
    ) -> Self {
        Self {
            key,
            progress,
            history,
            selected,
            theme,
        }
    }
}

impl Widget for LevelSelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " {} / {} ",
                self.key.category.name(),
                self.key.mode.name()
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(Span::styled(
                self.key.category.title(),
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
        ];

        for level in FIRST_LEVEL..=MAX_LEVEL {
            let state = level_state(self.progress, self.key, level);
            let is_selected = level == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let (status, color) = match state {
                LevelState::Cleared => ("clear", colors.success()),
                LevelState::Open => ("open", colors.accent()),
                LevelState::Locked => ("locked", colors.locked()),
            };
            let best = best_score(self.history, self.key, level)
                .map(|s| format!("  best {s}"))
                .unwrap_or_default();

            let mut style = Style::default().fg(if state == LevelState::Locked {
                colors.locked()
            } else {
                colors.fg()
            });
            if is_selected {
                style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
            }

            lines.push(Line::from(vec![
                Span::styled(format!(" {indicator} Level {level}  "), style),
                Span::styled(format!("{status:<7}"), Style::default().fg(color)),
                Span::styled(best, Style::default().fg(colors.text_muted())),
            ]));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .render(inner, buf);
    }
}

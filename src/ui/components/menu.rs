use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::category::{Category, Mode, ProgressKey};
use crate::engine::progress::ProgressStore;
use crate::ui::theme::Theme;

pub const STAR: &str = "★";

/// Category list for the current mode, with mode tabs along the top.
pub struct CategoryMenu<'a> {
    pub progress: &'a ProgressStore,
    pub mode: Mode,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> CategoryMenu<'a> {
    pub fn new(progress: &'a ProgressStore, mode: Mode, selected: usize, theme: &'a Theme) -> Self {
        Self {
            progress,
            mode,
            selected,
            theme,
        }
    }

    fn mode_tabs(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let mut spans = Vec::new();
        for &mode in Mode::all() {
            let active = mode == self.mode;
            let star = if self.progress.mode_mastered(mode) {
                STAR
            } else {
                ""
            };
            let style = if active {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            spans.push(Span::styled(format!(" {}{star} ", mode.name()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

/// `[Lv.N]` badge text; mastered categories get a star instead of a level.
pub fn level_badge(progress: &ProgressStore, key: ProgressKey) -> String {
    if progress.is_mastered(key) {
        format!("[Lv.{}{STAR}]", progress.display_level(key))
    } else {
        format!("[Lv.{}]", progress.display_level(key))
    }
}

impl Widget for &CategoryMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "漢字ドリル",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Grade 4 kanji practice",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        Paragraph::new(self.mode_tabs())
            .alignment(Alignment::Center)
            .render(layout[1], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                Category::all()
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, &category) in Category::all().iter().enumerate() {
            let key = ProgressKey::new(category, self.mode);
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let badge = level_badge(self.progress, key);
            let badge_color = if self.progress.is_mastered(key) {
                colors.star()
            } else {
                colors.text_muted()
            };

            let label_style = Style::default()
                .fg(if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!(" {indicator} [{}] {}  ", i + 1, category.name()),
                        label_style,
                    ),
                    Span::styled(badge, Style::default().fg(badge_color)),
                ]),
                Line::from(Span::styled(
                    format!("       {}", category.title()),
                    Style::default().fg(colors.text_muted()),
                )),
            ];

            if i < rows.len() {
                Paragraph::new(lines).render(rows[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_badge() {
        let mut progress = ProgressStore::new();
        let key = ProgressKey::new(Category::Nuance, Mode::Normal);
        assert_eq!(level_badge(&progress, key), "[Lv.1]");
        progress.set(key, 4);
        assert_eq!(level_badge(&progress, key), "[Lv.4]");
        progress.set(key, 6);
        assert_eq!(level_badge(&progress, key), "[Lv.5★]");
    }

    #[test]
    fn test_renders_every_category() {
        let progress = ProgressStore::new();
        let theme = Theme::default();
        let menu = CategoryMenu::new(&progress, Mode::Easy, 0, &theme);
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        (&menu).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Lv.1"));
        assert!(text.contains(">"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::QuizSession;
use crate::ui::theme::Theme;

/// Answer sheet for free-write sessions plus the "how many did you get" picker.
pub struct SelfCheckPanel<'a> {
    pub session: &'a QuizSession,
    pub count: usize,
    pub theme: &'a Theme,
}

impl<'a> SelfCheckPanel<'a> {
    pub fn new(session: &'a QuizSession, count: usize, theme: &'a Theme) -> Self {
        Self {
            session,
            count,
            theme,
        }
    }
}

impl Widget for SelfCheckPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" こたえあわせ ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(inner);

        let answers: Vec<Line> = self
            .session
            .questions
            .iter()
            .enumerate()
            .map(|(i, sq)| {
                Line::from(vec![
                    Span::styled(format!(" {}. ", i + 1), Style::default().fg(colors.accent())),
                    Span::styled(
                        sq.question.display_prompt().into_owned(),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled("  → ", Style::default().fg(colors.text_muted())),
                    Span::styled(
                        sq.question.answer.clone(),
                        Style::default()
                            .fg(colors.correct())
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();
        Paragraph::new(answers)
            .wrap(Wrap { trim: false })
            .render(layout[0], buf);

        let total = self.session.sample_size();
        let picker = vec![
            Line::from(Span::styled(
                "いくつ 書けたかな？",
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(vec![
                Span::styled("  ◀ ", Style::default().fg(colors.accent())),
                Span::styled(
                    format!("{} / {total}", self.count),
                    Style::default()
                        .fg(colors.fg())
                        .bg(colors.selected_bg())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" ▶", Style::default().fg(colors.accent())),
            ]),
        ];
        Paragraph::new(picker).render(layout[1], buf);
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::category::AnswerStyle;
use crate::session::quiz::QuizSession;
use crate::ui::theme::Theme;

pub struct QuestionArea<'a> {
    session: &'a QuizSession,
    theme: &'a Theme,
}

impl<'a> QuestionArea<'a> {
    pub fn new(session: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    fn choice_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(current) = self.session.current() else {
            return Vec::new();
        };
        let feedback = self.session.feedback.as_ref();

        current
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let style = match feedback {
                    Some(fb) if *choice == fb.answer => Style::default()
                        .fg(colors.correct())
                        .add_modifier(Modifier::BOLD),
                    Some(fb) if *choice == fb.chosen => Style::default()
                        .fg(colors.incorrect())
                        .add_modifier(Modifier::CROSSED_OUT),
                    Some(_) => Style::default().fg(colors.text_muted()),
                    None => Style::default().fg(colors.fg()),
                };
                Line::from(vec![
                    Span::styled(format!("  {}. ", i + 1), Style::default().fg(colors.accent())),
                    Span::styled(choice.clone(), style),
                ])
            })
            .collect()
    }

    fn feedback_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(fb) = self.session.feedback.as_ref() else {
            return Vec::new();
        };
        let (mark, color) = if fb.correct {
            ("○ せいかい！", colors.correct())
        } else {
            ("× ざんねん…", colors.incorrect())
        };
        let mut lines = vec![Line::from(Span::styled(
            mark,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if !fb.correct {
            lines.push(Line::from(Span::styled(
                format!("こたえ: {}", fb.answer),
                Style::default().fg(colors.fg()),
            )));
            if let Some(ref explanation) = fb.explanation {
                lines.push(Line::from(Span::styled(
                    explanation.clone(),
                    Style::default().fg(colors.text_muted()),
                )));
            }
        }
        lines
    }
}

impl Widget for QuestionArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;

        let block = Block::bordered()
            .title(format!(
                " 問 {}/{} ",
                (session.position + 1).min(session.sample_size()),
                session.sample_size()
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(current) = session.current() else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(4),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            current.question.display_prompt().into_owned(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .render(layout[0], buf);

        match session.answer_style() {
            AnswerStyle::Choice => {
                Paragraph::new(self.choice_lines()).render(layout[1], buf);
                Paragraph::new(self.feedback_lines())
                    .wrap(Wrap { trim: false })
                    .render(layout[2], buf);
            }
            AnswerStyle::SelfCheck => {
                let lines = vec![
                    Line::from(Span::styled(
                        "かっこの よみを 漢字で 紙に 書こう。",
                        Style::default().fg(colors.text_muted()),
                    )),
                    Line::from(Span::styled(
                        "書けたら Enter で つぎへ。こたえは さいごに 出ます。",
                        Style::default().fg(colors.text_muted()),
                    )),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: false })
                    .render(layout[1], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::category::{Category, Mode, ProgressKey};
    use crate::session::question::Question;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn session() -> QuizSession {
        let pool = vec![Question {
            prompt: "「季節」の読みは？".to_string(),
            answer: "きせつ".to_string(),
            choices: vec!["きせつ".to_string(), "きぶし".to_string()],
            explanation: Some("季=き、節=せつ".to_string()),
            hint: None,
        }];
        let mut rng = SmallRng::seed_from_u64(5);
        QuizSession::start(
            ProgressKey::new(Category::Reading, Mode::Easy),
            1,
            &pool,
            1,
            None,
            &mut rng,
        )
        .unwrap()
    }

    fn feedback_text(correct: bool) -> String {
        let mut session = session();
        let idx = {
            let current = session.current().unwrap();
            current
                .choices
                .iter()
                .position(|c| current.question.is_correct(c) == correct)
                .unwrap()
        };
        session.choose(idx);
        let theme = Theme::default();
        QuestionArea::new(&session, &theme)
            .feedback_lines()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_explanation_only_after_wrong_answer() {
        let wrong = feedback_text(false);
        assert!(wrong.contains("こたえ: きせつ"));
        assert!(wrong.contains("季=き、節=せつ"));

        let right = feedback_text(true);
        assert!(right.contains("せいかい"));
        assert!(!right.contains("季=き、節=せつ"));
    }
}

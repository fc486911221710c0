use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

use crate::engine::timer::{Countdown, Urgency};
use crate::ui::theme::Theme;

/// Remaining-time gauge. Turns warning then error colored as time runs out.
pub struct TimerBar<'a> {
    pub countdown: &'a Countdown,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(countdown: &'a Countdown, theme: &'a Theme) -> Self {
        Self { countdown, theme }
    }

    fn fill_color(&self) -> Color {
        let colors = &self.theme.colors;
        match self.countdown.urgency() {
            Urgency::Calm => colors.success(),
            Urgency::Warning => colors.warning(),
            Urgency::Critical => colors.error(),
        }
    }
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" のこり時間 ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = self.countdown.ratio().clamp(0.0, 1.0);
        let filled_width = (ratio * inner.width as f64).round() as u16;
        let fill = self.fill_color();
        let label = format!("{}s", self.countdown.remaining().as_secs_f64().ceil() as u64);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

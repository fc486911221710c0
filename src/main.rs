use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use kanjidr::app::{App, AppScreen};
use kanjidr::config::Config;
use kanjidr::engine::category::{AnswerStyle, Category, Mode};
use kanjidr::engine::progress::FIRST_LEVEL;
use kanjidr::event::{AppEvent, EventHandler};
use kanjidr::logging;
use kanjidr::ui::components::level_select::LevelSelect;
use kanjidr::ui::components::menu::CategoryMenu;
use kanjidr::ui::components::question_area::QuestionArea;
use kanjidr::ui::components::score_panel::ScorePanel;
use kanjidr::ui::components::self_check::SelfCheckPanel;
use kanjidr::ui::components::timer_bar::TimerBar;
use kanjidr::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use kanjidr::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "kanjidr", version, about = "Terminal kanji drill with leveled stages and timed modes")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Starting mode (easy, normal, hard, oni)")]
    mode: Option<String>,

    #[arg(short, long, help = "Number of questions per session")]
    questions: Option<usize>,

    #[arg(long, help = "Score needed to clear a level (1-100)")]
    pass_score: Option<u32>,

    #[arg(long, help = "Directory containing stage_d1.json .. stage_d5.json")]
    question_dir: Option<String>,

    #[arg(long, help = "List bundled themes and exit")]
    list_themes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_default();
    if !Config::config_path().exists() {
        // First run: write defaults so there is a file to edit
        let _ = config.save();
    }

    if let Err(e) = logging::init(&logging::default_log_path(), config.log_level()) {
        eprintln!("logging disabled: {e}");
    }

    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(questions) = cli.questions {
        config.questions_per_session = questions;
    }
    if let Some(pass_score) = cli.pass_score {
        config.pass_score = pass_score;
    }
    if let Some(dir) = cli.question_dir {
        config.question_dir = Some(dir);
    }
    config.validate();

    let tick_rate = Duration::from_millis(config.tick_ms);
    let mut app = App::new(config);

    if let Some(name) = cli.mode {
        match Mode::from_key(&name) {
            Some(mode) => app.set_mode(mode),
            None => log::warn!("unknown mode {name:?}, keeping {}", app.mode.to_key()),
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }
    log::logger().flush();

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::CategorySelect => handle_category_key(app, key),
        AppScreen::LevelSelect => handle_level_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::SelfCheck => handle_self_check_key(app, key),
        AppScreen::Score => handle_score_key(app, key),
    }
}

fn digit(key: &KeyEvent) -> Option<usize> {
    match key.code {
        KeyCode::Char(c) => c.to_digit(10).map(|d| d as usize),
        _ => None,
    }
}

fn handle_category_key(app: &mut App, key: KeyEvent) {
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.confirm_reset(),
            _ => app.cancel_reset(),
        }
        return;
    }

    if let Some(d) = digit(&key) {
        if let Some(&category) = d.checked_sub(1).and_then(|i| Category::all().get(i)) {
            app.select_category(category);
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.prev_category(),
        KeyCode::Down | KeyCode::Char('j') => app.next_category(),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_mode(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_mode(),
        KeyCode::Enter => app.open_levels(),
        KeyCode::Char('x') => app.request_reset(),
        _ => {}
    }
}

fn handle_level_key(app: &mut App, key: KeyEvent) {
    if let Some(d) = digit(&key) {
        if let Ok(level @ 1..=5) = u8::try_from(d) {
            app.start_level(level);
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_categories(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_level_selection(),
        KeyCode::Down | KeyCode::Char('j') => app.next_level_selection(),
        KeyCode::Enter => app.start_level(app.level_selected),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let style = app
        .session
        .as_ref()
        .map_or(AnswerStyle::Choice, |s| s.answer_style());
    let answered = app.session.as_ref().is_some_and(|s| s.feedback.is_some());

    match key.code {
        KeyCode::Esc => app.abandon_session(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if answered || style == AnswerStyle::SelfCheck {
                app.next_question();
            }
        }
        _ => {
            if let Some(d) = digit(&key) {
                if style == AnswerStyle::Choice && !answered && d >= 1 {
                    app.choose(d - 1);
                }
            }
        }
    }
}

fn handle_self_check_key(app: &mut App, key: KeyEvent) {
    if let Some(d) = digit(&key) {
        app.set_self_check_count(d);
        return;
    }
    match key.code {
        KeyCode::Up | KeyCode::Right | KeyCode::Char('k') | KeyCode::Char('l') => {
            app.self_check_increment()
        }
        KeyCode::Down | KeyCode::Left | KeyCode::Char('j') | KeyCode::Char('h') => {
            app.self_check_decrement()
        }
        KeyCode::Enter => app.submit_self_check(),
        _ => {}
    }
}

fn handle_score_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('n') => app.advance_level(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_categories(),
        KeyCode::Enter => {
            if app.can_advance() {
                app.advance_level();
            } else {
                app.retry();
            }
        }
        _ => {}
    }
}

// --- Rendering ---

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app);
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::CategorySelect => render_categories(frame, app, layout.main),
        AppScreen::LevelSelect => render_levels(frame, app, layout.main),
        AppScreen::Quiz => render_quiz(frame, app, layout.main),
        AppScreen::SelfCheck => render_self_check(frame, app, layout.main),
        AppScreen::Score => render_score(frame, app, layout.main),
    }

    let footer_lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);

    if app.confirm_reset {
        render_reset_confirm(frame, app);
    }
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    match app.screen {
        AppScreen::CategorySelect => vec![
            "[1-5] Category",
            "[Tab/h/l] Mode",
            "[Enter] Open",
            "[x] Reset",
            "[q] Quit",
        ],
        AppScreen::LevelSelect => vec!["[1-5] Start level", "[Enter] Start", "[Esc] Back"],
        AppScreen::Quiz => {
            if app.is_free_write() {
                vec!["[Enter] Next", "[Esc] Quit session"]
            } else {
                vec!["[1-4] Answer", "[Enter] Next", "[Esc] Quit session"]
            }
        }
        AppScreen::SelfCheck => vec!["[0-9/Up/Down] Count", "[Enter] Submit"],
        AppScreen::Score => {
            if app.can_advance() {
                vec!["[n/Enter] Next level", "[r] Retry", "[q] Menu"]
            } else {
                vec!["[r/Enter] Retry", "[q] Menu"]
            }
        }
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let mut info = format!(
        " {} | {} | {}/20 mastered",
        app.mode.name(),
        app.bank_description(),
        app.progress.unlocked.mastered_count()
    );
    if let Some(ref session) = app.session {
        if matches!(app.screen, AppScreen::Quiz | AppScreen::SelfCheck) {
            info = format!(
                " {} Lv.{} | {} | {} correct",
                session.key.category.name(),
                session.level,
                session.key.mode.name(),
                session.correct
            );
        }
    }

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                " kanjidr ",
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(info, Style::default().fg(colors.text_muted()).bg(colors.header_bg())),
        ]),
        notice_line(app),
    ])
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn notice_line(app: &App) -> Line<'static> {
    let colors = &app.theme.colors;
    match app.notice {
        Some(ref notice) => Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(colors.warning()),
        )),
        None => Line::from(""),
    }
}

fn render_categories(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let menu = CategoryMenu::new(
        &app.progress.unlocked,
        app.mode,
        app.category_selected,
        app.theme,
    );
    let menu_area = centered_rect(60, 95, area);
    frame.render_widget(&menu, menu_area);
}

fn render_levels(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let widget = LevelSelect::new(
        app.key(),
        &app.progress.unlocked,
        &app.history.sessions,
        app.level_selected.max(FIRST_LEVEL),
        app.theme,
    );
    frame.render_widget(widget, centered_rect(50, 70, area));
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(ref session) = app.session else {
        return;
    };

    match session.countdown {
        Some(ref countdown) => {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(6)])
                .split(area);
            frame.render_widget(TimerBar::new(countdown, app.theme), layout[0]);
            frame.render_widget(QuestionArea::new(session, app.theme), layout[1]);
        }
        None => frame.render_widget(QuestionArea::new(session, app.theme), area),
    }
}

fn render_self_check(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    if let Some(ref session) = app.session {
        frame.render_widget(
            SelfCheckPanel::new(session, app.self_check_count, app.theme),
            area,
        );
    }
}

fn render_score(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    if let (Some(result), Some(outcome)) = (app.last_result.as_ref(), app.last_outcome) {
        let panel = ScorePanel::new(result, outcome, app.pass_score(), app.theme);
        frame.render_widget(panel, centered_rect(50, 60, area));
    }
}

fn render_reset_confirm(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Reset ")
        .border_style(Style::default().fg(colors.error()))
        .style(Style::default().bg(colors.bg()));
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Erase all progress and history?",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Yes   [any other key] No",
            Style::default().fg(colors.text_muted()),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: false })
    .block(block);
    frame.render_widget(text, area);
}

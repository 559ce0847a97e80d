//! Scinapse Lab - Terminal User Interface
//!
//! Runs the pendulum, projectile and wave simulations on a ratatui canvas.
//! App logic lives in `scinapse::tui::lab_app`.
//!
//! Usage: `lab_tui [pendulum|projectile|wave] [--config FILE]`

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use scinapse::config::LabConfig;
    use scinapse::sims::SimulationKind;
    use scinapse::tui::lab_app::LabApp;

    let mut kind = SimulationKind::Pendulum;
    let mut config = LabConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let Some(path) = args.next() else {
                    eprintln!("--config requires a path");
                    std::process::exit(2);
                };
                config = LabConfig::load(&path).unwrap_or_else(|e| {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                });
            }
            other => {
                kind = other.parse().unwrap_or_else(|e| {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                });
            }
        }
    }

    tui::run(LabApp::new(kind, config))
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{canvas::Canvas, Block, Borders, Paragraph},
        Frame, Terminal,
    };
    use scinapse::driver::RunState;
    use scinapse::engine::TickSource;
    use scinapse::tui::lab_app::LabApp;
    use std::io;
    use std::time::{Duration, Instant};

    /// Run the TUI application.
    pub fn run<C: TickSource>(mut app: LabApp<C>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(16);

        loop {
            let start = Instant::now();
            terminal.draw(|f| ui(f, &app))?;

            let timeout = tick_rate.saturating_sub(start.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }

            if app.should_quit {
                break;
            }

            app.update();
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn ui<C: TickSource>(f: &mut Frame, app: &LabApp<C>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(32)])
            .split(chunks[1]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(7)])
            .split(body[1]);

        render_title(f, chunks[0], app);
        render_canvas(f, body[0], app);
        render_readouts(f, side[0], app);
        render_sliders(f, side[1], app);
        render_status(f, chunks[2], app);
    }

    fn render_title<C: TickSource>(f: &mut Frame, area: Rect, app: &LabApp<C>) {
        let running = app.run_state() == RunState::Running;
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                " SCINAPSE LAB ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                app.kind().as_str().to_uppercase(),
                Style::default().fg(Color::White),
            ),
            Span::raw(" | "),
            Span::styled(
                if running { "[RUNNING]" } else { "[IDLE]" },
                Style::default().fg(if running { Color::Green } else { Color::Yellow }),
            ),
        ])])
        .block(Block::default().borders(Borders::ALL).title(
            "Controls: [Space] Start/Pause  [R] Reset  [1-3] Sim  [↑↓←→] Params  [W] Wave  [Q] Quit",
        ));
        f.render_widget(title, area);
    }

    fn render_canvas<C: TickSource>(f: &mut Frame, area: Rect, app: &LabApp<C>) {
        let painter = app.painter();
        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title("Simulation"))
            .x_bounds(painter.x_bounds())
            .y_bounds(painter.y_bounds())
            .paint(|ctx| painter.draw(ctx));
        f.render_widget(canvas, area);
    }

    fn render_readouts<C: TickSource>(f: &mut Frame, area: Rect, app: &LabApp<C>) {
        let lines: Vec<Line> = app
            .readouts()
            .into_iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(format!("{:<12}", r.label), Style::default().fg(Color::Gray)),
                    Span::styled(r.display_value(), Style::default().fg(Color::White)),
                ])
            })
            .collect();
        let widget =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Readouts"));
        f.render_widget(widget, area);
    }

    fn render_sliders<C: TickSource>(f: &mut Frame, area: Rect, app: &LabApp<C>) {
        let lines: Vec<Line> = app
            .sliders()
            .into_iter()
            .enumerate()
            .map(|(i, (slider, value))| {
                let style = if i == app.selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(Span::styled(format!("{:<16}{value:.1}", slider.label), style))
            })
            .collect();
        let widget =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Parameters"));
        f.render_widget(widget, area);
    }

    fn render_status<C: TickSource>(f: &mut Frame, area: Rect, app: &LabApp<C>) {
        let stats = app.driver().stats();
        let status = Paragraph::new(vec![Line::from(vec![
            Span::styled("Frames: ", Style::default().fg(Color::Gray)),
            Span::styled(stats.frames.to_string(), Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled("Frozen: ", Style::default().fg(Color::Gray)),
            Span::styled(
                stats.frozen_frames.to_string(),
                Style::default().fg(if stats.frozen_frames == 0 {
                    Color::Green
                } else {
                    Color::Red
                }),
            ),
            Span::raw(" | "),
            Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
        ])])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(status, area);
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use ratatui::backend::TestBackend;
        use scinapse::config::LabConfig;
        use scinapse::engine::ManualClock;
        use scinapse::sims::SimulationKind;

        fn create_test_terminal() -> Terminal<TestBackend> {
            let backend = TestBackend::new(120, 40);
            Terminal::new(backend).expect("Failed to create test terminal")
        }

        fn app(kind: SimulationKind) -> LabApp<ManualClock> {
            LabApp::with_clock(kind, LabConfig::default(), ManualClock::new())
        }

        fn screen(terminal: &Terminal<TestBackend>) -> String {
            terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(ratatui::buffer::Cell::symbol)
                .collect()
        }

        #[test]
        fn test_ui_renders_every_simulation() {
            for kind in SimulationKind::ALL {
                let mut terminal = create_test_terminal();
                let app = app(kind);
                terminal
                    .draw(|f| ui(f, &app))
                    .expect("UI should render without panic");
            }
        }

        #[test]
        fn test_title_shows_idle_then_running() {
            let mut terminal = create_test_terminal();
            let mut app = app(SimulationKind::Wave);
            terminal.draw(|f| ui(f, &app)).expect("render");
            assert!(screen(&terminal).contains("[IDLE]"));

            app.handle_key(crossterm::event::KeyCode::Char(' '));
            terminal.draw(|f| ui(f, &app)).expect("render");
            assert!(screen(&terminal).contains("[RUNNING]"));
        }

        #[test]
        fn test_readouts_panel_lists_period() {
            let mut terminal = create_test_terminal();
            let app = app(SimulationKind::Pendulum);
            terminal.draw(|f| ui(f, &app)).expect("render");
            let text = screen(&terminal);
            assert!(text.contains("Period"));
            assert!(text.contains("2.46 s"));
        }

        #[test]
        fn test_tiny_terminal_does_not_panic() {
            let mut terminal = Terminal::new(TestBackend::new(20, 5)).expect("terminal");
            let app = app(SimulationKind::Projectile);
            terminal.draw(|f| ui(f, &app)).expect("render");
        }
    }
}

use std::io;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use arcade_vault::config::{self, Config};
use arcade_vault::event::{Event, EventHandler};
use arcade_vault::scores::BestScores;
use arcade_vault::{ui, App, LoopDriver};

/// Raw mode, alternate screen and mouse capture for as long as it lives.
/// Dropping it restores the terminal, including while unwinding a panic.
struct TerminalGuard {
    /// Key release events are reported
    enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("entering alternate screen")?;

        let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .context("enabling key release events")?;
        }
        log::info!("Terminal ready (key release events: {enhanced})");
        Ok(Self { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    config::init_logging(&config)?;

    let scores_path = config.scores_file.clone().unwrap_or_else(BestScores::default_path);
    let best = BestScores::load(scores_path);

    // Setup terminal
    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("creating terminal")?;
    terminal.clear()?;

    let mut app = App::new(&config, best, guard.enhanced);
    let events = EventHandler::new(config.tick_ms);
    let mut driver = LoopDriver::new();

    let result = run(&mut terminal, &mut app, &events, &mut driver);

    driver.stop();
    app.close_game();
    drop(terminal);
    drop(guard);

    if let Err(e) = &result {
        log::error!("Exiting with error: {e:#}");
    }
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    driver: &mut LoopDriver,
) -> anyhow::Result<()> {
    while !app.should_quit {
        match events.next()? {
            Event::Tick => {
                let now = Instant::now();
                app.on_tick(now);
                let running = app.is_game_running();
                driver.frame(
                    now,
                    app,
                    running,
                    |app, dt| app.step_game(dt.seconds),
                    |app| terminal.draw(|frame| ui::render(frame, app)).map(|_| ()),
                )?;
            }
            Event::Key(key) => app.on_key(key, Instant::now()),
            Event::Mouse(mouse) => app.on_mouse(mouse),
            Event::Resize(w, h) => log::debug!("Resized to {w}x{h}"),
        }
    }
    log::info!("Quit after {} frames", driver.frame_count());
    Ok(())
}

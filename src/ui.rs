// src/ui.rs

pub mod confirm;

use crate::app::{App, AppScreen};
use crate::chat_view::draw_chat;
use crate::key_handlers::handle_chat_input;
use crate::splash_screen::SplashScreenAction;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

enum Event {
    Input(CEvent),
    Tick,
}

/// Sets up the terminal, runs the main loop, and restores the terminal no
/// matter how the loop ends. Pending request tasks are aborted on the way
/// out so nothing writes into torn-down state.
pub async fn run_ui(app: App) -> Result<(), Box<dyn Error + Send + Sync>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = Arc::new(Mutex::new(app));
    let res = run_app(&mut terminal, app.clone()).await;

    app.lock().await.abort_pending_tasks();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // Input reader + tick source. The tick drives the spinner and the
    // typing effect, so it has to run faster than a housekeeping tick.
    tokio::spawn(async move {
        let mut last_tick = Instant::now();
        loop {
            let timeout = Duration::from_millis(25);
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(event) = event::read() {
                    if tx.send(Event::Input(event)).await.is_err() {
                        return;
                    }
                }
            }

            if last_tick.elapsed() >= Duration::from_millis(50) {
                if tx.send(Event::Tick).await.is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        {
            let mut guard = app.lock().await;
            terminal.draw(|f| draw(f, &mut guard))?;
            if guard.should_quit {
                break;
            }
        }

        match rx.recv().await {
            Some(Event::Input(CEvent::Key(key))) => {
                let mut guard = app.lock().await;
                match guard.screen {
                    AppScreen::Splash => {
                        if let Some(action) = guard.splash_screen.handle_input(key) {
                            match action {
                                SplashScreenAction::Quit => guard.should_quit = true,
                                SplashScreenAction::OpenChat => guard.screen = AppScreen::Chat,
                            }
                        }
                    }
                    AppScreen::Chat => {
                        handle_chat_input(key, &mut guard, app.clone());
                    }
                }
            }
            Some(Event::Input(_)) => {}
            Some(Event::Tick) => {
                let mut guard = app.lock().await;
                guard.typing.advance(Instant::now());
                guard.status_indicator.update_spinner();
            }
            None => break,
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        AppScreen::Splash => app.splash_screen.draw(f, f.area()),
        AppScreen::Chat => draw_chat(f, app),
    }

    if let Some(action) = app.confirm {
        confirm::draw_confirm(f, f.area(), action);
    }
}

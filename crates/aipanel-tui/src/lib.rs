//! aipanel-tui: Terminal side-panel UI for AIPanel
//!
//! This crate provides the presentation layer for the panel: a chat
//! transcript, an animated typing indicator, and a message input box.
//! The exchange semantics live in `aipanel-engine`; this crate only
//! feeds it submissions and draws its state.

mod app;
mod event;
mod input;
mod ui;

pub use app::PanelApp;
pub use event::{PanelEvent, PanelEvents};
pub use input::TextInputState;

use std::io::{self, stdout};
use std::time::Duration;

use aipanel_engine::{ExchangeController, ProviderError};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the panel TUI around a prepared exchange controller.
///
/// Sets up the terminal, loads history, runs the event loop, and
/// restores the terminal on exit.
pub async fn run_panel(
    mut controller: ExchangeController,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.load_history().await;

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = PanelApp::new(controller);

    // 4 Hz tick rate drives the typing indicator animation
    let mut events = PanelEvents::new(Duration::from_millis(250));

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut PanelApp,
    events: &mut PanelEvents,
) -> Result<(), Box<dyn std::error::Error>> {
    // At most one reply resolves at a time; the controller's processing
    // flag rejects submissions while this handle is live.
    let mut pending: Option<JoinHandle<Result<String, ProviderError>>> = None;

    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Check for a completed reply (non-blocking)
        if pending.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = pending.take() {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(ProviderError::Failed(format!("reply task panicked: {e}"))),
                };
                app.controller.finish_turn(result).await;
            }
        }

        match events.next().await {
            PanelEvent::Key(key) => {
                if let Some(input) = app.handle_key(key) {
                    let provider = app.controller.provider();
                    pending = Some(tokio::spawn(async move {
                        provider.reply(&input).await
                    }));
                }
            }
            PanelEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => app.scroll_up(),
                MouseEventKind::ScrollDown => app.scroll_down(),
                _ => {}
            },
            PanelEvent::Tick => app.tick(),
            PanelEvent::Resize => {
                // Next draw picks up the new size.
            }
        }

        if app.should_quit {
            // No cancellation: let an in-flight reply run to completion
            // so the turn persists before the panel closes.
            if let Some(handle) = pending.take() {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(ProviderError::Failed(format!("reply task panicked: {e}"))),
                };
                app.controller.finish_turn(result).await;
            }
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}

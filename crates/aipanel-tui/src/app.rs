//! Application state for the panel TUI.

use aipanel_engine::ExchangeController;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::TextInputState;

/// Top-level state for one panel instance.
pub struct PanelApp {
    /// The exchange controller owning the conversation.
    pub controller: ExchangeController,
    /// Message input box state.
    pub input: TextInputState,
    /// Transcript scroll offset, measured in lines up from the bottom.
    pub scroll_from_bottom: u16,
    /// Whether the app should exit.
    pub should_quit: bool,
    /// Tick counter driving the typing-indicator animation.
    tick_count: u64,
}

impl PanelApp {
    /// Create the app around an exchange controller.
    pub fn new(controller: ExchangeController) -> Self {
        Self {
            controller,
            input: TextInputState::new(),
            scroll_from_bottom: 0,
            should_quit: false,
            tick_count: 0,
        }
    }

    /// Advance the animation clock.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Typing indicator text while a turn is in flight.
    pub fn typing_indicator(&self) -> Option<String> {
        if !self.controller.is_processing() {
            return None;
        }
        let dots = usize::try_from(self.tick_count % 3).unwrap_or(0) + 1;
        Some(format!("AI đang trả lời{}", ".".repeat(dots)))
    }

    /// Scroll the transcript up (towards older messages).
    pub fn scroll_up(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(1);
    }

    /// Scroll the transcript down (towards the latest message).
    pub fn scroll_down(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(1);
    }

    /// Handle a key event.
    ///
    /// Returns the trimmed input of an accepted submission, which the
    /// event loop resolves off-loop; `None` for everything else.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        // Quit keys work regardless of state.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        if key.code == KeyCode::Esc {
            self.should_quit = true;
            return None;
        }

        // Transcript scrolling stays available while a reply resolves.
        match key.code {
            KeyCode::Up => {
                self.scroll_up();
                return None;
            }
            KeyCode::Down => {
                self.scroll_down();
                return None;
            }
            _ => {}
        }

        // While a turn is in flight the input is disabled; submissions
        // and edits are silent no-ops.
        if self.controller.is_processing() {
            return None;
        }

        // Ctrl+Enter inserts a newline (TTY stand-in for Shift+Enter).
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Enter {
            self.input.insert('\n');
            return None;
        }

        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char(c) => {
                self.input.insert(c);
                None
            }
            KeyCode::Backspace => {
                self.input.backspace();
                None
            }
            KeyCode::Delete => {
                self.input.delete();
                None
            }
            KeyCode::Left => {
                self.input.move_left();
                None
            }
            KeyCode::Right => {
                self.input.move_right();
                None
            }
            KeyCode::Home => {
                self.input.move_home();
                None
            }
            KeyCode::End => {
                self.input.move_end();
                None
            }
            _ => None,
        }
    }

    /// Try to start a turn from the input box contents.
    fn submit_input(&mut self) -> Option<String> {
        let content = self.input.content().to_string();
        let accepted = self.controller.begin_turn(&content)?;
        // The input buffer clears only on an accepted submission.
        self.input.clear();
        self.scroll_from_bottom = 0;
        Some(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aipanel_engine::{MemoryStore, SimulatedResponder};
    use std::sync::Arc;

    fn test_app() -> PanelApp {
        let controller = ExchangeController::new(
            Arc::new(SimulatedResponder::new()),
            Arc::new(MemoryStore::new()),
        );
        PanelApp::new(controller)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_fills_input() {
        let mut app = test_app();
        for c in "hello".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.input.content(), "hello");
    }

    #[test]
    fn test_enter_with_blank_input_is_ignored() {
        let mut app = test_app();
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());

        assert!(app.controller.conversation().is_empty());
        assert!(!app.controller.is_processing());
        // Whitespace-only input is not cleared by a rejected submit.
        assert_eq!(app.input.content(), " ");
    }

    #[test]
    fn test_enter_submits_trimmed_input() {
        let mut app = test_app();
        for c in " hi ".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }

        let accepted = app.handle_key(key(KeyCode::Enter));
        assert_eq!(accepted.as_deref(), Some("hi"));
        assert!(app.input.is_empty());
        assert!(app.controller.is_processing());
        assert_eq!(app.controller.conversation().len(), 1);
    }

    #[test]
    fn test_input_disabled_while_processing() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.handle_key(key(KeyCode::Enter)).is_some());

        // Edits and further submits are ignored until the turn finishes.
        app.handle_key(key(KeyCode::Char('b')));
        assert!(app.input.is_empty());
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.controller.conversation().len(), 1);
    }

    #[test]
    fn test_ctrl_enter_inserts_newline() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(ctrl(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.input.content(), "a\nb");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let mut app = test_app();
        app.handle_key(ctrl(KeyCode::Char('c')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_scroll_bounds() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.scroll_from_bottom, 0);

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.scroll_from_bottom, 2);

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.scroll_from_bottom, 1);
    }

    #[test]
    fn test_typing_indicator_only_while_processing() {
        let mut app = test_app();
        assert!(app.typing_indicator().is_none());

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));

        let first = app.typing_indicator().expect("indicator while busy");
        assert!(first.starts_with("AI đang trả lời"));

        app.tick();
        let second = app.typing_indicator().expect("indicator while busy");
        assert_ne!(first, second); // dots animate
    }
}

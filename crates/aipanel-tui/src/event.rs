//! Terminal event source for the panel loop.
//!
//! Terminal input and the animation tick are merged into one async
//! stream of [`PanelEvent`]s, so the run loop is a single `await` per
//! iteration with no polling thread behind it.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures_util::StreamExt;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Inputs the panel loop reacts to.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// A key press (repeats and releases are filtered out).
    Key(KeyEvent),
    /// A mouse event, used for transcript scrolling.
    Mouse(MouseEvent),
    /// Animation tick driving the typing indicator.
    Tick,
    /// Terminal was resized; the next draw picks up the new size.
    Resize,
}

/// Merged source of terminal input and animation ticks.
pub struct PanelEvents {
    terminal: EventStream,
    terminal_closed: bool,
    ticker: Interval,
}

impl PanelEvents {
    /// Create an event source ticking at the given rate.
    pub fn new(tick_rate: Duration) -> Self {
        let mut ticker = interval(tick_rate);
        // A stalled draw should not be followed by a burst of ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            terminal: EventStream::new(),
            terminal_closed: false,
            ticker,
        }
    }

    /// Wait for the next event.
    ///
    /// Ticks keep arriving while the terminal is quiet, so the caller
    /// always gets a chance to redraw.
    pub async fn next(&mut self) -> PanelEvent {
        loop {
            if self.terminal_closed {
                self.ticker.tick().await;
                return PanelEvent::Tick;
            }
            tokio::select! {
                _ = self.ticker.tick() => return PanelEvent::Tick,
                input = self.terminal.next() => match input {
                    Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        return PanelEvent::Key(key);
                    }
                    Some(Ok(TermEvent::Mouse(mouse))) => return PanelEvent::Mouse(mouse),
                    Some(Ok(TermEvent::Resize(_, _))) => return PanelEvent::Resize,
                    // Key releases, focus changes, read errors: nothing
                    // to surface, keep waiting.
                    Some(Ok(_) | Err(_)) => {}
                    // The stream must not be polled again after it ends.
                    None => self.terminal_closed = true,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_arrive_without_terminal_input() {
        let mut events = PanelEvents::new(Duration::from_millis(1));
        // No terminal attached in tests; the ticker alone must keep
        // the loop alive.
        for _ in 0..3 {
            assert!(matches!(events.next().await, PanelEvent::Tick));
        }
    }
}

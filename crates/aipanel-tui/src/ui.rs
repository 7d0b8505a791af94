//! Rendering for the panel: header, transcript, typing indicator, input.

use aipanel_engine::Sender;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::PanelApp;

/// Welcome text shown while the conversation is empty.
const WELCOME_LINES: [&str; 2] = [
    "Chào mừng đến với AIPanel!",
    "Hãy bắt đầu trò chuyện với AI.",
];

/// Placeholder for the empty input box.
const INPUT_PLACEHOLDER: &str = "Nhập tin nhắn...";

/// Input-box label while a turn is in flight.
const SENDING_LABEL: &str = "Đang gửi...";

/// Visible input rows before the box stops growing and scrolls.
const MAX_INPUT_ROWS: u16 = 5;

/// Render the whole panel.
pub fn render(app: &PanelApp, frame: &mut Frame<'_>) {
    let [header, transcript, indicator, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(input_rows(app) + 2),
    ])
    .areas(frame.area());

    render_header(header, frame);
    render_transcript(app, transcript, frame);
    render_indicator(app, indicator, frame);
    render_input(app, input, frame);
}

fn render_header(area: Rect, frame: &mut Frame<'_>) {
    let title = Line::from(vec![
        Span::styled("AIPanel", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "  Enter: gửi | Ctrl+Enter: xuống dòng | Esc: thoát",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_transcript(app: &PanelApp, area: Rect, frame: &mut Frame<'_>) {
    let block = Block::bordered();
    let inner = block.inner(area);

    let lines = transcript_lines(app, usize::from(inner.width.max(1)));

    // Pin the view to the bottom, then apply the manual scroll offset.
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let bottom_scroll = total.saturating_sub(inner.height);
    let scroll = bottom_scroll.saturating_sub(app.scroll_from_bottom.min(bottom_scroll));

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Build the transcript as styled lines: user messages right-aligned,
/// AI messages left-aligned, one blank line between messages.
fn transcript_lines(app: &PanelApp, width: usize) -> Vec<Line<'static>> {
    let conversation = app.controller.conversation();

    if conversation.is_empty() {
        return WELCOME_LINES
            .iter()
            .map(|text| {
                Line::from(Span::styled(
                    (*text).to_string(),
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center)
            })
            .collect();
    }

    let wrap_width = width.saturating_sub(2).max(10);
    let mut lines = Vec::new();

    for message in conversation.messages() {
        let (style, alignment) = match message.sender {
            Sender::User => (Style::default().fg(Color::Cyan), Alignment::Right),
            Sender::Ai => (Style::default(), Alignment::Left),
        };

        for wrapped in textwrap::wrap(&message.text, wrap_width) {
            lines.push(
                Line::from(Span::styled(wrapped.into_owned(), style)).alignment(alignment),
            );
        }
        lines.push(Line::default());
    }

    lines
}

fn render_indicator(app: &PanelApp, area: Rect, frame: &mut Frame<'_>) {
    if let Some(text) = app.typing_indicator() {
        let line = Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Rows the input box needs for its content, bounded by
/// [`MAX_INPUT_ROWS`].
fn input_rows(app: &PanelApp) -> u16 {
    if app.controller.is_processing() {
        return 1;
    }
    let lines = app.input.content().split('\n').count();
    u16::try_from(lines)
        .unwrap_or(MAX_INPUT_ROWS)
        .clamp(1, MAX_INPUT_ROWS)
}

fn render_input(app: &PanelApp, area: Rect, frame: &mut Frame<'_>) {
    let block = Block::bordered();

    if app.controller.is_processing() {
        let label = Line::from(Span::styled(
            SENDING_LABEL,
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(label).block(block), area);
        return;
    }

    // Once the content outgrows the box, scroll so the cursor row
    // stays visible.
    let visible = area.height.saturating_sub(2).max(1);
    let cursor_row = app.input.content()[..app.input.cursor()].matches('\n').count();
    let cursor_row = u16::try_from(cursor_row).unwrap_or(u16::MAX);
    let scroll = cursor_row.saturating_sub(visible - 1);

    let paragraph = Paragraph::new(input_lines(app)).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Input box contents with a cursor marker, prompt on the first line.
fn input_lines(app: &PanelApp) -> Vec<Line<'static>> {
    let prompt = "> ";
    let content = app.input.content();
    let cursor = app.input.cursor();

    if content.is_empty() {
        return vec![Line::from(vec![
            Span::styled(prompt, Style::default().fg(Color::Cyan)),
            Span::raw("_"),
            Span::styled(
                INPUT_PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ),
        ])];
    }

    // Insert the cursor marker, then split into display lines.
    let mut display = String::with_capacity(content.len() + 1);
    display.push_str(&content[..cursor]);
    display.push('_');
    display.push_str(&content[cursor..]);

    display
        .split('\n')
        .enumerate()
        .map(|(i, part)| {
            let prefix = if i == 0 { prompt } else { "  " };
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::Cyan)),
                Span::raw(part.to_string()),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aipanel_engine::{ExchangeController, MemoryStore, SimulatedResponder};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn test_app() -> PanelApp {
        let controller = ExchangeController::new(
            Arc::new(SimulatedResponder::new()),
            Arc::new(MemoryStore::new()),
        );
        PanelApp::new(controller)
    }

    fn render_to_text(app: &PanelApp) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(app, frame)).expect("draw");

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_empty_panel_shows_welcome() {
        let app = test_app();
        let text = render_to_text(&app);

        assert!(text.contains("AIPanel"));
        assert!(text.contains("Chào mừng đến với AIPanel!"));
        assert!(text.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn test_submitted_message_appears_in_transcript() {
        let mut app = test_app();
        for c in "hello".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let text = render_to_text(&app);
        assert!(text.contains("hello"));
        // Welcome text is gone once the conversation has messages.
        assert!(!text.contains("Chào mừng"));
        // Turn in flight: typing indicator and sending label visible.
        assert!(text.contains("AI đang trả lời"));
        assert!(text.contains(SENDING_LABEL));
    }

    #[test]
    fn test_input_contents_rendered_with_cursor() {
        let mut app = test_app();
        for c in "hi".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }

        let text = render_to_text(&app);
        assert!(text.contains("> hi_"));
    }

    #[test]
    fn test_input_grows_with_newlines() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE));

        let text = render_to_text(&app);
        // Both lines of a multi-line draft are visible while editing.
        assert!(text.contains("> a"));
        assert!(text.contains("  b_"));
    }

    #[test]
    fn test_tall_input_scrolls_to_cursor() {
        let mut app = test_app();
        for i in 1..=8 {
            if i > 1 {
                app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL));
            }
            for c in format!("l{i}").chars() {
                app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
            }
        }

        let text = render_to_text(&app);
        // The box is capped; the cursor line stays visible and the
        // earliest lines scroll out.
        assert!(text.contains("l8_"));
        assert!(!text.contains("> l1"));
    }

    #[test]
    fn test_long_messages_wrap() {
        let app = test_app();
        let lines = transcript_lines(&app, 80);
        assert_eq!(lines.len(), WELCOME_LINES.len());

        let mut app = test_app();
        app.controller.begin_turn(&"word ".repeat(30));
        let lines = transcript_lines(&app, 20);
        assert!(lines.len() > 2);
    }
}

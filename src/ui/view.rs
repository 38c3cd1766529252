//! Transcript display: welcome screen, message list with role styling and
//! word wrap, and a typing cursor on the in-progress answer.

use crate::transcript::{Message, Role, Transcript};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Bottom-anchored view over the transcript.
pub struct TranscriptView<'a> {
    transcript: &'a Transcript,
    pending: bool,
}

impl<'a> TranscriptView<'a> {
    pub fn new(transcript: &'a Transcript, pending: bool) -> Self {
        Self { transcript, pending }
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Conversation");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.transcript.is_empty() {
            let welcome = [
                Span::styled("Welcome to AI Chat", Style::default().fg(Color::Green)),
                Span::raw(""),
                Span::styled(
                    "Ask me anything and I'll do my best to answer.",
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(""),
                Span::styled(
                    "Press Enter to send, Esc to quit.",
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            for (i, span) in welcome.into_iter().enumerate() {
                if i < inner.height as usize {
                    buf.set_line(inner.x, inner.y + i as u16, &Line::from(span), inner.width);
                }
            }
            return;
        }

        let messages = self.transcript.messages();
        let mut all_lines: Vec<Line> = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            let is_active = self.pending && i == messages.len() - 1;
            all_lines.extend(render_message(message, inner.width, is_active));
            all_lines.push(Line::from(Span::raw("")));
        }

        // Show the most recent lines that fit.
        let height = inner.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

fn render_message(message: &Message, width: u16, is_active: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let label = match message.role {
        Role::User => "You",
        Role::Assistant => "AI",
    };
    let timestamp = message.timestamp.format("%H:%M:%S").to_string();
    let header = format!("{} {} {}", label, timestamp, "─".repeat(20));
    lines.push(Line::from(Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )));

    let style = match message.role {
        Role::User => Style::default().fg(Color::Blue),
        Role::Assistant => Style::default().fg(Color::Green),
    };
    let content_lines = wrap_text(&message.text(), width.saturating_sub(2) as usize);
    let last = content_lines.len().saturating_sub(1);
    for (i, content_line) in content_lines.into_iter().enumerate() {
        let cursor = if is_active && i == last { "▋" } else { "" };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, style),
            Span::styled(cursor, Style::default().fg(Color::Yellow)),
        ]));
    }

    lines
}

/// Greedy word wrap to the given width.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

//! Single-line input composer at the bottom of the chat view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result of feeding a key event to the composer.
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// The user pressed Enter; the composer keeps its text until the caller
    /// accepts the submission and clears it.
    Submitted(String),
    None,
}

/// Line editor state: content plus a cursor measured in characters.
#[derive(Debug, Default)]
pub struct Composer {
    content: String,
    cursor: usize,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        match key.code {
            KeyCode::Enter => return ComposerResult::Submitted(self.content.clone()),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let idx = self.byte_index();
                self.content.insert(idx, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let idx = self.byte_index();
                    self.content.remove(idx);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.char_count() {
                    let idx = self.byte_index();
                    self.content.remove(idx);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.char_count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.char_count(),
            _ => {}
        }
        ComposerResult::None
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Byte offset of the cursor within `content`.
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.content.len())
    }

    /// Widget rendering the input box. While a request is pending the
    /// placeholder switches to a thinking hint.
    pub fn view(&self, pending: bool) -> ComposerView<'_> {
        ComposerView { composer: self, pending }
    }
}

pub struct ComposerView<'a> {
    composer: &'a Composer,
    pending: bool,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Ask");
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let composer = self.composer;
        let line = if composer.content.is_empty() {
            let placeholder = if self.pending {
                "AI is thinking..."
            } else {
                "Send a message..."
            };
            Line::from(Span::styled(
                placeholder,
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let idx = composer.byte_index();
            let (before, rest) = composer.content.split_at(idx);
            let mut chars = rest.chars();
            let at_cursor = chars.next();
            let after: String = chars.collect();

            let cursor_span = match at_cursor {
                Some(c) => Span::styled(
                    c.to_string(),
                    Style::default().add_modifier(Modifier::REVERSED),
                ),
                None => Span::styled("▏", Style::default().fg(Color::Yellow)),
            };
            Line::from(vec![
                Span::raw(before.to_string()),
                cursor_span,
                Span::raw(after),
            ])
        };

        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(composer: &mut Composer, code: KeyCode) -> ComposerResult {
        composer.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            press(composer, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_builds_content() {
        let mut composer = Composer::new();
        type_str(&mut composer, "hello");
        assert_eq!(composer.content(), "hello");
    }

    #[test]
    fn enter_submits_without_clearing() {
        let mut composer = Composer::new();
        type_str(&mut composer, "hi");
        assert_eq!(
            press(&mut composer, KeyCode::Enter),
            ComposerResult::Submitted("hi".into())
        );
        assert_eq!(composer.content(), "hi");
        composer.clear();
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut composer = Composer::new();
        type_str(&mut composer, "abc");
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.content(), "ab");
    }

    #[test]
    fn insert_at_cursor_after_moving_left() {
        let mut composer = Composer::new();
        type_str(&mut composer, "ac");
        press(&mut composer, KeyCode::Left);
        press(&mut composer, KeyCode::Char('b'));
        assert_eq!(composer.content(), "abc");
    }

    #[test]
    fn multibyte_editing_stays_on_char_boundaries() {
        let mut composer = Composer::new();
        type_str(&mut composer, "héllo");
        press(&mut composer, KeyCode::Home);
        press(&mut composer, KeyCode::Right);
        press(&mut composer, KeyCode::Right);
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.content(), "hllo");
        press(&mut composer, KeyCode::End);
        press(&mut composer, KeyCode::Char('!'));
        assert_eq!(composer.content(), "hllo!");
    }

    #[test]
    fn delete_removes_at_cursor() {
        let mut composer = Composer::new();
        type_str(&mut composer, "abc");
        press(&mut composer, KeyCode::Home);
        press(&mut composer, KeyCode::Delete);
        assert_eq!(composer.content(), "bc");
    }
}

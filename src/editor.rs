//! Text editor bound to one host entry.
//!
//! The adapter is keyed by the entry id: the app builds a new one whenever the
//! selection changes instead of swapping content into an existing buffer. The
//! only way to change the text of a mounted editor from outside is
//! [`EditorAdapter::replace_document`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

use crate::models::HostEntry;

#[derive(Debug, Clone)]
pub struct EditorAdapter {
    key: u64,
    readonly: bool,
    lines: Vec<String>,
    row: usize,
    /// Cursor column in characters.
    col: usize,
    scroll: usize,
}

impl EditorAdapter {
    pub fn mount(entry: &HostEntry) -> Self {
        tracing::debug!("Mounting editor for host {}", entry.id);
        Self {
            key: entry.id,
            readonly: entry.is_system(),
            lines: split_lines(&entry.content),
            row: 0,
            col: 0,
            scroll: 0,
        }
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// `(row, column)` with the column counted in characters.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Terminal columns taken by the text left of the cursor.
    pub fn cursor_width(&self) -> usize {
        let line = &self.lines[self.row];
        line[..byte_index(line, self.col)].width()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Overwrite the whole document. Nothing is reported upward.
    pub fn replace_document(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.row = self.row.min(self.lines.len() - 1);
        self.col = self.col.min(self.line_len(self.row));
        self.scroll = self.scroll.min(self.row);
    }

    /// Keep the cursor row inside a viewport of `height` rows.
    pub fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            self.scroll = self.scroll.min(self.row);
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
    }

    /// Apply a key press. Returns the full document when the text changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        if self.move_cursor(key.code) {
            return None;
        }
        if self.readonly {
            return None;
        }

        let changed = match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(c);
                true
            }
            KeyCode::Tab => {
                self.insert_char('\t');
                true
            }
            KeyCode::Enter => {
                self.split_line();
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            _ => false,
        };

        changed.then(|| self.text())
    }

    fn move_cursor(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.line_len(self.row);
                }
            }
            KeyCode::Right => {
                if self.col < self.line_len(self.row) {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up => self.move_rows(-1),
            KeyCode::Down => self.move_rows(1),
            KeyCode::PageUp => self.move_rows(-10),
            KeyCode::PageDown => self.move_rows(10),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(self.row),
            _ => return false,
        }
        true
    }

    fn move_rows(&mut self, delta: isize) {
        let last = self.lines.len() - 1;
        self.row = self.row.saturating_add_signed(delta).min(last);
        self.col = self.col.min(self.line_len(self.row));
    }

    fn insert_char(&mut self, c: char) {
        let at = byte_index(&self.lines[self.row], self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    fn split_line(&mut self) {
        let at = byte_index(&self.lines[self.row], self.col);
        let tail = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, tail);
        self.row += 1;
        self.col = 0;
    }

    fn backspace(&mut self) -> bool {
        if self.col > 0 {
            let at = byte_index(&self.lines[self.row], self.col - 1);
            self.lines[self.row].remove(at);
            self.col -= 1;
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }

    fn delete(&mut self) -> bool {
        if self.col < self.line_len(self.row) {
            let at = byte_index(&self.lines[self.row], self.col);
            self.lines[self.row].remove(at);
            true
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
            true
        } else {
            false
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }
}

/// Always at least one (possibly empty) line.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut EditorAdapter, text: &str) -> Option<String> {
        let mut last = None;
        for c in text.chars() {
            last = editor.handle_key(key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn mount_follows_the_entry() {
        let editor = EditorAdapter::mount(&HostEntry::new(7, "dev", "a\nb"));
        assert_eq!(editor.key(), 7);
        assert!(!editor.is_readonly());
        assert_eq!(editor.lines(), ["a", "b"]);

        let system = EditorAdapter::mount(&HostEntry::system());
        assert!(system.is_readonly());
        assert_eq!(system.lines(), [""]);
    }

    #[test]
    fn every_edit_reports_the_full_document() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", "h 1.2.3.4"));
        editor.handle_key(key(KeyCode::End));
        assert_eq!(type_text(&mut editor, "5"), Some("h 1.2.3.45".to_string()));
        assert_eq!(
            editor.handle_key(key(KeyCode::Enter)),
            Some("h 1.2.3.45\n".to_string())
        );
        assert_eq!(type_text(&mut editor, "# x"), Some("h 1.2.3.45\n# x".to_string()));
        assert_eq!(editor.cursor(), (1, 3));
    }

    #[test]
    fn cursor_moves_report_nothing() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", "ab\ncd"));
        assert_eq!(editor.handle_key(key(KeyCode::Down)), None);
        assert_eq!(editor.handle_key(key(KeyCode::End)), None);
        assert_eq!(editor.cursor(), (1, 2));
        assert_eq!(editor.handle_key(key(KeyCode::Right)), None);
        assert_eq!(editor.cursor(), (1, 2));
    }

    #[test]
    fn readonly_editor_ignores_edits() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(0, "sys", "127.0.0.1 localhost"));
        assert_eq!(type_text(&mut editor, "x"), None);
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), None);
        assert_eq!(editor.text(), "127.0.0.1 localhost");
        editor.handle_key(key(KeyCode::End));
        assert_eq!(editor.cursor(), (0, 19));
    }

    #[test]
    fn backspace_and_delete_join_lines() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", "ab\ncd"));
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), Some("abcd".to_string()));
        assert_eq!(editor.cursor(), (0, 2));
        assert_eq!(editor.handle_key(key(KeyCode::Delete)), Some("abd".to_string()));
        editor.handle_key(key(KeyCode::Home));
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), None);
    }

    #[test]
    fn multibyte_characters_are_edited_whole() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", "系统"));
        editor.handle_key(key(KeyCode::End));
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), Some("系".to_string()));
        assert_eq!(type_text(&mut editor, "é"), Some("系é".to_string()));
    }

    #[test]
    fn control_chords_are_not_inserted() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", ""));
        let chord = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(chord), None);
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn replace_document_clamps_the_cursor() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(0, "sys", "one\ntwo\nthree"));
        editor.handle_key(key(KeyCode::PageDown));
        editor.handle_key(key(KeyCode::End));
        assert_eq!(editor.cursor(), (2, 5));

        editor.replace_document("x");
        assert_eq!(editor.text(), "x");
        assert_eq!(editor.cursor(), (0, 1));
        assert_eq!(editor.key(), 0);
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", &text));
        editor.handle_key(key(KeyCode::PageDown));
        editor.handle_key(key(KeyCode::PageDown));
        editor.scroll_into_view(5);
        assert_eq!(editor.scroll(), 16);
        editor.handle_key(key(KeyCode::PageUp));
        editor.scroll_into_view(5);
        assert_eq!(editor.scroll(), 10);
    }

    #[test]
    fn empty_viewport_never_scrolls_past_the_cursor() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", &text));
        editor.handle_key(key(KeyCode::PageDown));
        editor.handle_key(key(KeyCode::PageDown));
        editor.scroll_into_view(5);
        editor.handle_key(key(KeyCode::PageUp));
        editor.handle_key(key(KeyCode::PageUp));
        editor.scroll_into_view(0);
        assert_eq!(editor.cursor().0, 0);
        assert_eq!(editor.scroll(), 0);
    }

    #[test]
    fn cursor_width_counts_terminal_columns() {
        let mut editor = EditorAdapter::mount(&HostEntry::new(1, "a", "系统 a"));
        editor.handle_key(key(KeyCode::End));
        assert_eq!(editor.cursor(), (0, 4));
        assert_eq!(editor.cursor_width(), 6);
        editor.handle_key(key(KeyCode::Home));
        assert_eq!(editor.cursor_width(), 0);
    }
}

//! Syntax classification for hosts-file text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    let octet = "(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
    Regex::new(&format!(r"^{octet}\.{octet}\.{octet}\.{octet}")).expect("valid IPv4 pattern")
});

static HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-._]+").expect("valid hostname pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    Ip,
    Host,
    /// A single character with no meaning for highlighting.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range within the line.
    pub range: Range<usize>,
}

/// Lazy scanner over one line. A clone resumes from the same position;
/// [`tokenize_line`] starts over.
#[derive(Debug, Clone)]
pub struct LineTokens<'a> {
    line: &'a str,
    pos: usize,
}

pub fn tokenize_line(line: &str) -> LineTokens<'_> {
    LineTokens { line, pos: 0 }
}

impl<'a> Iterator for LineTokens<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let rest = &self.line[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            self.pos = self.line.len();
            return None;
        }

        let start = self.pos;
        let (kind, len) = if trimmed.starts_with('#') {
            (TokenKind::Comment, trimmed.len())
        } else if let Some(m) = IPV4.find(trimmed) {
            (TokenKind::Ip, m.end())
        } else if let Some(m) = HOSTNAME.find(trimmed) {
            (TokenKind::Host, m.end())
        } else {
            let width = trimmed.chars().next().map_or(1, char::len_utf8);
            (TokenKind::Plain, width)
        };

        self.pos += len;
        Some(Token {
            kind,
            range: start..self.pos,
        })
    }
}

/// Per-document scan state. Blank lines put the scanner back at line start.
/// Tokenizing does not read it; every line is classified on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    pub start_of_line: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self { start_of_line: true }
    }
}

#[derive(Debug, Default)]
pub struct Highlighter {
    state: ScanState,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Classify one line, updating the scan state.
    pub fn line<'a>(&mut self, line: &'a str) -> LineTokens<'a> {
        if line.trim().is_empty() {
            self.state = ScanState::default();
        } else {
            self.state.start_of_line = false;
        }
        tokenize_line(line)
    }

    /// Tokens for every line of `text`, in line order.
    pub fn document(&mut self, text: &str) -> Vec<Vec<Token>> {
        text.split('\n')
            .map(|line| self.line(line.trim_end_matches('\r')).collect::<Vec<_>>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<(TokenKind, &str)> {
        tokenize_line(line)
            .map(|t| (t.kind, &line[t.range]))
            .collect()
    }

    #[test]
    fn comment_spans_the_whole_line() {
        assert_eq!(kinds("# comment"), vec![(TokenKind::Comment, "# comment")]);
    }

    #[test]
    fn comment_after_indent() {
        let tokens: Vec<Token> = tokenize_line("   # indented").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].range, 3..13);
    }

    #[test]
    fn ip_then_host() {
        assert_eq!(
            kinds("192.168.1.1 router"),
            vec![(TokenKind::Ip, "192.168.1.1"), (TokenKind::Host, "router")]
        );
    }

    #[test]
    fn out_of_range_octets_are_not_an_ip() {
        let tokens = kinds("999.999.999.999 bad");
        assert_ne!(tokens[0].0, TokenKind::Ip);
        assert_eq!(tokens[0], (TokenKind::Host, "999.999.999.999"));
        assert_eq!(tokens[1], (TokenKind::Host, "bad"));
    }

    #[test]
    fn host_before_ip_and_trailing_comment() {
        assert_eq!(
            kinds("www.demo.com 127.0.0.1 # local"),
            vec![
                (TokenKind::Host, "www.demo.com"),
                (TokenKind::Ip, "127.0.0.1"),
                (TokenKind::Comment, "# local"),
            ]
        );
    }

    #[test]
    fn unknown_characters_are_plain() {
        assert_eq!(
            kinds("::1 é"),
            vec![
                (TokenKind::Plain, ":"),
                (TokenKind::Plain, ":"),
                (TokenKind::Host, "1"),
                (TokenKind::Plain, "é"),
            ]
        );
    }

    #[test]
    fn scan_is_finite_and_restartable() {
        let line = "10.0.0.1 db";
        let mut first = tokenize_line(line);
        assert!(first.next().is_some());
        assert!(first.next().is_some());
        assert!(first.next().is_none());
        assert!(first.next().is_none());
        assert_eq!(tokenize_line(line).count(), 2);
        assert_eq!(tokenize_line("").count(), 0);
        assert_eq!(tokenize_line("   \t").count(), 0);
    }

    #[test]
    fn blank_lines_reset_state() {
        let mut highlighter = Highlighter::new();
        let _ = highlighter.line("127.0.0.1 localhost");
        assert!(!highlighter.state().start_of_line);
        let _ = highlighter.line("");
        assert!(highlighter.state().start_of_line);
    }

    #[test]
    fn document_keeps_line_structure() {
        let lines = Highlighter::new().document("# a\r\n\n1.1.1.1 one");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][0].kind, TokenKind::Comment);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2][0].kind, TokenKind::Ip);
    }
}

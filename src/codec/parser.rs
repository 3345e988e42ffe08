use serde_json::{Map, Number, Value};

use super::escape::decode_zon_string;
use super::CodecError;

/// Parse a complete ZON document into a JSON value tree.
pub fn parse(text: &str) -> Result<Value, CodecError> {
    let mut parser = Parser::new(text);
    parser.skip_trivia();
    if parser.at_end() {
        return Err(CodecError::Empty);
    }
    let value = parser.value()?;
    parser.skip_trivia();
    if !parser.at_end() {
        return Err(CodecError::TrailingInput { offset: parser.pos });
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), CodecError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    /// Skips whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn value(&mut self) -> Result<Value, CodecError> {
        match self.peek() {
            Some(b'.') if self.peek_at(1) == Some(b'{') => self.container(),
            Some(b'.') => {
                self.pos += 1;
                Ok(Value::String(self.identifier()?))
            }
            Some(b'"') => Ok(Value::String(self.string()?)),
            Some(b'\\') if self.peek_at(1) == Some(b'\\') => {
                Ok(Value::String(self.multiline_string()))
            }
            Some(b'\'') => self.char_literal(),
            Some(b'-' | b'+' | b'0'..=b'9') => self.number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// `.{ ... }`: struct when the first item is `.name =`, tuple otherwise.
    fn container(&mut self) -> Result<Value, CodecError> {
        self.pos += 2;
        self.skip_trivia();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }

        if self.starts_field() {
            self.struct_body()
        } else {
            self.tuple_body()
        }
    }

    fn starts_field(&mut self) -> bool {
        if self.peek() != Some(b'.') || self.peek_at(1) == Some(b'{') {
            return false;
        }
        let start = self.pos;
        self.pos += 1;
        let is_field = self.identifier().is_ok() && {
            self.skip_trivia();
            self.peek() == Some(b'=')
        };
        self.pos = start;
        is_field
    }

    fn struct_body(&mut self) -> Result<Value, CodecError> {
        let mut fields = Map::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Object(fields));
            }
            self.expect(b'.')?;
            let name = self.identifier()?;
            self.skip_trivia();
            self.expect(b'=')?;
            self.skip_trivia();
            let value = self.value()?;
            fields.insert(name, value);
            if !self.separator()? {
                return Ok(Value::Object(fields));
            }
        }
    }

    fn tuple_body(&mut self) -> Result<Value, CodecError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            if !self.separator()? {
                return Ok(Value::Array(items));
            }
        }
    }

    /// After an item: `true` if more may follow, `false` once `}` is consumed.
    fn separator(&mut self) -> Result<bool, CodecError> {
        self.skip_trivia();
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(true)
            }
            Some(b'}') => {
                self.pos += 1;
                Ok(false)
            }
            _ => Err(self.error("expected ',' or '}'")),
        }
    }

    /// A bare identifier or `@"quoted"` identifier.
    fn identifier(&mut self) -> Result<String, CodecError> {
        if self.peek() == Some(b'@') && self.peek_at(1) == Some(b'"') {
            self.pos += 1;
            return self.string();
        }
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(self.error("expected identifier")),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn string(&mut self) -> Result<String, CodecError> {
        self.expect(b'"')?;
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => break,
                Some(b'\\') => self.pos += 2,
                Some(b'\n') | None => return Err(self.error("unterminated string")),
                Some(_) => self.pos += 1,
            }
        }
        let raw = &self.src[start..self.pos];
        self.pos += 1;
        Ok(decode_zon_string(raw))
    }

    /// Consecutive `\\` lines joined with newlines, taken verbatim.
    fn multiline_string(&mut self) -> String {
        let mut lines = Vec::new();
        loop {
            self.pos += 2;
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'\n' {
                    break;
                }
                self.pos += 1;
            }
            lines.push(self.src[start..self.pos].trim_end_matches('\r'));

            let resume = self.pos;
            while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
                self.pos += 1;
            }
            if !(self.peek() == Some(b'\\') && self.peek_at(1) == Some(b'\\')) {
                self.pos = resume;
                break;
            }
        }
        lines.join("\n")
    }

    fn char_literal(&mut self) -> Result<Value, CodecError> {
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'\'') => break,
                Some(b'\\') => self.pos += 2,
                Some(b'\n') | None => return Err(self.error("unterminated character literal")),
                Some(_) => self.pos += 1,
            }
        }
        let decoded = decode_zon_string(&self.src[start..self.pos]);
        self.pos += 1;
        let mut chars = decoded.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Number(Number::from(u32::from(c)))),
            _ => Err(self.error("character literal must hold one character")),
        }
    }

    fn number(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let radix = match (self.peek(), self.peek_at(1)) {
            (Some(b'0'), Some(b'x')) => 16,
            (Some(b'0'), Some(b'o')) => 8,
            (Some(b'0'), Some(b'b')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.pos += 2;
        }

        let digits_start = self.pos;
        let mut is_float = false;
        while let Some(b) = self.peek() {
            let accepted = match b {
                b'_' => true,
                b'.' if radix == 10 && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                    is_float = true;
                    true
                }
                b'e' | b'E' if radix == 10 => {
                    is_float = true;
                    if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                    true
                }
                _ => b.is_ascii_digit() || (radix == 16 && b.is_ascii_hexdigit()),
            };
            if !accepted {
                break;
            }
            self.pos += 1;
        }

        let digits: String = self.src[digits_start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if digits.is_empty() {
            self.pos = start;
            return Err(self.error("expected digits"));
        }

        if is_float {
            let parsed: f64 = digits
                .parse()
                .map_err(|_| self.error(format!("invalid float '{digits}'")))?;
            let parsed = if negative { -parsed } else { parsed };
            return Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| self.error("float is not finite"));
        }

        let magnitude = u64::from_str_radix(&digits, radix)
            .map_err(|_| self.error(format!("invalid integer '{digits}'")))?;
        if !negative {
            return Ok(Value::Number(Number::from(magnitude)));
        }
        let signed = 0i64
            .checked_sub_unsigned(magnitude)
            .ok_or_else(|| self.error("integer out of range"))?;
        Ok(Value::Number(Number::from(signed)))
    }

    fn keyword(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        let word = self.identifier()?;
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => {
                self.pos = start;
                Err(self.error(format!("unknown keyword '{word}'")))
            }
        }
    }
}

//! String escapes used inside ZON string literals.
//!
//! The server writes every non-ASCII byte as `\xHH`, so a single character may
//! arrive as several escapes that only form valid UTF-8 once joined. Decoding
//! therefore collects raw bytes first and converts to text at the end.

/// Decode the body of a ZON string literal (the text between the quotes).
///
/// `\xHH` produces one byte, the usual single-character escapes and `\u{...}`
/// produce their character, anything else is copied through unchanged. A
/// malformed escape is kept literally rather than rejected.
pub fn decode_zon_string(raw: &str) -> String {
    let src = raw.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut i = 0;

    while i < src.len() {
        if src[i] != b'\\' || i + 1 >= src.len() {
            bytes.push(src[i]);
            i += 1;
            continue;
        }

        match src[i + 1] {
            b'x' => match hex_byte(src.get(i + 2..i + 4)) {
                Some(b) => {
                    bytes.push(b);
                    i += 4;
                }
                None => {
                    bytes.push(b'\\');
                    i += 1;
                }
            },
            b'n' => {
                bytes.push(b'\n');
                i += 2;
            }
            b'r' => {
                bytes.push(b'\r');
                i += 2;
            }
            b't' => {
                bytes.push(b'\t');
                i += 2;
            }
            b'\\' | b'"' | b'\'' => {
                bytes.push(src[i + 1]);
                i += 2;
            }
            b'u' => match unicode_escape(&src[i + 2..]) {
                Some((c, used)) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    i += 2 + used;
                }
                None => {
                    bytes.push(b'\\');
                    i += 1;
                }
            },
            _ => {
                bytes.push(b'\\');
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Escape `text` for use between the quotes of a ZON string literal.
pub fn escape_zon_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for &b in text.as_bytes() {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}

fn hex_byte(digits: Option<&[u8]>) -> Option<u8> {
    let digits = digits?;
    let text = std::str::from_utf8(digits).ok()?;
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(text, 16).ok()
}

/// Parses `{HHHH}` after a `\u`, returning the character and bytes consumed.
fn unicode_escape(rest: &[u8]) -> Option<(char, usize)> {
    if rest.first() != Some(&b'{') {
        return None;
    }
    let close = rest.iter().position(|&b| b == b'}')?;
    let digits = std::str::from_utf8(&rest[1..close]).ok()?;
    if digits.is_empty() || digits.len() > 6 {
        return None;
    }
    let code = u32::from_str_radix(digits, 16).ok()?;
    char::from_u32(code).map(|c| (c, close + 1))
}

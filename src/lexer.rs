//! Fragment classifier.
//!
//! The input is cut into fragments at the structural characters `{ } [ ] ,` found
//! outside quoted strings. Each fragment is classified by shape alone:
//!
//! | Fragment | Kind |
//! |----------|------|
//! | `"x": 1`, `"s": null` | [`TokenKind::LeafOrNullAssignment`] |
//! | `"child":` (a `{` or `[` follows) | [`TokenKind::CompositeFieldAnnounce`] |
//! | `{` `}` `[` `]` | open/close kinds |
//! | `,` | [`TokenKind::Separator`] |
//! | anything else, e.g. `null` or `3` inside an array | [`TokenKind::None`] |
//!
//! Colons inside quoted strings never count, so `"url": "http://x"` is a single
//! assignment split after `"url"`.

use crate::node::Node;
use crate::{Error, Result};

/// Classification of a single fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `"name": value`, where the value is a leaf or `null`
    LeafOrNullAssignment,
    /// `"name":` with the value opening in the next fragment
    CompositeFieldAnnounce,
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Separator,
    /// A bare value
    None,
}

/// A classified piece of input with its 1-based position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub col: usize,
}

impl<'a> Fragment<'a> {
    /// Splits an assignment or announcement into its name and value parts.
    ///
    /// Returns `None` for fragments without an unquoted colon. For announcements
    /// the value part is empty.
    #[must_use]
    pub fn split_assignment(&self) -> Option<(&'a str, &'a str)> {
        let at = find_unquoted_colon(self.text)?;
        Some((self.text[..at].trim(), self.text[at + 1..].trim()))
    }
}

/// Byte offset of the first colon outside a quoted string.
fn find_unquoted_colon(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else {
            match ch {
                '"' => in_string = true,
                ':' => return Some(i),
                _ => {}
            }
        }
    }
    None
}

/// Classifies a single trimmed fragment.
///
/// # Examples
///
/// ```rust
/// use cd_json::{classify, TokenKind};
///
/// assert_eq!(classify(r#""x": 1"#), TokenKind::LeafOrNullAssignment);
/// assert_eq!(classify(r#""child":"#), TokenKind::CompositeFieldAnnounce);
/// assert_eq!(classify(r#""a:b""#), TokenKind::None);
/// assert_eq!(classify("{"), TokenKind::ObjectOpen);
/// ```
#[must_use]
pub fn classify(text: &str) -> TokenKind {
    let text = text.trim();
    match text {
        "{" => return TokenKind::ObjectOpen,
        "}" => return TokenKind::ObjectClose,
        "[" => return TokenKind::ArrayOpen,
        "]" => return TokenKind::ArrayClose,
        "," => return TokenKind::Separator,
        _ => {}
    }
    match find_unquoted_colon(text) {
        Some(at) if text[at + 1..].trim().is_empty() => TokenKind::CompositeFieldAnnounce,
        Some(_) => TokenKind::LeafOrNullAssignment,
        None => TokenKind::None,
    }
}

struct Cursor {
    line: usize,
    col: usize,
}

impl Cursor {
    fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }
}

type PieceStart = Option<(usize, usize, usize)>;

fn flush<'a>(text: &'a str, out: &mut Vec<Fragment<'a>>, start: &mut PieceStart, end: usize) {
    if let Some((from, line, col)) = start.take() {
        let piece = text[from..end].trim_end();
        out.push(Fragment {
            kind: classify(piece),
            text: piece,
            line,
            col,
        });
    }
}

/// Cuts `text` into classified fragments.
///
/// Whitespace between fragments is dropped. Fails only on an unterminated string.
///
/// # Examples
///
/// ```rust
/// use cd_json::{fragments, TokenKind};
///
/// let kinds: Vec<_> = fragments(r#"{"a": [1, 2]}"#)
///     .unwrap()
///     .into_iter()
///     .map(|f| f.kind)
///     .collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::ObjectOpen,
///         TokenKind::CompositeFieldAnnounce,
///         TokenKind::ArrayOpen,
///         TokenKind::None,
///         TokenKind::Separator,
///         TokenKind::None,
///         TokenKind::ArrayClose,
///         TokenKind::ObjectClose,
///     ]
/// );
/// ```
pub fn fragments(text: &str) -> Result<Vec<Fragment<'_>>> {
    let mut out = Vec::new();
    let mut cursor = Cursor { line: 1, col: 1 };
    // Byte offset and position of the first non-whitespace char of the pending piece.
    let mut start: PieceStart = None;
    let mut string_start = (0, 0);
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if matches!(ch, '{' | '}' | '[' | ']' | ',') {
            flush(text, &mut out, &mut start, i);
            let piece = &text[i..i + 1];
            out.push(Fragment {
                kind: classify(piece),
                text: piece,
                line: cursor.line,
                col: cursor.col,
            });
        } else if !ch.is_whitespace() {
            if start.is_none() {
                start = Some((i, cursor.line, cursor.col));
            }
            if ch == '"' {
                in_string = true;
                string_start = (cursor.line, cursor.col);
            }
        }
        cursor.advance(ch);
    }

    if in_string {
        return Err(Error::format(string_start.0, string_start.1, "unterminated string"));
    }
    flush(text, &mut out, &mut start, text.len());
    log::trace!("cut input into {} fragments", out.len());
    Ok(out)
}

/// Decodes a quoted string literal.
pub(crate) fn unquote(text: &str, line: usize, col: usize) -> Result<String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| Error::format(line, col, &format!("expected a quoted string, found {text}")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            return Err(Error::format(line, col, "unescaped quote inside a string"));
        }
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let invalid = || Error::format(line, col, "invalid unicode escape");
                let high = hex4(&mut chars).ok_or_else(invalid)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    // A high surrogate must be followed by an escaped low surrogate.
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(invalid());
                    }
                    let low = hex4(&mut chars)
                        .filter(|low| (0xDC00..0xE000).contains(low))
                        .ok_or_else(invalid)?;
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                out.push(char::from_u32(code).ok_or_else(invalid)?);
            }
            _ => return Err(Error::format(line, col, "invalid escape sequence")),
        }
    }
    Ok(out)
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

/// Decodes a leaf or `null` literal.
pub(crate) fn parse_literal(text: &str, line: usize, col: usize) -> Result<Node> {
    match text {
        "null" => return Ok(Node::Null),
        "true" => return Ok(Node::Bool(true)),
        "false" => return Ok(Node::Bool(false)),
        _ => {}
    }
    if text.starts_with('"') {
        return unquote(text, line, col).map(Node::Str);
    }

    let numeric = !text.is_empty()
        && text.starts_with(|c: char| c == '-' || c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if numeric {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Node::Int(i));
        }
        let digits = text.strip_prefix('-').unwrap_or(text);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::format(line, col, &format!("integer {text} out of range")));
        }
        // Non-finite values travel as strings, so an overflowing literal is malformed.
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => return Ok(Node::Float(f)),
            Ok(_) => return Err(Error::format(line, col, &format!("float {text} out of range"))),
            Err(_) => {}
        }
    }
    Err(Error::format(line, col, &format!("invalid literal {text}")))
}

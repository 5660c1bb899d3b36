//! KeyValues parser
//!
//! Parses KeyValues text into a [`KeyValues`] mapping, and answers the
//! framing question "does this buffer hold a whole document yet?".

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{KvRpcError, Result};
use super::{KeyValues, Value};

/// Deepest block nesting accepted by [`parse`]
pub const MAX_DEPTH: usize = 64;

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, PartialEq)]
enum Token {
    Text(String),
    Open,
    Close,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, message: impl AsRef<str>) -> KvRpcError {
        KvRpcError::Decode(format!("line {}: {}", self.line, message.as_ref()))
    }

    /// Next significant token, skipping whitespace, comments and conditions
    fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            let Some(&c) = self.chars.peek() else {
                return Ok(None);
            };

            match c {
                '\n' => {
                    self.line += 1;
                    self.chars.next();
                }
                c if c.is_ascii_whitespace() => {
                    self.chars.next();
                }
                '{' => {
                    self.chars.next();
                    return Ok(Some(Token::Open));
                }
                '}' => {
                    self.chars.next();
                    return Ok(Some(Token::Close));
                }
                '[' => self.skip_condition()?,
                '"' => {
                    self.chars.next();
                    return self.quoted().map(|s| Some(Token::Text(s)));
                }
                '/' => {
                    self.chars.next();
                    if self.chars.peek() == Some(&'/') {
                        self.skip_line();
                    } else {
                        let mut text = String::from('/');
                        text.push_str(&self.unquoted());
                        return Ok(Some(Token::Text(text)));
                    }
                }
                _ => return Ok(Some(Token::Text(self.unquoted()))),
            }
        }
    }

    /// Body of a quoted string; the opening quote is already consumed
    fn quoted(&mut self) -> Result<String> {
        let start_line = self.line;
        let mut out = String::new();

        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Ok(out),
                '\\' => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                '\n' => {
                    self.line += 1;
                    out.push('\n');
                }
                c => out.push(c),
            }
        }

        Err(KvRpcError::Decode(format!(
            "line {}: unterminated string",
            start_line
        )))
    }

    fn unquoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii() && is_delimiter(c as u8) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }

    fn skip_line(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    /// Skip a `[$CONDITION]` tag
    fn skip_condition(&mut self) -> Result<()> {
        for c in self.chars.by_ref() {
            match c {
                ']' => return Ok(()),
                '\n' => self.line += 1,
                _ => {}
            }
        }
        Err(self.error("unterminated condition"))
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Parse KeyValues text into a mapping
///
/// Duplicate keys follow the usual KeyValues convention: two blocks under the
/// same key are merged, otherwise the later value replaces the earlier one.
pub fn parse(text: &str) -> Result<KeyValues> {
    let mut lexer = Lexer::new(text);
    parse_block(&mut lexer, 0)
}

fn parse_block(lexer: &mut Lexer<'_>, depth: usize) -> Result<KeyValues> {
    let mut kv = KeyValues::new();

    loop {
        let key = match lexer.next_token()? {
            Some(Token::Text(key)) => key,
            Some(Token::Close) if depth > 0 => return Ok(kv),
            Some(Token::Close) => return Err(lexer.error("unexpected '}'")),
            Some(Token::Open) => return Err(lexer.error("expected a key, found '{'")),
            None if depth == 0 => return Ok(kv),
            None => return Err(lexer.error("unexpected end of input inside a block")),
        };

        match lexer.next_token()? {
            Some(Token::Text(value)) => kv.merge(key, Value::String(value)),
            Some(Token::Open) => {
                if depth + 1 > MAX_DEPTH {
                    return Err(lexer.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
                }
                let inner = parse_block(lexer, depth + 1)?;
                kv.merge(key, Value::Map(inner));
            }
            Some(Token::Close) | None => {
                return Err(lexer.error(format!("key \"{}\" has no value", key)));
            }
        }
    }
}

// =============================================================================
// Framing
// =============================================================================

/// Length of the first complete document in `bytes`, if there is one yet
///
/// Tracks quotes, escapes, comments and brace depth without allocating. A
/// document ends where a top-level block closes and the top level holds whole
/// key/value pairs. Documents whose last value is a leaf never end here; they
/// run until the stream does. A stray `}` also ends the document so the parser
/// can reject it.
pub fn document_end(bytes: &[u8]) -> Option<usize> {
    let len = bytes.len();
    let mut depth = 0usize;
    let mut top_tokens = 0usize;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'"' => {
                i += 1;
                loop {
                    if i >= len {
                        return None;
                    }
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => break,
                        _ => i += 1,
                    }
                }
                i += 1;
                if depth == 0 {
                    top_tokens += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'[' => {
                while i < len && bytes[i] != b']' {
                    i += 1;
                }
                if i == len {
                    return None;
                }
                i += 1;
            }
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
                if depth == 0 {
                    top_tokens += 1;
                    if top_tokens % 2 == 0 {
                        return Some(i);
                    }
                }
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => {
                while i < len && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                if depth == 0 {
                    top_tokens += 1;
                }
            }
        }
    }

    None
}

/// Whether `bytes` holds a complete document (see [`document_end`])
pub fn document_complete(bytes: &[u8]) -> bool {
    document_end(bytes).is_some()
}

/// Bytes that end an unquoted token, shared by the lexer and the framing scan
///
/// Only ASCII whitespace separates tokens; other Unicode spaces are token text.
fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'"' | b'[')
}

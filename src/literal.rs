//! Literal lowering: Python string and number syntax to JavaScript syntax.

use std::ops::Range;

use crate::validate::{CompilerError, SourceLocation};

// ═══════════════════════════════════════════════════════════════════════════════
// STRINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Flags carried by the letters in front of a string's opening quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringPrefix {
    pub raw: bool,
    pub bytes: bool,
    pub format: bool,
}

impl StringPrefix {
    fn parse(letters: &str) -> Self {
        let mut prefix = StringPrefix::default();
        for c in letters.chars() {
            match c.to_ascii_lowercase() {
                'r' => prefix.raw = true,
                'b' => prefix.bytes = true,
                'f' => prefix.format = true,
                _ => {}
            }
        }
        prefix
    }
}

/// Split a string token into its prefix and the byte range between the quotes.
pub fn split_string_range(text: &str) -> Option<(StringPrefix, Range<usize>)> {
    let quote_at = text.find(['\'', '"'])?;
    let rest = &text[quote_at..];
    let quote_len = if rest.starts_with("'''") || rest.starts_with("\"\"\"") {
        3
    } else {
        1
    };
    let start = quote_at + quote_len;
    let end = text.len().checked_sub(quote_len)?;
    if end < start {
        return None;
    }
    Some((StringPrefix::parse(&text[..quote_at]), start..end))
}

pub fn split_string(text: &str) -> Option<(StringPrefix, &str)> {
    let (prefix, range) = split_string_range(text)?;
    Some((prefix, &text[range]))
}

/// Decode Python escape sequences in the body of a non-raw string.
pub fn decode_escapes(body: &str, location: SourceLocation) -> Result<String, CompilerError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            'x' => out.push(read_hex(&mut chars, 2, location)?),
            'u' => out.push(read_hex(&mut chars, 4, location)?),
            'U' => out.push(read_hex(&mut chars, 8, location)?),
            'N' => return Err(CompilerError::unsupported("named unicode escape (\\N{...})", location)),
            other => {
                // Unknown escapes keep their backslash.
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn read_hex(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    location: SourceLocation,
) -> Result<char, CompilerError> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or_else(|| CompilerError::unsupported("truncated hex escape", location))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| CompilerError::unsupported("invalid code point escape", location))
}

/// Quote a decoded value the way Python's `repr` does: single quotes unless
/// the value holds a single quote and no double quote.
pub fn quote_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Escape decoded text for the static part of a template literal.
pub fn escape_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 && c != '\n' && c != '\t' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Decoded value of one plain (non-format) string token.
pub fn string_value(text: &str, location: SourceLocation) -> Result<String, CompilerError> {
    let (prefix, body) = split_string(text)
        .ok_or_else(|| CompilerError::internal(format!("Malformed string token: {}", text)))?;
    if prefix.bytes {
        return Err(CompilerError::unsupported("bytes literal", location));
    }
    if prefix.raw {
        Ok(body.to_string())
    } else {
        decode_escapes(body, location)
    }
}

/// Lower a plain string token to a JavaScript string literal.
pub fn lower_string(text: &str, location: SourceLocation) -> Result<String, CompilerError> {
    Ok(quote_repr(&string_value(text, location)?))
}

// ═══════════════════════════════════════════════════════════════════════════════
// NUMBERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalize an integer or float token. Digit separators are dropped and
/// Python 2 long suffixes stripped; imaginary literals have no counterpart.
pub fn lower_number(text: &str, location: SourceLocation) -> Result<String, CompilerError> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();

    if digits.ends_with(['j', 'J']) {
        return Err(CompilerError::unsupported("imaginary number literal", location));
    }
    let digits = digits.trim_end_matches(['l', 'L']);

    let lower = digits.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("0b") || lower.starts_with("0o") {
        return Ok(lower);
    }

    // Python 2 octal (`017`) is a syntax error in module code.
    if digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.chars().any(|c| c != '0')
    {
        return Ok(format!("0o{}", digits.trim_start_matches('0')));
    }
    if digits.len() > 1 && digits.chars().all(|c| c == '0') {
        return Ok("0".to_string());
    }

    Ok(digits.to_string())
}

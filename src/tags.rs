//! Struct tag parsing.
//!
//! ```text
//! tag   = { pair " " } [ pair ]
//! pair  = key ":" '"' value '"'
//! key   = 1*( any char except space, control, ':' and '"' )
//! value = { any char except '"' | '\' char }
//! ```

use crate::error::{ExtractError, ExtractResult};
use crate::model::Tags;

/// Parses a raw tag literal into its `key:"value"` pairs.
///
/// `raw` is the literal as written, backquotes or double quotes included; a
/// bare tag body is accepted too. Values are kept verbatim. A repeated key
/// keeps its first position and takes the last value.
pub fn parse_tags(raw: &str) -> ExtractResult<Tags> {
    let body = strip_delimiters(raw).ok_or_else(|| malformed(raw, raw))?;
    let mut tags = Tags::new();
    let mut rest = body.as_str();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        let key_len = rest
            .find(|c: char| c == ' ' || c == ':' || c == '"' || c.is_control())
            .unwrap_or(rest.len());
        if key_len == 0 || !rest[key_len..].starts_with(":\"") {
            return Err(malformed(raw, offending_token(rest)));
        }
        let key = &rest[..key_len];

        let value_start = key_len + 2;
        let Some(value_len) = closing_quote(&rest[value_start..]) else {
            return Err(malformed(raw, rest));
        };
        let value = &rest[value_start..value_start + value_len];
        tags.insert(key.to_owned(), value.to_owned());

        rest = &rest[value_start + value_len + 1..];
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Err(malformed(raw, offending_token(rest)));
        }
    }

    Ok(tags)
}

/// Tag body without its quoting. Interpreted strings are unquoted; raw
/// strings only lose their backquotes. `None` for an unbalanced literal.
fn strip_delimiters(raw: &str) -> Option<String> {
    match raw.as_bytes().first() {
        None => Some(String::new()),
        Some(b'`') => raw
            .strip_prefix('`')
            .and_then(|s| s.strip_suffix('`'))
            .map(str::to_owned),
        Some(b'"') => unquote(raw),
        Some(_) => Some(raw.to_owned()),
    }
}

/// Unquotes a Go interpreted string literal. `\x` and octal escapes are
/// single bytes, so the result is checked as UTF-8 at the end.
fn unquote(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            if c == '"' {
                return None;
            }
            push_char(&mut out, c);
            continue;
        }
        let escaped = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0C',
            'v' => '\x0B',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'x' => {
                out.push(escaped_byte(&mut chars, None, 16, 2)?);
                continue;
            }
            d @ '0'..='7' => {
                out.push(escaped_byte(&mut chars, d.to_digit(8), 8, 3)?);
                continue;
            }
            'u' => code_point(&mut chars, 4)?,
            'U' => code_point(&mut chars, 8)?,
            _ => return None,
        };
        push_char(&mut out, escaped);
    }
    String::from_utf8(out).ok()
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// `digits` digits in `radix`, `first` already consumed. Octal escapes
/// above `\377` are rejected.
fn escaped_byte(
    chars: &mut std::str::Chars<'_>,
    first: Option<u32>,
    radix: u32,
    digits: usize,
) -> Option<u8> {
    let mut code = 0u32;
    let mut remaining = digits;
    if let Some(d) = first {
        code = d;
        remaining -= 1;
    }
    for _ in 0..remaining {
        code = code * radix + chars.next()?.to_digit(radix)?;
    }
    u8::try_from(code).ok()
}

fn code_point(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

/// Byte length up to the closing `"`, skipping backslash escapes.
fn closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn offending_token(rest: &str) -> &str {
    rest.split(' ').next().unwrap_or(rest)
}

fn malformed(tag: &str, offending: &str) -> ExtractError {
    ExtractError::MalformedTag {
        tag: tag.to_owned(),
        offending: offending.to_owned(),
    }
}

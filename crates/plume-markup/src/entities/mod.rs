//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! [`decode_char_ref`] works on whatever input is available right after an
//! `&`. When the reference could still change meaning with more input it
//! answers [`CharRef::Incomplete`] so a streaming caller can wait for the next
//! chunk. Anything that is not a reference is [`CharRef::Literal`]: the `&`
//! stays in the output as-is. Decoding never fails.

mod table;

use memchr::memchr;
use strum_macros::Display;

/// Which entity table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum EntityMode {
    /// HTML named references, including the legacy semicolon-less forms.
    #[default]
    #[strum(serialize = "html")]
    Html,
    /// Only `amp`, `apos`, `gt`, `lt` and `quot`, always with `;`.
    #[strum(serialize = "xml")]
    Xml,
}

/// Outcome of decoding one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharRef {
    /// The reference decoded to `value`, using `consumed` bytes after the `&`.
    Resolved {
        /// Replacement text.
        value: String,
        /// Bytes consumed after the `&`, including any `;`.
        consumed: usize,
    },
    /// Not a reference; keep the `&` as text.
    Literal,
    /// More input could change the answer.
    Incomplete,
}

/// Decode the reference that starts right after an `&`.
///
/// `in_attribute` applies the historical rule that a semicolon-less legacy
/// name followed by `=` or an alphanumeric stays literal. With `at_eof` set
/// the decoder never answers [`CharRef::Incomplete`].
#[must_use]
pub fn decode_char_ref(input: &str, mode: EntityMode, in_attribute: bool, at_eof: bool) -> CharRef {
    let bytes = input.as_bytes();
    match bytes.first() {
        None if at_eof => CharRef::Literal,
        None => CharRef::Incomplete,
        Some(b'#') => decode_numeric(&bytes[1..], mode, at_eof),
        Some(c) if c.is_ascii_alphanumeric() => decode_named(bytes, mode, in_attribute, at_eof),
        Some(_) => CharRef::Literal,
    }
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
///
/// `bytes` starts after the `#`.
fn decode_numeric(bytes: &[u8], mode: EntityMode, at_eof: bool) -> CharRef {
    let (hex, digits_start) = match bytes.first() {
        Some(b'x' | b'X') => (true, 1),
        Some(_) => (false, 0),
        None if at_eof => return CharRef::Literal,
        None => return CharRef::Incomplete,
    };
    let is_digit = |c: u8| {
        if hex {
            c.is_ascii_hexdigit()
        } else {
            c.is_ascii_digit()
        }
    };
    let digits = bytes[digits_start..].iter().take_while(|&&c| is_digit(c)).count();
    let end = digits_start + digits;
    if end == bytes.len() && !at_eof {
        return CharRef::Incomplete;
    }
    if digits == 0 {
        return CharRef::Literal;
    }

    let radix = if hex { 16 } else { 10 };
    let mut code: u32 = 0;
    for &c in &bytes[digits_start..end] {
        let digit = char::from(c).to_digit(radix).unwrap_or_default();
        // Saturate past the Unicode range; the exact value no longer matters.
        code = code.saturating_mul(radix).saturating_add(digit).min(0x11_0000);
    }
    let semicolon = usize::from(bytes.get(end) == Some(&b';'));

    CharRef::Resolved {
        value: numeric_replacement(code, mode).to_string(),
        // 1 for the '#'.
        consumed: 1 + end + semicolon,
    }
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn numeric_replacement(code: u32, mode: EntityMode) -> char {
    if mode == EntityMode::Html && (0x80..=0x9F).contains(&code) {
        let slot = usize::try_from(code - 0x80).unwrap_or_default();
        let mapped = table::WINDOWS_1252[slot];
        if mapped != 0 {
            return char::from_u32(mapped).unwrap_or(char::REPLACEMENT_CHARACTER);
        }
    }
    if code == 0 {
        return char::REPLACEMENT_CHARACTER;
    }
    // Rejects surrogates and anything above U+10FFFF.
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
fn decode_named(bytes: &[u8], mode: EntityMode, in_attribute: bool, at_eof: bool) -> CharRef {
    let run = bytes
        .iter()
        .take(table::MAX_NAME_LEN + 1)
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if run == bytes.len() && run <= table::MAX_NAME_LEN && !at_eof {
        return CharRef::Incomplete;
    }
    let lookup = match mode {
        EntityMode::Html => table::html,
        EntityMode::Xml => table::xml,
    };
    // The run is ASCII, so this cannot fail.
    let Ok(name) = std::str::from_utf8(&bytes[..run]) else {
        return CharRef::Literal;
    };

    if bytes.get(run) == Some(&b';') {
        if let Some(entry) = lookup(name) {
            return CharRef::Resolved {
                value: entry.value.to_string(),
                consumed: run + 1,
            };
        }
    }

    // Longest semicolon-less legacy prefix.
    for len in (1..=run.min(table::MAX_NAME_LEN)).rev() {
        let Some(entry) = lookup(&name[..len]).filter(|e| e.legacy) else {
            continue;
        };
        if in_attribute {
            let next = bytes.get(len).copied();
            if next.is_some_and(|c| c == b'=' || c.is_ascii_alphanumeric()) {
                return CharRef::Literal;
            }
        }
        return CharRef::Resolved {
            value: entry.value.to_string(),
            consumed: len,
        };
    }
    CharRef::Literal
}

/// Decode every reference in `text`, leaving anything unrecognised as it is.
#[must_use]
pub fn decode_entities(text: &str, mode: EntityMode) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        match decode_char_ref(rest, mode, false, true) {
            CharRef::Resolved { value, consumed } => {
                out.push_str(&value);
                rest = &rest[consumed..];
            }
            CharRef::Literal | CharRef::Incomplete => out.push('&'),
        }
    }
    out.push_str(rest);
    out
}

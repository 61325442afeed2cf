//! Element categories shared by the parser and the serializer.
//!
//! All names are lowercase; callers compare with
//! [`str::eq_ignore_ascii_case`] or lowercase first.

/// Elements that never have content or a close tag in HTML.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "command", "embed", "frame", "hr", "image", "img",
    "input", "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Verbatim-body elements whose content is raw text (no entity decoding).
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Verbatim-body elements whose content still decodes character references.
pub const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["title", "textarea"];

/// Whether `name` is an HTML void element (ASCII case-insensitive).
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Whether `name` holds raw text that must not be escaped on output.
#[must_use]
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Whether `name` is any verbatim-body element, raw or escapable.
#[must_use]
pub fn is_verbatim_element(name: &str) -> bool {
    is_raw_text_element(name)
        || ESCAPABLE_RAW_TEXT_ELEMENTS
            .iter()
            .any(|v| v.eq_ignore_ascii_case(name))
}

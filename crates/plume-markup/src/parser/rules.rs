//! Structural tag tables: void elements and implicit-close rules.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use plume_common::tags::VOID_ELEMENTS;

const FORM_TAGS: &[&str] = &[
    "input", "option", "optgroup", "select", "button", "datalist", "textarea",
];
const P_TAG: &[&str] = &["p"];
const TABLE_SECTION_TAGS: &[&str] = &["thead", "tbody"];
const DDT_TAGS: &[&str] = &["dd", "dt"];
const RTP_TAGS: &[&str] = &["rt", "rp"];

/// Opening the key tag closes any of these while they are innermost.
const HTML_IMPLIED_CLOSE: &[(&str, &[&str])] = &[
    ("tr", &["tr", "th", "td"]),
    ("th", &["th"]),
    ("td", &["thead", "th", "td"]),
    ("body", &["head", "link", "script"]),
    ("li", &["li"]),
    ("p", P_TAG),
    ("h1", P_TAG),
    ("h2", P_TAG),
    ("h3", P_TAG),
    ("h4", P_TAG),
    ("h5", P_TAG),
    ("h6", P_TAG),
    ("select", FORM_TAGS),
    ("input", FORM_TAGS),
    ("output", FORM_TAGS),
    ("button", FORM_TAGS),
    ("datalist", FORM_TAGS),
    ("textarea", FORM_TAGS),
    ("option", &["option"]),
    ("optgroup", &["optgroup", "option"]),
    ("dd", DDT_TAGS),
    ("dt", DDT_TAGS),
    ("address", P_TAG),
    ("article", P_TAG),
    ("aside", P_TAG),
    ("blockquote", P_TAG),
    ("details", P_TAG),
    ("div", P_TAG),
    ("dl", P_TAG),
    ("fieldset", P_TAG),
    ("figcaption", P_TAG),
    ("figure", P_TAG),
    ("footer", P_TAG),
    ("form", P_TAG),
    ("header", P_TAG),
    ("hr", P_TAG),
    ("main", P_TAG),
    ("nav", P_TAG),
    ("ol", P_TAG),
    ("pre", P_TAG),
    ("section", P_TAG),
    ("table", P_TAG),
    ("ul", P_TAG),
    ("rt", RTP_TAGS),
    ("rp", RTP_TAGS),
    ("tbody", TABLE_SECTION_TAGS),
    ("tfoot", TABLE_SECTION_TAGS),
];

/// Which tags are void and which openings imply closes.
///
/// HTML rules compare tag names ASCII case-insensitively; XML rules are
/// empty. Custom tables can be assembled with [`MarkupRules::empty`],
/// [`add_void`](Self::add_void) and [`add_implied_close`](Self::add_implied_close).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupRules {
    void_elements: HashSet<String>,
    implied_close: HashMap<String, HashSet<String>>,
    ignore_case: bool,
}

impl MarkupRules {
    /// No void elements and no implicit closes; names compare exactly.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The XML rule set, which is empty.
    #[must_use]
    pub fn xml() -> Self {
        Self::empty()
    }

    /// The HTML void-element and implicit-close tables.
    #[must_use]
    pub fn html() -> Self {
        let mut rules = Self {
            ignore_case: true,
            ..Self::default()
        };
        for void in VOID_ELEMENTS {
            rules.add_void(void);
        }
        for (opening, closes) in HTML_IMPLIED_CLOSE {
            for closed in *closes {
                rules.add_implied_close(opening, closed);
            }
        }
        rules
    }

    /// Whether names are compared ASCII case-insensitively.
    #[must_use]
    pub const fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    /// Mark `name` as a void element.
    pub fn add_void(&mut self, name: &str) {
        let name = self.key(name).into_owned();
        let _ = self.void_elements.insert(name);
    }

    /// Opening `opening` closes an innermost open `closed`.
    pub fn add_implied_close(&mut self, opening: &str, closed: &str) {
        let opening = self.key(opening).into_owned();
        let closed = self.key(closed).into_owned();
        let _ = self.implied_close.entry(opening).or_default().insert(closed);
    }

    /// Whether `name` never has content.
    #[must_use]
    pub fn is_void(&self, name: &str) -> bool {
        self.void_elements.contains(self.key(name).as_ref())
    }

    /// Whether opening `opening` closes an innermost `open` element.
    #[must_use]
    pub fn implies_close(&self, opening: &str, open: &str) -> bool {
        self.implied_close
            .get(self.key(opening).as_ref())
            .is_some_and(|set| set.contains(self.key(open).as_ref()))
    }

    /// Whether a close tag named `close` matches an open element `open`.
    #[must_use]
    pub fn names_match(&self, open: &str, close: &str) -> bool {
        if self.ignore_case {
            open.eq_ignore_ascii_case(close)
        } else {
            open == close
        }
    }

    fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.ignore_case && name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }
}

//! Parser configuration.

use serde::{Deserialize, Serialize};

use crate::parser::MarkupRules;
use crate::tokenizer::TokenizerOptions;

/// Options shared by the parser and tree builder.
///
/// Every field is optional when deserializing, so a JSON file only has to
/// name what it changes:
///
/// ```
/// let options: plume_markup::ParseOptions =
///     serde_json::from_str(r#"{ "treat_as_xml": true }"#).unwrap();
/// assert!(options.effective_cdata_as_text());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Strict XML operation: no implicit closes, no void elements, no
    /// verbatim elements, XML entities only, exact close-tag matching.
    pub treat_as_xml: bool,
    /// Lowercase tag names (and declaration names).
    pub fold_tag_name_case: bool,
    /// Lowercase attribute names.
    pub fold_attribute_name_case: bool,
    /// Keep CDATA sections as CDATA nodes. Otherwise they become comments.
    /// Always on under [`treat_as_xml`](Self::treat_as_xml).
    pub treat_cdata_as_text: bool,
    /// Decode character references in text and attribute values.
    pub decode_entities: bool,
    /// Record each node's start offset.
    pub with_start_indices: bool,
    /// Record each node's end offset.
    pub with_end_indices: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            treat_as_xml: false,
            fold_tag_name_case: false,
            fold_attribute_name_case: false,
            treat_cdata_as_text: false,
            decode_entities: true,
            with_start_indices: false,
            with_end_indices: false,
        }
    }
}

impl ParseOptions {
    /// HTML defaults.
    #[must_use]
    pub fn html() -> Self {
        Self::default()
    }

    /// Strict XML defaults.
    #[must_use]
    pub fn xml() -> Self {
        Self {
            treat_as_xml: true,
            ..Self::default()
        }
    }

    /// Set [`treat_as_xml`](Self::treat_as_xml).
    #[must_use]
    pub const fn with_xml(mut self, on: bool) -> Self {
        self.treat_as_xml = on;
        self
    }

    /// Set both case-folding options.
    #[must_use]
    pub const fn with_case_folding(mut self, tags: bool, attributes: bool) -> Self {
        self.fold_tag_name_case = tags;
        self.fold_attribute_name_case = attributes;
        self
    }

    /// Set [`treat_cdata_as_text`](Self::treat_cdata_as_text).
    #[must_use]
    pub const fn with_cdata_as_text(mut self, on: bool) -> Self {
        self.treat_cdata_as_text = on;
        self
    }

    /// Set [`decode_entities`](Self::decode_entities).
    #[must_use]
    pub const fn with_entity_decoding(mut self, on: bool) -> Self {
        self.decode_entities = on;
        self
    }

    /// Record start and end offsets on every node.
    #[must_use]
    pub const fn with_indices(mut self, start: bool, end: bool) -> Self {
        self.with_start_indices = start;
        self.with_end_indices = end;
        self
    }

    /// Whether CDATA sections stay CDATA once XML mode is accounted for.
    #[must_use]
    pub const fn effective_cdata_as_text(&self) -> bool {
        self.treat_cdata_as_text || self.treat_as_xml
    }

    /// The structural tag tables these options select.
    #[must_use]
    pub fn rules(&self) -> MarkupRules {
        if self.treat_as_xml {
            MarkupRules::xml()
        } else {
            MarkupRules::html()
        }
    }

    /// The tokenizer half of these options.
    #[must_use]
    pub const fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            xml_mode: self.treat_as_xml,
            decode_entities: self.decode_entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: ParseOptions =
            serde_json::from_str(r#"{ "fold_tag_name_case": true }"#).unwrap();
        assert!(options.fold_tag_name_case);
        assert!(options.decode_entities);
        assert!(!options.treat_as_xml);
    }

    #[test]
    fn xml_forces_cdata() {
        assert!(!ParseOptions::html().effective_cdata_as_text());
        assert!(ParseOptions::xml().effective_cdata_as_text());
        assert!(ParseOptions::html().with_cdata_as_text(true).effective_cdata_as_text());
    }
}

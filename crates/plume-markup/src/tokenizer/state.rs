use strum_macros::Display;

/// The tokenizer state machine. Most states fast-forward to the next
/// delimiter they care about instead of stepping one byte at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    /// Character data between tags.
    Text,
    /// Just consumed `<`.
    BeforeTagName,
    /// Inside an opening tag name.
    InTagName,
    /// Consumed `/` inside an opening tag.
    InSelfClosingTag,
    /// Just consumed `</`.
    BeforeClosingTagName,
    /// Inside a closing tag name.
    InClosingTagName,
    /// After a closing tag name, waiting for `>`.
    AfterClosingTagName,
    /// Between attributes.
    BeforeAttributeName,
    /// Inside an attribute name.
    InAttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// After `=`, before the value.
    BeforeAttributeValue,
    /// Inside a `"`-quoted value.
    InAttributeValueDq,
    /// Inside a `'`-quoted value.
    InAttributeValueSq,
    /// Inside an unquoted value.
    InAttributeValueNq,
    /// Just consumed `<!`.
    BeforeDeclaration,
    /// Inside `<!...>` that is neither a comment nor CDATA.
    InDeclaration,
    /// Inside `<?...>`.
    InProcessingInstruction,
    /// Consumed `<!-`, expecting the second `-`.
    BeforeComment,
    /// Matching the rest of `<![CDATA[`.
    CDataSequence,
    /// A bogus `</...>` comment, terminated by the next `>`.
    InSpecialComment,
    /// A comment or CDATA body, terminated by `-->` or `]]>`.
    InCommentLike,
    /// Body of a verbatim element such as `script`.
    InSpecialTag,
    /// Matching `</name` inside a verbatim element body.
    SpecialEndSequence,
    /// Resolving a character reference.
    InEntity,
}

impl State {
    /// States whose unconsumed input must survive a chunk boundary.
    pub(super) const fn retains_section(self) -> bool {
        !matches!(
            self,
            Self::InSelfClosingTag
                | Self::BeforeClosingTagName
                | Self::AfterClosingTagName
                | Self::BeforeAttributeName
                | Self::AfterAttributeName
                | Self::BeforeAttributeValue
        )
    }

    /// States where trailing input at end-of-stream is part of a tag and
    /// gets dropped.
    pub(super) const fn is_inside_tag(self) -> bool {
        matches!(
            self,
            Self::InTagName
                | Self::InSelfClosingTag
                | Self::BeforeClosingTagName
                | Self::InClosingTagName
                | Self::AfterClosingTagName
                | Self::BeforeAttributeName
                | Self::InAttributeName
                | Self::AfterAttributeName
                | Self::BeforeAttributeValue
                | Self::InAttributeValueDq
                | Self::InAttributeValueSq
                | Self::InAttributeValueNq
        )
    }

    /// Attribute value states, where character references feed the value.
    pub(super) const fn is_attribute_value(self) -> bool {
        matches!(
            self,
            Self::InAttributeValueDq | Self::InAttributeValueSq | Self::InAttributeValueNq
        )
    }
}

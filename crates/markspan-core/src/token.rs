//! Tokens produced by the inline tokenizer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rule::{Cancellation, CharacterRule};
use crate::style::CharacterStyle;

/// What a token stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// Plain text
    Text,
    OpenTag,
    IntermediateTag,
    CloseTag,
    /// A run of identical repeating glyphs; `count` of them are still visible
    RepeatingTag,
    /// Text produced by an escape sequence; never read as a delimiter again
    Escape,
    /// Stand-in for a resolved span while a later rule scans around it
    Placeholder,
}

/// Rules that must not look inside a token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) enum Shield {
    #[default]
    None,
    All,
    /// Rules opening with this tag
    Tag(String),
}

impl Shield {
    pub(crate) fn blocks(&self, rule: &CharacterRule) -> bool {
        match self {
            Shield::None => false,
            Shield::All => true,
            Shield::Tag(tag) => tag == rule.tag(),
        }
    }

    pub(crate) fn for_rule(rule: &CharacterRule) -> Self {
        match rule.cancellation() {
            Cancellation::None => Shield::None,
            Cancellation::AllRemaining => Shield::All,
            Cancellation::CurrentSet => Shield::Tag(rule.tag().to_string()),
        }
    }

    /// Combine two shields, keeping the stronger one
    pub(crate) fn merge(&mut self, other: &Shield) {
        match (&*self, other) {
            (_, Shield::None) | (Shield::All, _) => {}
            _ => *self = other.clone(),
        }
    }
}

/// A piece of a tokenized line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) raw: String,
    pub(crate) styles: Vec<CharacterStyle>,
    pub(crate) count: usize,
    pub(crate) metadata: Option<String>,
    pub(crate) consumed: bool,
    pub(crate) is_metadata: bool,
    pub(crate) group: usize,
    pub(crate) shield: Shield,
    pub(crate) boundary: bool,
    pub(crate) handle: Option<usize>,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let count = match kind {
            TokenKind::RepeatingTag => raw.chars().count(),
            _ => 0,
        };
        Self {
            kind,
            raw,
            styles: Vec::new(),
            count,
            metadata: None,
            consumed: false,
            is_metadata: false,
            group: 0,
            shield: Shield::None,
            boundary: false,
            handle: None,
        }
    }

    /// A plain text token
    pub fn text(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, raw)
    }

    pub(crate) fn placeholder(handle: usize) -> Self {
        let mut token = Self::new(TokenKind::Placeholder, "");
        token.handle = Some(handle);
        token
    }

    pub(crate) fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Source text of the token, markers included
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn styles(&self) -> &[CharacterStyle] {
        &self.styles
    }

    pub fn has_style(&self, style: &CharacterStyle) -> bool {
        self.styles.contains(style)
    }

    /// Link target, image source or other captured payload
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Text as it should be displayed
    pub fn visible_text(&self) -> &str {
        match self.kind {
            TokenKind::Placeholder => "",
            TokenKind::Text | TokenKind::Escape if self.is_metadata => "",
            TokenKind::Text | TokenKind::Escape => &self.raw,
            TokenKind::RepeatingTag => {
                let end = self
                    .raw
                    .char_indices()
                    .nth(self.count)
                    .map_or(self.raw.len(), |(index, _)| index);
                &self.raw[..end]
            }
            TokenKind::OpenTag | TokenKind::IntermediateTag | TokenKind::CloseTag => {
                if self.consumed || self.is_metadata {
                    ""
                } else {
                    &self.raw
                }
            }
        }
    }

    /// Append styles, skipping ones already present
    pub(crate) fn add_styles(&mut self, styles: &[CharacterStyle]) {
        for style in styles {
            if !self.styles.contains(style) {
                self.styles.push(style.clone());
            }
        }
    }

    /// Whether `rule` may rescan this token's text
    pub(crate) fn is_scannable(&self, rule: &CharacterRule) -> bool {
        match self.kind {
            TokenKind::Text | TokenKind::Escape => {
                !self.consumed && !self.is_metadata && !self.shield.blocks(rule)
            }
            TokenKind::Placeholder => true,
            _ => false,
        }
    }

    /// Demote a delimiter back to literal text
    pub(crate) fn into_literal(mut self) -> Self {
        if matches!(
            self.kind,
            TokenKind::Text | TokenKind::Escape | TokenKind::Placeholder
        ) {
            return self;
        }
        self.raw = self.literal_text();
        self.kind = TokenKind::Text;
        self.count = 0;
        self.consumed = false;
        self.is_metadata = false;
        self.boundary = false;
        self
    }

    fn literal_text(&self) -> String {
        match self.kind {
            TokenKind::RepeatingTag => self.visible_text().to_string(),
            _ => self.raw.clone(),
        }
    }

    /// Styles, metadata and shield must agree for two tokens to be scanned as one run
    pub(crate) fn same_attributes(&self, other: &Token) -> bool {
        self.styles == other.styles && self.metadata == other.metadata && self.shield == other.shield
    }
}

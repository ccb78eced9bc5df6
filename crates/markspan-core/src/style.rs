//! Style tags attached to lines and inline tokens.
//!
//! The engine treats these as opaque labels: it only copies, compares and
//! accumulates them. Mapping a tag to fonts or colors is the caller's job.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Style applied to an inline span of text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CharacterStyle {
    Bold,
    Italic,
    Code,
    Link,
    Image,
    Strikethrough,
    /// Link whose target came from a `[label]: url` definition
    Referenced,
    /// Caller-defined style for custom rules
    Custom(String),
}

/// Structural role assigned to a whole line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineStyle {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    #[default]
    Body,
    Blockquote,
    CodeBlock,
    UnorderedList,
    /// Caller-defined style for custom line rules
    Custom(String),
}

impl LineStyle {
    /// Whether inline markup inside a line of this style should be interpreted
    pub fn should_tokenize(&self) -> bool {
        !matches!(self, LineStyle::CodeBlock)
    }

    /// Heading level (1-6), if this is a heading style
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            LineStyle::H1 => Some(1),
            LineStyle::H2 => Some(2),
            LineStyle::H3 => Some(3),
            LineStyle::H4 => Some(4),
            LineStyle::H5 => Some(5),
            LineStyle::H6 => Some(6),
            _ => None,
        }
    }

    /// Heading style for a level, clamped to 1..=6
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => LineStyle::H1,
            2 => LineStyle::H2,
            3 => LineStyle::H3,
            4 => LineStyle::H4,
            5 => LineStyle::H5,
            _ => LineStyle::H6,
        }
    }
}

//! # markspan
//!
//! Turn Markdown text into styled token runs.
//!
//! Each line of a document is classified (heading, blockquote, list item,
//! code block, body) and its inline markup is resolved into tokens carrying
//! character styles and link targets. Turning those tokens into a rich text
//! object for a particular UI toolkit is left to the caller.
//!
//! ## Design
//!
//! - **Never fails on content**: malformed markup renders as literal text
//! - **Ordered rules**: line and inline rules run in the order they are
//!   listed, and that order decides ambiguous markup
//! - **Configurable**: rules are plain values that can be added, replaced or
//!   removed by name
//!
//! ## Example
//!
//! ```rust
//! use markspan::{CharacterStyle, LineStyle, MarkspanService};
//!
//! let service = MarkspanService::new().unwrap();
//! let lines = service.render_lines("# Title\nSome **bold** text");
//!
//! assert_eq!(lines[0].style, LineStyle::H1);
//! assert_eq!(lines[1].tokens[1].text, "bold");
//! assert!(lines[1].tokens[1].styles.contains(&CharacterStyle::Bold));
//! ```

mod references;
mod rules;
mod service;
mod utilities;

pub use markspan_core::{
    AppliesTo, Cancellation, CharacterRule, CharacterRuleBuilder, CharacterStyle, ClassifiedLine,
    LineClassifier, LineRule, LineStyle, RemoveFrom, RuleError, SpacingPolicy, TagKind, Token,
    TokenKind, Tokenizer,
};
pub use references::{extract_references, parse_definition};
pub use rules::{markdown_character_rules, markdown_line_rules, RuleSet, Rules};
pub use service::{MarkspanOptions, MarkspanService, StyledLine, StyledToken};
pub use utilities::*;

/// Error type for markspan operations
#[derive(Debug, thiserror::Error)]
pub enum MarkspanError {
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),
}

pub type Result<T> = std::result::Result<T, MarkspanError>;

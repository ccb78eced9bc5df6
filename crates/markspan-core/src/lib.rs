//! markspan-core - Markdown line classification and inline tokenizing
//!
//! This crate holds the engine behind `markspan`: rule models, the line
//! classifier and the character tokenizer. It has no opinion about which
//! rules exist; callers pass ordered rule lists in and get styled tokens out.
//!
//! # Architecture
//!
//! ```text
//!              ┌────────────────┐   ClassifiedLine   ┌───────────┐
//! Document ──▶ │ LineClassifier │ ─────────────────▶ │ Tokenizer │ ──▶ [Token]
//!              └────────────────┘                    └───────────┘
//!                 [LineRule]                         [CharacterRule]
//! ```
//!
//! # Example
//!
//! ```rust
//! use markspan_core::{CharacterRule, CharacterStyle, Tokenizer};
//!
//! let bold = CharacterRule::repeating("*")
//!     .repeat(1, 2)
//!     .style(1, [CharacterStyle::Italic])
//!     .style(2, [CharacterStyle::Bold])
//!     .build()
//!     .unwrap();
//!
//! let tokens = Tokenizer::new(vec![bold]).process("Some **bold** text");
//! assert_eq!(tokens[1].visible_text(), "bold");
//! assert!(tokens[1].has_style(&CharacterStyle::Bold));
//! ```

mod line;
mod line_rule;
mod rule;
mod style;
mod token;
mod tokenizer;

pub use line::{ClassifiedLine, LineClassifier};
pub use line_rule::{AppliesTo, LineRule, RemoveFrom};
pub use rule::{Cancellation, CharacterRule, CharacterRuleBuilder, RuleError, SpacingPolicy, TagKind};
pub use style::{CharacterStyle, LineStyle};
pub use token::{Token, TokenKind};
pub use tokenizer::{normalize_label, Tokenizer};

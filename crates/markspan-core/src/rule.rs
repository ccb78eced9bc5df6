//! Declarative description of one inline markup pattern.

use std::collections::BTreeMap;

use crate::style::CharacterStyle;

/// How the primary tag of a rule behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// The same glyph opens and closes; the run length selects the style (`*`, `**`, `***`)
    Repeating,
    /// A distinct open tag paired with a separate close tag (`[` ... `)`)
    Open,
}

/// Whether a delimiter touching whitespace still counts as markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacingPolicy {
    /// Neither side may be whitespace
    NoSpace,
    /// Whitespace is fine on both sides
    BothSides,
    /// At least one side must be non-whitespace
    #[default]
    OneSide,
    /// The character after the delimiter must not be whitespace
    LeadingSide,
    /// The character before the delimiter must not be whitespace
    TrailingSide,
}

impl SpacingPolicy {
    /// Check a delimiter run given its neighbours (`None` is the text boundary)
    pub fn allows(self, before: Option<char>, after: Option<char>) -> bool {
        let space_before = before.map_or(false, char::is_whitespace);
        let space_after = after.map_or(false, char::is_whitespace);
        match self {
            SpacingPolicy::NoSpace => {
                !(space_before || space_after || (before.is_none() && after.is_none()))
            }
            SpacingPolicy::BothSides => true,
            SpacingPolicy::OneSide => match (before, after) {
                (None, None) => true,
                _ => !((before.is_none() || space_before) && (after.is_none() || space_after)),
            },
            SpacingPolicy::LeadingSide => !space_after,
            SpacingPolicy::TrailingSide => !space_before,
        }
    }
}

/// What a resolved span does to the rules that run after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cancellation {
    #[default]
    None,
    /// No later rule looks inside the span
    AllRemaining,
    /// Later rules opening with the same tag skip the span
    CurrentSet,
}

/// Errors raised while building a [`CharacterRule`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Rule tags must not be empty")]
    EmptyTag,

    #[error("Invalid repeat range: minimum {min} is greater than maximum {max}")]
    InvalidRepeatRange { min: usize, max: usize },

    #[error("Minimum repeat count must be at least 1")]
    ZeroRepeat,

    #[error("Repeating tag `{0}` cannot have a close or intermediate tag")]
    RepeatingWithCloseTag(String),

    #[error("Repeating tag `{0}` must be a single character")]
    RepeatingTagLength(String),

    #[error("Open tag `{0}` has no close tag")]
    MissingCloseTag(String),
}

/// Which part of a paired rule a matched tag is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagRole {
    Open,
    Intermediate,
    Close,
}

/// An inline markup rule
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRule {
    tag: String,
    kind: TagKind,
    intermediate: Option<String>,
    close: Option<String>,
    escape: Option<char>,
    min_repeat: usize,
    max_repeat: usize,
    styles: BTreeMap<usize, Vec<CharacterStyle>>,
    spacing: SpacingPolicy,
    cancellation: Cancellation,
    metadata_lookup: bool,
    self_contained: bool,
}

impl CharacterRule {
    /// Start a rule whose single glyph both opens and closes
    pub fn repeating(glyph: impl Into<String>) -> CharacterRuleBuilder {
        CharacterRuleBuilder::new(glyph.into(), TagKind::Repeating)
    }

    /// Start a rule with distinct open and close tags
    pub fn paired(open: impl Into<String>, close: impl Into<String>) -> CharacterRuleBuilder {
        let mut builder = CharacterRuleBuilder::new(open.into(), TagKind::Open);
        builder.close = Some(close.into());
        builder.spacing = SpacingPolicy::BothSides;
        builder
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn intermediate_tag(&self) -> Option<&str> {
        self.intermediate.as_deref()
    }

    pub fn close_tag(&self) -> Option<&str> {
        self.close.as_deref()
    }

    pub fn escape_character(&self) -> Option<char> {
        self.escape
    }

    pub fn min_repeat(&self) -> usize {
        self.min_repeat
    }

    pub fn max_repeat(&self) -> usize {
        self.max_repeat
    }

    pub fn spacing(&self) -> SpacingPolicy {
        self.spacing
    }

    pub fn cancellation(&self) -> Cancellation {
        self.cancellation
    }

    pub fn metadata_lookup(&self) -> bool {
        self.metadata_lookup
    }

    pub fn is_self_contained(&self) -> bool {
        self.self_contained
    }

    /// Styles for a resolved span of `count` glyphs (always 1 for paired rules)
    pub fn styles_for(&self, count: usize) -> &[CharacterStyle] {
        self.styles.get(&count).map(Vec::as_slice).unwrap_or(&[])
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.tag.as_str())
            .chain(self.intermediate.as_deref())
            .chain(self.close.as_deref())
    }

    /// Characters that make up any of this rule's tags
    pub(crate) fn is_tag_char(&self, c: char) -> bool {
        self.tags().any(|tag| tag.contains(c))
    }

    /// Characters the scanner has to stop at
    pub(crate) fn is_interesting(&self, c: char) -> bool {
        self.escape == Some(c) || self.is_tag_char(c)
    }

    /// Whether every tag needed to form a span occurs somewhere in `text`
    pub(crate) fn tags_present(&self, text: &str) -> bool {
        self.tags().all(|tag| text.contains(tag))
    }

    /// Longest tag of a paired rule starting at the beginning of `chars`
    pub(crate) fn match_tag(&self, chars: &[char]) -> Option<(TagRole, usize)> {
        let candidates = [
            (TagRole::Open, Some(self.tag.as_str())),
            (TagRole::Intermediate, self.intermediate.as_deref()),
            (TagRole::Close, self.close.as_deref()),
        ];

        candidates
            .into_iter()
            .filter_map(|(role, tag)| {
                let tag = tag?;
                let len = tag.chars().count();
                let matches = chars.len() >= len && tag.chars().zip(chars).all(|(a, b)| a == *b);
                matches.then_some((role, len))
            })
            .max_by_key(|(_, len)| *len)
    }
}

/// Builder for [`CharacterRule`]
#[derive(Debug, Clone)]
pub struct CharacterRuleBuilder {
    tag: String,
    kind: TagKind,
    intermediate: Option<String>,
    close: Option<String>,
    escape: Option<char>,
    min_repeat: usize,
    max_repeat: usize,
    styles: BTreeMap<usize, Vec<CharacterStyle>>,
    spacing: SpacingPolicy,
    cancellation: Cancellation,
    metadata_lookup: bool,
    self_contained: bool,
}

impl CharacterRuleBuilder {
    fn new(tag: String, kind: TagKind) -> Self {
        Self {
            tag,
            kind,
            intermediate: None,
            close: None,
            escape: Some('\\'),
            min_repeat: 1,
            max_repeat: 1,
            styles: BTreeMap::new(),
            spacing: SpacingPolicy::default(),
            cancellation: Cancellation::default(),
            metadata_lookup: false,
            self_contained: false,
        }
    }

    /// Tag separating the enclosed text from its metadata, e.g. `](`
    pub fn intermediate(mut self, tag: impl Into<String>) -> Self {
        self.intermediate = Some(tag.into());
        self
    }

    pub fn close(mut self, tag: impl Into<String>) -> Self {
        self.close = Some(tag.into());
        self
    }

    pub fn escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    pub fn repeat(mut self, min: usize, max: usize) -> Self {
        self.min_repeat = min;
        self.max_repeat = max;
        self
    }

    /// Styles applied to a span closed by `count` glyphs
    pub fn style<I>(mut self, count: usize, styles: I) -> Self
    where
        I: IntoIterator<Item = CharacterStyle>,
    {
        self.styles.insert(count, styles.into_iter().collect());
        self
    }

    pub fn spacing(mut self, spacing: SpacingPolicy) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn cancels(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Treat the captured metadata as a key into the reference map
    pub fn metadata_lookup(mut self, lookup: bool) -> Self {
        self.metadata_lookup = lookup;
        self
    }

    /// Hide the resolved span from later rules as a single opaque unit
    pub fn self_contained(mut self, self_contained: bool) -> Self {
        self.self_contained = self_contained;
        self
    }

    pub fn build(self) -> Result<CharacterRule, RuleError> {
        let empty = |tag: &Option<String>| tag.as_deref().map_or(false, str::is_empty);
        if self.tag.is_empty() || empty(&self.intermediate) || empty(&self.close) {
            return Err(RuleError::EmptyTag);
        }
        if self.min_repeat == 0 {
            return Err(RuleError::ZeroRepeat);
        }
        if self.min_repeat > self.max_repeat {
            return Err(RuleError::InvalidRepeatRange {
                min: self.min_repeat,
                max: self.max_repeat,
            });
        }

        match self.kind {
            TagKind::Repeating => {
                if self.close.is_some() || self.intermediate.is_some() {
                    return Err(RuleError::RepeatingWithCloseTag(self.tag));
                }
                if self.tag.chars().count() != 1 {
                    return Err(RuleError::RepeatingTagLength(self.tag));
                }
            }
            TagKind::Open => {
                if self.close.is_none() {
                    return Err(RuleError::MissingCloseTag(self.tag));
                }
            }
        }

        Ok(CharacterRule {
            tag: self.tag,
            kind: self.kind,
            intermediate: self.intermediate,
            close: self.close,
            escape: self.escape,
            min_repeat: self.min_repeat,
            max_repeat: self.max_repeat,
            styles: self.styles,
            spacing: self.spacing,
            cancellation: self.cancellation,
            metadata_lookup: self.metadata_lookup,
            self_contained: self.self_contained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> CharacterRule {
        CharacterRule::paired("[", ")")
            .intermediate("](")
            .style(1, [CharacterStyle::Link])
            .build()
            .unwrap()
    }

    #[test]
    fn test_min_greater_than_max_is_rejected() {
        let result = CharacterRule::repeating("*").repeat(3, 1).build();
        assert_eq!(result, Err(RuleError::InvalidRepeatRange { min: 3, max: 1 }));
    }

    #[test]
    fn test_repeating_rule_with_close_tag_is_rejected() {
        let result = CharacterRule::repeating("*").close("*").build();
        assert_eq!(result, Err(RuleError::RepeatingWithCloseTag("*".to_string())));
    }

    #[test]
    fn test_repeating_tag_must_be_one_glyph() {
        let result = CharacterRule::repeating("**").build();
        assert_eq!(result, Err(RuleError::RepeatingTagLength("**".to_string())));
    }

    #[test]
    fn test_zero_minimum_is_rejected() {
        let result = CharacterRule::repeating("~").repeat(0, 2).build();
        assert_eq!(result, Err(RuleError::ZeroRepeat));
    }

    #[test]
    fn test_empty_tags_are_rejected() {
        assert_eq!(CharacterRule::repeating("").build(), Err(RuleError::EmptyTag));
        assert_eq!(CharacterRule::paired("[", "").build(), Err(RuleError::EmptyTag));
    }

    #[test]
    fn test_styles_for_missing_count_is_empty() {
        let rule = CharacterRule::repeating("*")
            .repeat(1, 2)
            .style(1, [CharacterStyle::Italic])
            .build()
            .unwrap();
        assert_eq!(rule.styles_for(1), &[CharacterStyle::Italic]);
        assert!(rule.styles_for(2).is_empty());
    }

    #[test]
    fn test_match_tag_prefers_longest() {
        let rule = CharacterRule::paired("[", "]")
            .intermediate("][")
            .build()
            .unwrap();
        let chars: Vec<char> = "][x".chars().collect();
        assert_eq!(rule.match_tag(&chars), Some((TagRole::Intermediate, 2)));
        let chars: Vec<char> = "]x".chars().collect();
        assert_eq!(rule.match_tag(&chars), Some((TagRole::Close, 1)));
    }

    #[test]
    fn test_tags_present() {
        let rule = link();
        assert!(rule.tags_present("[a](b)"));
        assert!(!rule.tags_present("[a](b"));
        assert!(rule.is_tag_char('('));
        assert!(rule.is_interesting('\\'));
        assert!(!rule.is_interesting('*'));
    }

    #[test]
    fn test_spacing_policies() {
        assert!(!SpacingPolicy::OneSide.allows(Some(' '), Some(' ')));
        assert!(!SpacingPolicy::OneSide.allows(None, Some(' ')));
        assert!(!SpacingPolicy::OneSide.allows(Some(' '), None));
        assert!(SpacingPolicy::OneSide.allows(Some(' '), Some('a')));
        assert!(SpacingPolicy::OneSide.allows(None, None));

        assert!(!SpacingPolicy::NoSpace.allows(Some('a'), Some(' ')));
        assert!(!SpacingPolicy::NoSpace.allows(None, None));
        assert!(SpacingPolicy::NoSpace.allows(None, Some('a')));

        assert!(!SpacingPolicy::LeadingSide.allows(Some('a'), Some(' ')));
        assert!(!SpacingPolicy::TrailingSide.allows(Some(' '), Some('a')));
        assert!(SpacingPolicy::BothSides.allows(Some(' '), Some(' ')));
    }
}

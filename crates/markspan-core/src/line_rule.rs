//! Declarative description of one line-level marker.

use crate::style::LineStyle;

/// Where the marker token is removed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveFrom {
    #[default]
    Leading,
    Trailing,
    /// Leading token required, trailing token stripped when present (`## Title ##`)
    Both,
    /// The line consists of nothing but repetitions of the token (`===`)
    EntireLine,
}

/// Which line the style lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppliesTo {
    #[default]
    Current,
    /// Restyle the line above and drop this one (Setext underlines)
    Previous,
    /// Toggle a block that lasts until the token appears again (fenced code)
    UntilClose,
}

/// A line rule
#[derive(Debug, Clone, PartialEq)]
pub struct LineRule {
    pub token: String,
    pub remove_from: RemoveFrom,
    pub style: LineStyle,
    pub trim: bool,
    pub applies_to: AppliesTo,
}

impl LineRule {
    pub fn new(token: impl Into<String>, style: LineStyle) -> Self {
        Self {
            token: token.into(),
            remove_from: RemoveFrom::default(),
            style,
            trim: true,
            applies_to: AppliesTo::default(),
        }
    }

    pub fn remove_from(mut self, remove_from: RemoveFrom) -> Self {
        self.remove_from = remove_from;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn applies_to(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = applies_to;
        self
    }

    /// Strip this rule's marker from `line`.
    ///
    /// Returns `None` when the rule does not match or leaves the line unchanged.
    pub fn strip(&self, line: &str) -> Option<String> {
        if self.token.is_empty() {
            return None;
        }

        let candidate = if self.trim { line.trim() } else { line };
        let stripped = match self.remove_from {
            RemoveFrom::Leading => candidate.strip_prefix(self.token.as_str())?.to_string(),
            RemoveFrom::Trailing => candidate.strip_suffix(self.token.trim())?.to_string(),
            RemoveFrom::Both => {
                let rest = candidate.strip_prefix(self.token.as_str())?;
                let rest = if self.trim { rest.trim_end() } else { rest };
                rest.strip_suffix(self.token.trim())
                    .unwrap_or(rest)
                    .to_string()
            }
            RemoveFrom::EntireLine => {
                if candidate.is_empty() || !candidate.replace(self.token.as_str(), "").is_empty() {
                    return None;
                }
                String::new()
            }
        };

        if stripped == candidate && self.remove_from != RemoveFrom::EntireLine {
            return None;
        }

        Some(if self.trim {
            stripped.trim().to_string()
        } else {
            stripped
        })
    }

    /// Whether the whole trimmed line is built from this rule's token characters
    pub fn is_underline(&self, line: &str) -> bool {
        let line = line.trim();
        !self.token.is_empty()
            && !line.is_empty()
            && line.chars().all(|c| self.token.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_strip() {
        let rule = LineRule::new("> ", LineStyle::Blockquote);
        assert_eq!(rule.strip("  > quoted  "), Some("quoted".to_string()));
        assert_eq!(rule.strip("not quoted"), None);
    }

    #[test]
    fn test_trailing_strip() {
        let rule = LineRule::new(" ;;", LineStyle::Custom("statement".to_string()))
            .remove_from(RemoveFrom::Trailing);
        assert_eq!(rule.strip("  code ;;  "), Some("code".to_string()));
        assert_eq!(rule.strip("code;;"), Some("code".to_string()));
        assert_eq!(rule.strip("no marker"), None);
        assert_eq!(rule.strip(";; at the start"), None);
    }

    #[test]
    fn test_both_strips_closing_hashes() {
        let rule = LineRule::new("#### ", LineStyle::H4).remove_from(RemoveFrom::Both);
        assert_eq!(
            rule.strip("  #### #Heading 4 ####"),
            Some("#Heading 4".to_string())
        );
        assert_eq!(rule.strip("#### Header 4#### "), Some("Header 4".to_string()));
    }

    #[test]
    fn test_both_requires_leading_token() {
        let rule = LineRule::new("## ", LineStyle::H2).remove_from(RemoveFrom::Both);
        assert_eq!(rule.strip("Trailing only ##"), None);
    }

    #[test]
    fn test_untrimmed_rule_keeps_remaining_indent() {
        let rule = LineRule::new("    ", LineStyle::CodeBlock).trim(false);
        assert_eq!(rule.strip("      let x = 1;"), Some("  let x = 1;".to_string()));
    }

    #[test]
    fn test_entire_line() {
        let rule = LineRule::new("=", LineStyle::H1).remove_from(RemoveFrom::EntireLine);
        assert_eq!(rule.strip("====="), Some(String::new()));
        assert_eq!(rule.strip("== x"), None);
        assert!(rule.is_underline(" === "));
        assert!(!rule.is_underline("=a="));
    }

    #[test]
    fn test_empty_token_never_matches() {
        let rule = LineRule::new("", LineStyle::H1);
        assert_eq!(rule.strip("anything"), None);
        assert!(!rule.is_underline("anything"));
    }
}

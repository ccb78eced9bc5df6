//! Named, ordered rule collections.

mod markdown;

pub use markdown::{markdown_character_rules, markdown_line_rules};

use indexmap::IndexMap;
use markspan_core::{CharacterRule, LineRule};

use crate::{MarkspanError, Result};

/// Rules keyed by name; iteration order is evaluation order
#[derive(Debug, Clone)]
pub struct RuleSet<R> {
    rules: IndexMap<String, R>,
}

impl<R> RuleSet<R> {
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Append a rule. Replacing an existing key keeps its position.
    pub fn add(&mut self, key: &str, rule: R) {
        self.rules.insert(key.to_string(), rule);
    }

    /// Insert a rule right before the rule named `before`
    pub fn insert_before(&mut self, before: &str, key: &str, rule: R) -> Result<()> {
        if before != key && !self.rules.contains_key(before) {
            return Err(MarkspanError::UnknownRule(before.to_string()));
        }
        self.rules.shift_remove(key);
        // Anchor equal to key: the old entry is gone, so append
        let index = self
            .rules
            .get_index_of(before)
            .unwrap_or(self.rules.len());
        self.rules.shift_insert(index, key.to_string(), rule);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<R> {
        self.rules.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.rules.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.rules.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R: Clone> RuleSet<R> {
    /// The rules in evaluation order
    pub fn to_vec(&self) -> Vec<R> {
        self.rules.values().cloned().collect()
    }
}

impl<R> Default for RuleSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, R> FromIterator<(K, R)> for RuleSet<R> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(key, rule)| (key.into(), rule))
                .collect(),
        }
    }
}

/// Line and character rules driving a [`MarkspanService`](crate::MarkspanService)
#[derive(Debug, Clone, Default)]
pub struct Rules {
    line_rules: RuleSet<LineRule>,
    character_rules: RuleSet<CharacterRule>,
}

impl Rules {
    /// An empty collection; every line is body text and nothing is styled
    pub fn new() -> Self {
        Self::default()
    }

    /// The default Markdown rule table
    pub fn markdown() -> Result<Self> {
        Ok(Self {
            line_rules: markdown_line_rules().into_iter().collect(),
            character_rules: markdown_character_rules()?.into_iter().collect(),
        })
    }

    pub fn line_rules(&self) -> &RuleSet<LineRule> {
        &self.line_rules
    }

    pub fn line_rules_mut(&mut self) -> &mut RuleSet<LineRule> {
        &mut self.line_rules
    }

    pub fn character_rules(&self) -> &RuleSet<CharacterRule> {
        &self.character_rules
    }

    pub fn character_rules_mut(&mut self) -> &mut RuleSet<CharacterRule> {
        &mut self.character_rules
    }
}

//! Inline tokenizer.
//!
//! Rules run one after another over the whole line, in the order they were
//! given. Each rule only looks at text that earlier rules left plain:
//!
//! 1. Spans resolved by self-contained rules (links, images) are folded into
//!    placeholders so their delimiters and metadata stay out of reach.
//! 2. Adjacent plain tokens that share attributes are joined and scanned as
//!    one unit, placeholders included.
//! 3. Delimiters are paired and the enclosed tokens styled.
//! 4. Placeholders are expanded again, picking up any styles they gained.
//!
//! Malformed markup never fails; it stays in the output as literal text.

mod replacements;
mod resolve;
mod scan;

use std::collections::HashMap;

use log::trace;

use crate::rule::{CharacterRule, TagKind};
use crate::token::{Token, TokenKind};
use replacements::Replacements;
use scan::Atom;

/// Normalize a reference label for lookup: case-insensitive, whitespace collapsed
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Applies an ordered list of [`CharacterRule`]s to a line of text
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    rules: Vec<CharacterRule>,
    references: HashMap<String, String>,
}

impl Tokenizer {
    pub fn new(rules: Vec<CharacterRule>) -> Self {
        Self {
            rules,
            references: HashMap::new(),
        }
    }

    /// Reference definitions (`label -> target`) used by lookup rules
    pub fn with_references<I, K, V>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.references = references
            .into_iter()
            .map(|(label, target)| (normalize_label(label.as_ref()), target.into()))
            .collect();
        self
    }

    pub fn rules(&self) -> &[CharacterRule] {
        &self.rules
    }

    /// Tokenize `text` with every rule.
    ///
    /// The result only holds plain-string tokens with visible text; adjacent
    /// tokens with the same styles and metadata are merged.
    pub fn process(&self, text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut replacements = Replacements::default();
        let mut tokens = vec![Token::text(text)];
        for rule in &self.rules {
            trace!("applying {:?} to {} tokens", rule.tag(), tokens.len());
            tokens = self.apply_rule(tokens, rule, &mut replacements);
            replacements.clear();
        }

        normalize(tokens)
    }

    /// Run a single rule over plain text.
    ///
    /// The tokens are returned unnormalized: delimiters and metadata tokens
    /// are still present, with their visible text reduced as they resolved.
    pub fn scan(&self, text: &str, rule: &CharacterRule) -> Vec<Token> {
        let mut replacements = Replacements::default();
        self.apply_rule(vec![Token::text(text)], rule, &mut replacements)
    }

    fn apply_rule(
        &self,
        tokens: Vec<Token>,
        rule: &CharacterRule,
        replacements: &mut Replacements,
    ) -> Vec<Token> {
        let tokens = self.fold(tokens, rule, replacements);
        let tokens = self.scan_runs(tokens, rule, replacements);
        replacements.expand(tokens)
    }

    /// Replace self-contained spans with placeholders, processing their
    /// insides on their own
    fn fold(
        &self,
        tokens: Vec<Token>,
        rule: &CharacterRule,
        replacements: &mut Replacements,
    ) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            if token.boundary && token.kind == TokenKind::OpenTag {
                if let Some(end) = matching_close(&tokens, index) {
                    let inner = self.apply_rule(tokens[index + 1..end].to_vec(), rule, replacements);
                    let mut span = Vec::with_capacity(inner.len() + 2);
                    span.push(tokens[index].clone());
                    span.extend(inner);
                    span.push(tokens[end].clone());

                    output.push(Token::placeholder(replacements.insert(span)));
                    index = end + 1;
                    continue;
                }
            }
            output.push(token.clone());
            index += 1;
        }

        output
    }

    /// Group scannable tokens into runs and scan each run
    fn scan_runs(
        &self,
        tokens: Vec<Token>,
        rule: &CharacterRule,
        replacements: &Replacements,
    ) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut run: Vec<Token> = Vec::new();

        for token in tokens {
            if !token.is_scannable(rule) {
                output.extend(self.scan_run(std::mem::take(&mut run), rule, replacements));
                output.push(token);
                continue;
            }

            let joins = token.kind == TokenKind::Placeholder
                || run
                    .iter()
                    .find(|t| t.kind != TokenKind::Placeholder)
                    .map_or(true, |base| base.same_attributes(&token));
            if !joins {
                output.extend(self.scan_run(std::mem::take(&mut run), rule, replacements));
            }
            run.push(token);
        }
        output.extend(self.scan_run(run, rule, replacements));

        output
    }

    fn scan_run(
        &self,
        run: Vec<Token>,
        rule: &CharacterRule,
        replacements: &Replacements,
    ) -> Vec<Token> {
        if run.is_empty() {
            return run;
        }

        let atoms: Vec<Atom> = run
            .iter()
            .flat_map(|token| -> Vec<Atom> {
                match (token.kind, token.handle) {
                    (TokenKind::Placeholder, Some(handle)) => vec![Atom::Placeholder(handle)],
                    (TokenKind::Escape, _) => token.raw.chars().map(Atom::Literal).collect(),
                    _ => token.raw.chars().map(Atom::Char).collect(),
                }
            })
            .collect();

        let plain: String = atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => *c,
                _ => '\0',
            })
            .collect();
        if !rule.tags_present(&plain) && !escapes_tag(&plain, rule) {
            return run;
        }

        let mut tokens = scan::scan(&atoms, rule);
        match rule.kind() {
            TagKind::Repeating => resolve::resolve_repeating(&mut tokens, rule),
            TagKind::Open => {
                resolve::resolve_paired(&mut tokens, rule, &self.references, replacements)
            }
        }

        if let Some(base) = run.iter().find(|t| t.kind != TokenKind::Placeholder) {
            for token in &mut tokens {
                token.add_styles(&base.styles);
                if token.metadata.is_none() {
                    token.metadata = base.metadata.clone();
                }
                token.shield.merge(&base.shield);
            }
        }

        tokens
    }
}

/// Whether `text` holds an escape sequence this rule would consume
fn escapes_tag(text: &str, rule: &CharacterRule) -> bool {
    let Some(escape) = rule.escape_character() else {
        return false;
    };
    text.chars()
        .zip(text.chars().skip(1))
        .any(|(c, next)| c == escape && rule.is_tag_char(next))
}

/// Index of the boundary close tag matching the boundary open tag at `open`
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if !token.boundary {
            continue;
        }
        match token.kind {
            TokenKind::OpenTag => depth += 1,
            TokenKind::CloseTag => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop invisible tokens and merge neighbours with identical attributes
fn normalize(tokens: Vec<Token>) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::new();

    for token in &tokens {
        let text = token.visible_text();
        if text.is_empty() {
            continue;
        }
        if let Some(last) = output.last_mut() {
            if last.styles == token.styles && last.metadata == token.metadata {
                last.raw.push_str(text);
                continue;
            }
        }
        let mut plain = Token::text(text);
        plain.styles = token.styles.clone();
        plain.metadata = token.metadata.clone();
        output.push(plain);
    }

    output
}

//! MarkspanService - the main entry point for styling Markdown text.

use std::collections::HashMap;

use log::debug;
use markspan_core::{CharacterStyle, LineClassifier, LineStyle, Token, Tokenizer};

use crate::references::extract_references;
use crate::rules::Rules;
use crate::Result;

/// Options for MarkspanService
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkspanOptions {
    /// Style for blank lines; `None` drops them
    pub empty_line_style: Option<LineStyle>,

    /// Style for lines no line rule claims
    pub default_line_style: LineStyle,

    /// Collect `[label]: url` lines and resolve reference links against them
    pub resolve_references: bool,
}

impl Default for MarkspanOptions {
    fn default() -> Self {
        Self {
            empty_line_style: None,
            default_line_style: LineStyle::Body,
            resolve_references: true,
        }
    }
}

/// A run of text with its line style and character styles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledToken {
    pub text: String,
    pub line_style: LineStyle,
    pub styles: Vec<CharacterStyle>,
    /// Link target or image source
    pub metadata: Option<String>,
}

impl StyledToken {
    fn from_token(token: Token, line_style: &LineStyle) -> Self {
        Self {
            text: token.visible_text().to_string(),
            line_style: line_style.clone(),
            styles: token.styles().to_vec(),
            metadata: token.metadata().map(str::to_string),
        }
    }

    fn plain(text: impl Into<String>, line_style: &LineStyle) -> Self {
        Self {
            text: text.into(),
            line_style: line_style.clone(),
            styles: Vec::new(),
            metadata: None,
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n" && self.styles.is_empty()
    }
}

/// One classified line and its tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub style: LineStyle,
    pub tokens: Vec<StyledToken>,
}

impl StyledLine {
    /// Visible text of the line
    pub fn text(&self) -> String {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }
}

/// The main service for styling Markdown
#[derive(Debug, Clone)]
pub struct MarkspanService {
    options: MarkspanOptions,
    rules: Rules,
}

impl MarkspanService {
    /// Create a service with default options and the Markdown rule table
    pub fn new() -> Result<Self> {
        Self::with_options(MarkspanOptions::default())
    }

    /// Create a service with custom options and the Markdown rule table
    pub fn with_options(options: MarkspanOptions) -> Result<Self> {
        Ok(Self::with_rules(options, Rules::markdown()?))
    }

    /// Create a service with custom options and rules
    pub fn with_rules(options: MarkspanOptions, rules: Rules) -> Self {
        Self { options, rules }
    }

    /// Style every line of `document`
    pub fn render_lines(&self, document: &str) -> Vec<StyledLine> {
        let classifier = LineClassifier::new(self.rules.line_rules().to_vec())
            .with_default_style(self.options.default_line_style.clone())
            .with_empty_line_style(self.options.empty_line_style.clone());
        let mut lines = classifier.process(document);

        let mut references = HashMap::new();
        if self.options.resolve_references {
            (lines, references) = extract_references(lines, &self.options.default_line_style);
            debug!("collected {} reference definitions", references.len());
        }

        let tokenizer =
            Tokenizer::new(self.rules.character_rules().to_vec()).with_references(references);

        lines
            .into_iter()
            .map(|line| {
                let tokens = if line.text.is_empty() {
                    Vec::new()
                } else if line.style.should_tokenize() {
                    tokenizer
                        .process(&line.text)
                        .into_iter()
                        .map(|token| StyledToken::from_token(token, &line.style))
                        .collect()
                } else {
                    vec![StyledToken::plain(line.text, &line.style)]
                };
                StyledLine {
                    style: line.style,
                    tokens,
                }
            })
            .collect()
    }

    /// Style `document` as one token stream with a `"\n"` token between lines
    pub fn render(&self, document: &str) -> Vec<StyledToken> {
        let mut tokens = Vec::new();

        for (index, line) in self.render_lines(document).into_iter().enumerate() {
            if index > 0 {
                tokens.push(StyledToken::plain("\n", &line.style));
            }
            tokens.extend(line.tokens);
        }

        tokens
    }

    /// The document with all markup removed
    pub fn plain_text(&self, document: &str) -> String {
        self.render(document)
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    /// Escape markup characters in a string
    pub fn escape(&self, text: &str) -> String {
        crate::utilities::escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &MarkspanOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut MarkspanOptions {
        &mut self.options
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Get mutable access to the rules, e.g. to add or reorder them
    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markspan_core::{CharacterRule, LineRule};

    fn texts(line: &StyledLine) -> Vec<&str> {
        line.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    #[test]
    fn test_heading_and_body() {
        let service = MarkspanService::new().unwrap();
        let lines = service.render_lines("## Title ##\nSome *words*");
        assert_eq!(lines[0].style, LineStyle::H2);
        assert_eq!(lines[0].text(), "Title");
        assert_eq!(lines[1].style, LineStyle::Body);
        assert_eq!(texts(&lines[1]), vec!["Some ", "words"]);
        assert_eq!(lines[1].tokens[1].styles, vec![CharacterStyle::Italic]);
    }

    #[test]
    fn test_setext_heading() {
        let service = MarkspanService::new().unwrap();
        let lines = service.render_lines("Header\n===\nBody\n---");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].style, LineStyle::H1);
        assert_eq!(lines[1].style, LineStyle::H2);
    }

    #[test]
    fn test_code_block_is_not_tokenized() {
        let service = MarkspanService::new().unwrap();
        let lines = service.render_lines("    let x = *y*;");
        assert_eq!(lines[0].style, LineStyle::CodeBlock);
        assert_eq!(texts(&lines[0]), vec!["let x = *y*;"]);
        assert!(lines[0].tokens[0].styles.is_empty());
    }

    #[test]
    fn test_fenced_code_block() {
        let service = MarkspanService::new().unwrap();
        let lines = service.render_lines("```rust\nlet a = **b**;\n```\nafter");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].style, LineStyle::CodeBlock);
        assert_eq!(lines[0].text(), "let a = **b**;");
        assert_eq!(lines[1].style, LineStyle::Body);
    }

    #[test]
    fn test_render_joins_lines() {
        let service = MarkspanService::new().unwrap();
        let tokens = service.render("> quoted\n- item");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].line_style, LineStyle::Blockquote);
        assert!(tokens[1].is_line_break());
        assert_eq!(tokens[2].text, "item");
        assert_eq!(tokens[2].line_style, LineStyle::UnorderedList);
    }

    #[test]
    fn test_empty_lines_are_kept_with_style() {
        let options = MarkspanOptions {
            empty_line_style: Some(LineStyle::Custom("blank".to_string())),
            ..Default::default()
        };
        let service = MarkspanService::with_options(options).unwrap();
        let lines = service.render_lines("one\n\ntwo");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].style, LineStyle::Custom("blank".to_string()));
        assert!(lines[1].tokens.is_empty());
        assert_eq!(service.plain_text("one\n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_reference_links() {
        let service = MarkspanService::new().unwrap();
        let lines = service.render_lines("Read [the docs][Docs].\n\n[docs]: https://docs.rs");
        assert_eq!(lines.len(), 1);
        let link = &lines[0].tokens[1];
        assert_eq!(link.text, "the docs");
        assert_eq!(link.metadata.as_deref(), Some("https://docs.rs"));
        assert!(link.styles.contains(&CharacterStyle::Referenced));
    }

    #[test]
    fn test_references_disabled() {
        let options = MarkspanOptions {
            resolve_references: false,
            ..Default::default()
        };
        let service = MarkspanService::with_options(options).unwrap();
        let text = service.plain_text("Read [the docs][docs].\n[docs]: https://docs.rs");
        assert_eq!(text, "Read [the docs][docs].\n[docs]: https://docs.rs");
    }

    #[test]
    fn test_custom_rules() {
        let mut rules = Rules::new();
        rules
            .line_rules_mut()
            .add("note", LineRule::new("!! ", LineStyle::Custom("note".to_string())));
        rules.character_rules_mut().add(
            "highlight",
            CharacterRule::repeating("=")
                .repeat(2, 2)
                .style(2, [CharacterStyle::Custom("highlight".to_string())])
                .build()
                .unwrap(),
        );
        let service = MarkspanService::with_rules(MarkspanOptions::default(), rules);

        let lines = service.render_lines("!! a ==marked== word");
        assert_eq!(lines[0].style, LineStyle::Custom("note".to_string()));
        assert_eq!(texts(&lines[0]), vec!["a ", "marked", " word"]);
        assert_eq!(
            lines[0].tokens[1].styles,
            vec![CharacterStyle::Custom("highlight".to_string())]
        );
    }

    #[test]
    fn test_escape_renders_back() {
        let service = MarkspanService::new().unwrap();
        let source = "2 * 3 = [six](maybe) and `not code` ~~nor~~ _this_";
        assert_eq!(service.plain_text(&service.escape(source)), source);
    }
}

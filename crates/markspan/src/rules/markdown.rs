//! Default Markdown rule table.

use markspan_core::{
    AppliesTo, Cancellation, CharacterRule, CharacterStyle, LineRule, LineStyle, RemoveFrom,
    RuleError,
};

/// Line rules for the supported Markdown subset, in evaluation order
pub fn markdown_line_rules() -> Vec<(&'static str, LineRule)> {
    let mut rules = vec![
        ("setext_h1", setext_rule("=", LineStyle::H1)),
        ("setext_h2", setext_rule("-", LineStyle::H2)),
        ("fenced_code", fenced_code_rule()),
        ("indented_code", indented_code_rule("    ")),
        ("tab_code", indented_code_rule("\t")),
        ("blockquote", LineRule::new(">", LineStyle::Blockquote)),
        ("unordered_list", LineRule::new("- ", LineStyle::UnorderedList)),
    ];
    rules.extend(atx_heading_rules());
    rules
}

/// Inline rules for the supported Markdown subset, in evaluation order
pub fn markdown_character_rules() -> Result<Vec<(&'static str, CharacterRule)>, RuleError> {
    Ok(vec![
        ("image", image_rule()?),
        ("link", link_rule()?),
        ("reference_link", reference_link_rule()?),
        ("code", code_rule()?),
        ("strikethrough", strikethrough_rule()?),
        ("asterisk", emphasis_rule("*")?),
        ("underscore", emphasis_rule("_")?),
    ])
}

fn setext_rule(token: &str, style: LineStyle) -> LineRule {
    LineRule::new(token, style)
        .remove_from(RemoveFrom::EntireLine)
        .applies_to(AppliesTo::Previous)
}

fn fenced_code_rule() -> LineRule {
    LineRule::new("```", LineStyle::CodeBlock)
        .trim(false)
        .applies_to(AppliesTo::UntilClose)
}

fn indented_code_rule(indent: &str) -> LineRule {
    LineRule::new(indent, LineStyle::CodeBlock).trim(false)
}

/// `###### ` down to `# `; longer markers must be tried first
fn atx_heading_rules() -> Vec<(&'static str, LineRule)> {
    const KEYS: [&str; 6] = ["atx_h1", "atx_h2", "atx_h3", "atx_h4", "atx_h5", "atx_h6"];

    (1..=6u8)
        .rev()
        .map(|level| {
            let token = format!("{} ", "#".repeat(usize::from(level)));
            let rule = LineRule::new(token, LineStyle::heading(level)).remove_from(RemoveFrom::Both);
            (KEYS[usize::from(level) - 1], rule)
        })
        .collect()
}

fn image_rule() -> Result<CharacterRule, RuleError> {
    CharacterRule::paired("![", ")")
        .intermediate("](")
        .style(1, [CharacterStyle::Image])
        .self_contained(true)
        .build()
}

fn link_rule() -> Result<CharacterRule, RuleError> {
    CharacterRule::paired("[", ")")
        .intermediate("](")
        .style(1, [CharacterStyle::Link])
        .self_contained(true)
        .build()
}

fn reference_link_rule() -> Result<CharacterRule, RuleError> {
    CharacterRule::paired("[", "]")
        .intermediate("][")
        .style(1, [CharacterStyle::Link, CharacterStyle::Referenced])
        .metadata_lookup(true)
        .self_contained(true)
        .build()
}

fn code_rule() -> Result<CharacterRule, RuleError> {
    CharacterRule::repeating("`")
        .repeat(1, 3)
        .style(1, [CharacterStyle::Code])
        .style(2, [CharacterStyle::Code])
        .style(3, [CharacterStyle::Code])
        .cancels(Cancellation::AllRemaining)
        .build()
}

fn strikethrough_rule() -> Result<CharacterRule, RuleError> {
    CharacterRule::repeating("~")
        .repeat(2, 2)
        .style(2, [CharacterStyle::Strikethrough])
        .build()
}

fn emphasis_rule(glyph: &str) -> Result<CharacterRule, RuleError> {
    CharacterRule::repeating(glyph)
        .repeat(1, 3)
        .style(1, [CharacterStyle::Italic])
        .style(2, [CharacterStyle::Bold])
        .style(3, [CharacterStyle::Bold, CharacterStyle::Italic])
        .build()
}

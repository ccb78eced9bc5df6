//! Line classification.
//!
//! Every input line is matched against an ordered list of [`LineRule`]s.
//! The first rule that changes the line wins; lines nobody claims get the
//! default style.

use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::line_rule::{AppliesTo, LineRule};
use crate::style::LineStyle;

/// A line with its markers stripped and its structural role attached
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifiedLine {
    pub text: String,
    pub style: LineStyle,
}

impl ClassifiedLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

enum Outcome<'a> {
    Line(ClassifiedLine),
    RestylePrevious(LineStyle),
    OpenBlock(&'a LineRule),
}

/// Assigns a [`LineStyle`] to each line of a document
#[derive(Debug, Clone)]
pub struct LineClassifier {
    rules: Vec<LineRule>,
    default_style: LineStyle,
    empty_line_style: Option<LineStyle>,
}

impl LineClassifier {
    pub fn new(rules: Vec<LineRule>) -> Self {
        Self {
            rules,
            default_style: LineStyle::Body,
            empty_line_style: None,
        }
    }

    /// Style for lines no rule matches
    pub fn with_default_style(mut self, style: LineStyle) -> Self {
        self.default_style = style;
        self
    }

    /// Keep blank lines and give them this style instead of dropping them
    pub fn with_empty_line_style(mut self, style: Option<LineStyle>) -> Self {
        self.empty_line_style = style;
        self
    }

    pub fn rules(&self) -> &[LineRule] {
        &self.rules
    }

    /// Classify every line of `document`
    pub fn process(&self, document: &str) -> Vec<ClassifiedLine> {
        let mut lines: Vec<ClassifiedLine> = Vec::new();
        let mut block: Option<&LineRule> = None;
        let mut after_blank = true;

        for line in document.lines() {
            if let Some(rule) = block {
                if rule.strip(line).is_some() {
                    debug!("closing {:?} block at {:?}", rule.style, line);
                    block = None;
                } else {
                    lines.push(ClassifiedLine::new(line, rule.style.clone()));
                }
                after_blank = false;
                continue;
            }

            if line.trim().is_empty() {
                if let Some(style) = &self.empty_line_style {
                    lines.push(ClassifiedLine::new("", style.clone()));
                }
                after_blank = true;
                continue;
            }

            let previous = if after_blank { None } else { lines.last() };
            match self.classify(line, previous) {
                Outcome::Line(classified) => {
                    trace!("{:?} -> {:?}", line, classified.style);
                    lines.push(classified);
                }
                Outcome::RestylePrevious(style) => {
                    if let Some(previous) = lines.last_mut() {
                        debug!("restyling {:?} as {:?}", previous.text, style);
                        previous.style = style;
                    }
                }
                Outcome::OpenBlock(rule) => {
                    debug!("opening {:?} block at {:?}", rule.style, line);
                    block = Some(rule);
                }
            }
            after_blank = false;
        }

        lines
    }

    fn classify<'a>(&'a self, line: &str, previous: Option<&ClassifiedLine>) -> Outcome<'a> {
        let can_restyle = previous
            .map_or(false, |p| p.style == self.default_style && !p.text.is_empty());

        for rule in &self.rules {
            match rule.applies_to {
                AppliesTo::Previous => {
                    if can_restyle && rule.is_underline(line) {
                        return Outcome::RestylePrevious(rule.style.clone());
                    }
                }
                AppliesTo::Current => {
                    if let Some(text) = rule.strip(line) {
                        return Outcome::Line(ClassifiedLine::new(text, rule.style.clone()));
                    }
                }
                AppliesTo::UntilClose => {
                    if rule.strip(line).is_some() {
                        return Outcome::OpenBlock(rule);
                    }
                }
            }
        }

        Outcome::Line(ClassifiedLine::new(line.trim(), self.default_style.clone()))
    }
}

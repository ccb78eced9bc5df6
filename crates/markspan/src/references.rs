//! Reference-style link definitions (`[label]: target "title"`).

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use markspan_core::{normalize_label, ClassifiedLine, LineStyle};

static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s{0,3}\[([^\]]+)\]:\s*<?([^\s>]+)>?(?:\s+(?:"[^"]*"|'[^']*'|\([^)]*\)))?\s*$"#)
        .unwrap()
});

/// Parse a definition line into its label and target
pub fn parse_definition(line: &str) -> Option<(&str, &str)> {
    let captures = DEFINITION_RE.captures(line)?;
    let label = captures.get(1)?.as_str();
    let target = captures.get(2)?.as_str();
    if label.trim().is_empty() {
        return None;
    }
    Some((label, target))
}

/// Remove definition lines of style `body` from `lines` and collect them.
///
/// Labels are normalized; the first definition of a label wins.
pub fn extract_references(
    lines: Vec<ClassifiedLine>,
    body: &LineStyle,
) -> (Vec<ClassifiedLine>, HashMap<String, String>) {
    let mut references = HashMap::new();
    let mut kept = Vec::with_capacity(lines.len());

    for line in lines {
        if &line.style == body {
            if let Some((label, target)) = parse_definition(&line.text) {
                debug!("reference definition {:?} -> {:?}", label, target);
                references
                    .entry(normalize_label(label))
                    .or_insert_with(|| target.to_string());
                continue;
            }
        }
        kept.push(line);
    }

    (kept, references)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition() {
        assert_eq!(
            parse_definition("[docs]: https://docs.rs"),
            Some(("docs", "https://docs.rs"))
        );
        assert_eq!(
            parse_definition(r#"[Docs Site]: <https://docs.rs> "The docs""#),
            Some(("Docs Site", "https://docs.rs"))
        );
        assert_eq!(parse_definition("[docs]: a b"), None);
        assert_eq!(parse_definition("[docs] https://docs.rs"), None);
        assert_eq!(parse_definition("[ ]: https://docs.rs"), None);
    }

    #[test]
    fn test_extract_keeps_first_definition() {
        let lines = vec![
            ClassifiedLine::new("See [the docs][Docs].", LineStyle::Body),
            ClassifiedLine::new("[docs]: https://first.example", LineStyle::Body),
            ClassifiedLine::new("[DOCS]: https://second.example", LineStyle::Body),
        ];
        let (kept, references) = extract_references(lines, &LineStyle::Body);
        assert_eq!(kept.len(), 1);
        assert_eq!(references.get("docs").map(String::as_str), Some("https://first.example"));
    }

    #[test]
    fn test_code_lines_are_not_definitions() {
        let lines = vec![ClassifiedLine::new("[docs]: https://docs.rs", LineStyle::CodeBlock)];
        let (kept, references) = extract_references(lines, &LineStyle::Body);
        assert_eq!(kept.len(), 1);
        assert!(references.is_empty());
    }
}

//! Pairing and styling of scanned delimiters.

use std::collections::HashMap;

use log::debug;

use super::normalize_label;
use super::replacements::Replacements;
use crate::rule::CharacterRule;
use crate::token::{Shield, Token, TokenKind};

/// Pair repeating delimiters left to right and style what they enclose.
///
/// Delimiters that never pair are turned back into text.
pub(crate) fn resolve_repeating(tokens: &mut [Token], rule: &CharacterRule) {
    for index in 0..tokens.len() {
        if tokens[index].kind == TokenKind::RepeatingTag {
            pair_repeating(tokens, index, rule);
        }
    }

    for token in tokens.iter_mut() {
        if token.kind == TokenKind::RepeatingTag && !token.consumed {
            demote(token);
        }
    }
}

fn pair_repeating(tokens: &mut [Token], open: usize, rule: &CharacterRule) {
    loop {
        if tokens[open].consumed || tokens[open].count == 0 {
            return;
        }
        let (count, group) = (tokens[open].count, tokens[open].group);
        let (min, max) = (rule.min_repeat(), rule.max_repeat());
        // Leftover glyphs below the minimum cannot open a span
        let open_used = count.min(max);
        if open_used < min {
            return;
        }

        let candidates = || {
            tokens
                .iter()
                .enumerate()
                .skip(open + 1)
                .filter(|(_, t)| t.kind == TokenKind::RepeatingTag && !t.consumed && t.count >= min)
        };
        // An identical run from another group first, then anything left
        let close = candidates()
            .find(|(_, t)| t.count == count && t.group != group)
            .or_else(|| candidates().next())
            .map(|(index, _)| index);
        let Some(close) = close else {
            return;
        };

        // The opening run picks the style, the closing run decides how many
        // glyphs each side gives up
        let close_used = tokens[close].count.min(max);
        let styles = rule.styles_for(open_used);
        let shield = Shield::for_rule(rule);
        for token in &mut tokens[open + 1..close] {
            token.add_styles(styles);
            token.shield.merge(&shield);
        }
        debug!(
            "paired {:?} x{} at {} and {}",
            rule.tag(),
            open_used,
            open,
            close
        );

        let taken = close_used.min(count);
        tokens[open].count -= taken;
        tokens[close].count -= taken;
        if tokens[close].count == 0 || close_used == max {
            tokens[close].consumed = true;
        }
        if tokens[open].count == 0 || close_used == max {
            tokens[open].consumed = true;
        }
    }
}

/// Resolve paired open/intermediate/close spans produced by the scanner
pub(crate) fn resolve_paired(
    tokens: &mut [Token],
    rule: &CharacterRule,
    references: &HashMap<String, String>,
    replacements: &Replacements,
) {
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].kind != TokenKind::OpenTag || tokens[index].consumed {
            index += 1;
            continue;
        }
        let Some(close) = find(tokens, index + 1, TokenKind::CloseTag) else {
            break;
        };
        let middle = rule
            .intermediate_tag()
            .and_then(|_| find(&tokens[..close], index + 1, TokenKind::IntermediateTag));
        let text_end = middle.unwrap_or(close);

        let payload = middle
            .map(|middle| visible(&tokens[middle + 1..close], replacements))
            .unwrap_or_default();
        let metadata = if rule.metadata_lookup() {
            let key = if payload.trim().is_empty() {
                visible(&tokens[index + 1..text_end], replacements)
            } else {
                payload
            };
            match references.get(&normalize_label(&key)) {
                Some(target) => Some(target.clone()),
                None => {
                    debug!("no reference for {:?}, leaving it literal", key);
                    tokens[index..=close].iter_mut().for_each(demote);
                    index = close + 1;
                    continue;
                }
            }
        } else {
            Some(payload).filter(|payload| !payload.is_empty())
        };

        if let Some(middle) = middle {
            for token in &mut tokens[middle + 1..close] {
                token.is_metadata = true;
            }
            tokens[middle].consumed = true;
        }

        let shield = Shield::for_rule(rule);
        for token in &mut tokens[index + 1..text_end] {
            token.add_styles(rule.styles_for(1));
            if token.metadata.is_none() {
                token.metadata = metadata.clone();
            }
            token.shield.merge(&shield);
        }
        debug!("resolved {:?} span with metadata {:?}", rule.tag(), metadata);

        for position in [index, close] {
            tokens[position].consumed = true;
            tokens[position].boundary = rule.is_self_contained();
        }
        index = close + 1;
    }
}

fn find(tokens: &[Token], from: usize, kind: TokenKind) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, token)| token.kind == kind && !token.consumed)
        .map(|(index, _)| index)
}

fn visible(tokens: &[Token], replacements: &Replacements) -> String {
    tokens
        .iter()
        .map(|token| match token.handle {
            Some(handle) => replacements.visible_text(handle),
            None => token.visible_text().to_string(),
        })
        .collect()
}

fn demote(token: &mut Token) {
    let literal = std::mem::replace(token, Token::text("")).into_literal();
    *token = literal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CharacterStyle;
    use crate::tokenizer::scan::{atoms, scan};

    fn asterisk() -> CharacterRule {
        CharacterRule::repeating("*")
            .repeat(1, 3)
            .style(1, [CharacterStyle::Italic])
            .style(2, [CharacterStyle::Bold])
            .style(3, [CharacterStyle::Bold, CharacterStyle::Italic])
            .build()
            .unwrap()
    }

    fn resolved(text: &str, rule: &CharacterRule) -> Vec<Token> {
        let mut tokens = scan(&atoms(text), rule);
        match rule.kind() {
            crate::rule::TagKind::Repeating => resolve_repeating(&mut tokens, rule),
            crate::rule::TagKind::Open => {
                resolve_paired(&mut tokens, rule, &HashMap::new(), &Replacements::default())
            }
        }
        tokens
    }

    fn styled<'a>(tokens: &'a [Token], text: &str) -> &'a [CharacterStyle] {
        tokens
            .iter()
            .find(|t| t.visible_text() == text)
            .map(Token::styles)
            .unwrap()
    }

    #[test]
    fn test_exact_count_is_preferred() {
        let tokens = resolved("**AAAA*BB*AAAAAA**", &asterisk());
        assert_eq!(styled(&tokens, "AAAA"), &[CharacterStyle::Bold]);
        assert_eq!(
            styled(&tokens, "BB"),
            &[CharacterStyle::Bold, CharacterStyle::Italic]
        );
        assert_eq!(styled(&tokens, "AAAAAA"), &[CharacterStyle::Bold]);
    }

    #[test]
    fn test_remaining_count_pairs_again() {
        let tokens = resolved("***bold** italic*", &asterisk());
        assert_eq!(
            styled(&tokens, "bold"),
            &[CharacterStyle::Bold, CharacterStyle::Italic]
        );
        assert_eq!(styled(&tokens, " italic"), &[CharacterStyle::Italic]);
    }

    #[test]
    fn test_excess_glyphs_stay_outside() {
        let tokens = resolved("****bold italic*** word", &asterisk());
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "*bold italic word");
        assert!(tokens[0].styles().is_empty());
        assert_eq!(tokens[0].visible_text(), "*");
    }

    #[test]
    fn test_opening_run_picks_style() {
        let tokens = resolved("**a*", &asterisk());
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "*a");
        assert_eq!(styled(&tokens, "a"), &[CharacterStyle::Bold]);

        let tokens = resolved("***a*", &asterisk());
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "**a");
        assert_eq!(
            styled(&tokens, "a"),
            &[CharacterStyle::Bold, CharacterStyle::Italic]
        );
    }

    #[test]
    fn test_longer_closing_run_keeps_its_excess() {
        let tokens = resolved("*a***", &asterisk());
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "a**");
        assert_eq!(styled(&tokens, "a"), &[CharacterStyle::Italic]);
    }

    #[test]
    fn test_leftover_below_minimum_stays_literal() {
        let mark = CharacterStyle::Custom("mark".to_string());
        let big = CharacterStyle::Custom("big".to_string());
        let rule = CharacterRule::repeating("=")
            .repeat(2, 3)
            .style(2, [mark])
            .style(3, [big.clone()])
            .build()
            .unwrap();

        let tokens = resolved("===a== b==", &rule);
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "=a b==");
        assert_eq!(styled(&tokens, "a"), &[big]);
        assert!(styled(&tokens, " b").is_empty());
        let glyphs: usize = tokens
            .iter()
            .map(|t| t.visible_text().matches('=').count())
            .sum();
        assert_eq!(glyphs + 4, 7);
    }

    #[test]
    fn test_unpaired_delimiter_becomes_text() {
        let tokens = resolved("a **b", &asterisk());
        assert!(tokens.iter().all(|t| t.kind() == TokenKind::Text));
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "a **b");
    }

    #[test]
    fn test_paired_metadata() {
        let rule = CharacterRule::paired("[", ")")
            .intermediate("](")
            .style(1, [CharacterStyle::Link])
            .self_contained(true)
            .build()
            .unwrap();
        let tokens = resolved("[Link](http://example.com/)", &rule);
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "Link");
        let link = tokens.iter().find(|t| t.visible_text() == "Link").unwrap();
        assert_eq!(link.metadata(), Some("http://example.com/"));
        assert!(tokens[0].boundary);
    }

    #[test]
    fn test_unknown_reference_stays_literal() {
        let rule = CharacterRule::paired("[", "]")
            .intermediate("][")
            .style(1, [CharacterStyle::Link])
            .metadata_lookup(true)
            .build()
            .unwrap();
        let tokens = resolved("[text][missing]", &rule);
        let text: String = tokens.iter().map(Token::visible_text).collect();
        assert_eq!(text, "[text][missing]");
        assert!(tokens.iter().all(|t| t.styles().is_empty()));
    }

    #[test]
    fn test_known_reference_resolves() {
        let rule = CharacterRule::paired("[", "]")
            .intermediate("][")
            .style(1, [CharacterStyle::Link])
            .metadata_lookup(true)
            .build()
            .unwrap();
        let mut references = HashMap::new();
        references.insert("docs".to_string(), "https://docs.rs".to_string());

        let mut tokens = scan(&atoms("[text][Docs]"), &rule);
        resolve_paired(&mut tokens, &rule, &references, &Replacements::default());
        let text = tokens.iter().find(|t| t.visible_text() == "text").unwrap();
        assert_eq!(text.metadata(), Some("https://docs.rs"));
    }
}

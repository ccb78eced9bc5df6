//! Arena of resolved spans hidden behind placeholder tokens.

use crate::token::Token;

/// Spans folded out of the token stream while one rule runs.
///
/// Handles are indices into the arena and are only valid until
/// [`Replacements::clear`].
#[derive(Debug, Default)]
pub(crate) struct Replacements {
    spans: Vec<Option<Vec<Token>>>,
}

impl Replacements {
    pub(crate) fn insert(&mut self, tokens: Vec<Token>) -> usize {
        self.spans.push(Some(tokens));
        self.spans.len() - 1
    }

    /// Visible text of a stored span
    pub(crate) fn visible_text(&self, handle: usize) -> String {
        self.spans
            .get(handle)
            .and_then(Option::as_ref)
            .map(|tokens| tokens.iter().map(Token::visible_text).collect())
            .unwrap_or_default()
    }

    /// Splice stored spans back in place of their placeholders.
    ///
    /// Styles gathered by a placeholder while it stood in for the span are
    /// merged onto every token of the span.
    pub(crate) fn expand(&mut self, tokens: Vec<Token>) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());

        for token in tokens {
            let span = token
                .handle
                .and_then(|handle| self.spans.get_mut(handle)?.take());
            let Some(span) = span else {
                output.push(token);
                continue;
            };

            for mut child in span {
                child.add_styles(&token.styles);
                if child.metadata.is_none() {
                    child.metadata = token.metadata.clone();
                }
                child.shield.merge(&token.shield);
                child.is_metadata |= token.is_metadata;
                output.push(child);
            }
        }

        output
    }

    pub(crate) fn clear(&mut self) {
        self.spans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CharacterStyle;
    use crate::token::Shield;

    #[test]
    fn test_expand_merges_outer_styles() {
        let mut replacements = Replacements::default();
        let mut inner = Token::text("Link");
        inner.styles.push(CharacterStyle::Link);
        inner.metadata = Some("url".to_string());
        let handle = replacements.insert(vec![inner]);

        let mut placeholder = Token::placeholder(handle);
        placeholder.styles.push(CharacterStyle::Bold);
        placeholder.metadata = Some("other".to_string());
        placeholder.shield = Shield::All;

        let tokens = replacements.expand(vec![Token::text("A "), placeholder]);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].styles(), &[CharacterStyle::Link, CharacterStyle::Bold]);
        assert_eq!(tokens[1].metadata(), Some("url"));
        assert_eq!(tokens[1].shield, Shield::All);
    }

    #[test]
    fn test_visible_text_of_span() {
        let mut replacements = Replacements::default();
        let handle = replacements.insert(vec![Token::text("a"), Token::text("b")]);
        assert_eq!(replacements.visible_text(handle), "ab");
        assert_eq!(replacements.visible_text(handle + 1), "");
    }

    #[test]
    fn test_clear_drops_spans() {
        let mut replacements = Replacements::default();
        let handle = replacements.insert(vec![Token::text("a")]);
        replacements.clear();
        let tokens = replacements.expand(vec![Token::placeholder(handle)]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].visible_text(), "");
    }
}

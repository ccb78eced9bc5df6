//! Text helpers.

/// Characters the default rule table treats as markup
pub const MARKUP_CHARACTERS: &[char] = &['`', '*', '_', '~', '[', ']', '(', ')'];

/// Escape markup characters so the text renders back unchanged
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if MARKUP_CHARACTERS.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

//! Markup sanitizing for comment fields

/// Strip unsafe tags and attributes, keeping user-generated-content markup
pub fn sanitize_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    ammonia::clean(input)
}

/// Escape HTML special characters in a plain-text field
///
/// Only markup characters are replaced. `ammonia::clean_text` also escapes
/// spaces and line breaks, which display names have to keep as typed.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

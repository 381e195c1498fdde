//! Rich-text shaping: budgeted truncation and budget balancing
//!
//! Catalog metafields carry HTML fragments of unbounded length; the flyer
//! layout has fixed room. These modules cut the fragments down to character
//! budgets without breaking the tag structure.

pub mod balance;
pub mod truncate;

pub use balance::balance_content;
pub use truncate::truncate_markup;

/// Escape text content for HTML serialization
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape an attribute value for HTML serialization
pub(crate) fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

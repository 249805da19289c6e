//! Search pattern construction.

/// Treatment of `%` and `_` inside caller-supplied search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum WildcardPolicy {
    /// Metacharacters in the text act as ILIKE wildcards ("50%" also matches "500 items").
    #[default]
    PassThrough,
    /// Metacharacters are backslash-escaped and matched literally.
    Escape,
}

/// Build the ILIKE pattern for a substring match on `text`.
///
/// Empty text yields `%%`, which matches every row.
pub fn substring_pattern(text: &str, policy: WildcardPolicy) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    match policy {
        WildcardPolicy::PassThrough => pattern.push_str(text),
        WildcardPolicy::Escape => {
            for c in text.chars() {
                // backslash is the default LIKE escape character in PostgreSQL
                if matches!(c, '\\' | '%' | '_') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
        }
    }
    pattern.push('%');
    pattern
}

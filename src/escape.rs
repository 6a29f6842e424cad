//! String escaping utilities for generated SQL.
//!
//! Literal values never reach SQL text; they are always bound as parameters.
//! The only text we splice in ourselves is JSON paths (inside single-quoted SQL
//! string literals) and identifiers, and both go through here.

/// Escape a string for use inside a single-quoted SQL string literal.
pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote an identifier with double quotes, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether a JSON path key can be written bare (`$.key`) rather than quoted.
pub fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape an object key for a JSON path segment.
///
/// Plain keys are returned unchanged; anything else is wrapped in double
/// quotes with backslashes and quotes escaped (`$."first name"`).
pub fn escape_path_key(key: &str) -> String {
    if is_plain_key(key) {
        return key.to_string();
    }
    let mut result = String::with_capacity(key.len() + 2);
    result.push('"');
    for c in key.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

//! Literal and identifier quoting
//!
//! Every string literal and identifier in generated statements goes through
//! this module, so escaping rules live in exactly one place.

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    quoted.push_str(&value.replace('\'', "''"));
    quoted.push('\'');
    quoted
}

/// Quote an identifier only when it cannot be printed bare.
///
/// Plain lower-case identifiers (`[a-z_][a-z0-9_$]*`) are emitted as-is;
/// anything else is wrapped in double quotes with embedded quotes doubled.
pub fn quote_identifier(ident: &str) -> String {
    if is_bare_identifier(ident) {
        return ident.to_string();
    }
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn is_bare_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_string_plain() {
        assert_eq!(quote_string("b1:9092"), "'b1:9092'");
        assert_eq!(quote_string(""), "''");
    }

    #[test]
    fn test_quote_string_escapes_quotes() {
        assert_eq!(quote_string("it's"), "'it''s'");
        assert_eq!(quote_string("''"), "''''''");
    }

    #[test]
    fn test_quote_identifier_bare() {
        assert_eq!(quote_identifier("k1"), "k1");
        assert_eq!(quote_identifier("pw_secret"), "pw_secret");
        assert_eq!(quote_identifier("_x$1"), "_x$1");
    }

    #[test]
    fn test_quote_identifier_quoted() {
        assert_eq!(quote_identifier("Kafka"), "\"Kafka\"");
        assert_eq!(quote_identifier("1st"), "\"1st\"");
        assert_eq!(quote_identifier("my conn"), "\"my conn\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}

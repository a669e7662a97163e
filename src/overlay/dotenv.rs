//! `.env` file parsing
//!
//! Parsed with `dotenvy` in iterator mode, so the process environment is
//! never written. Unquoted and double-quoted values may reference earlier
//! variables with `$NAME` or `${NAME}`; single-quoted values are literal.
//! Later duplicates win.

use std::collections::BTreeMap;

/// Parse the contents of an environment file
pub fn parse_env(contents: &str) -> Result<BTreeMap<String, String>, dotenvy::Error> {
    dotenvy::from_read_iter(contents.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pairs_and_comments() {
        let vars = parse_env(
            "# api settings\n\nAPI_URL=https://api.example.com\nexport DEBUG=true\n",
        )
        .unwrap();

        assert_eq!(vars.len(), 2);
        assert_eq!(vars["API_URL"], "https://api.example.com");
        assert_eq!(vars["DEBUG"], "true");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let vars = parse_env("QUERY=a=b&c=d").unwrap();
        assert_eq!(vars["QUERY"], "a=b&c=d");
    }

    #[test]
    fn test_inline_comment_on_unquoted_value() {
        let vars = parse_env("PORT=8066 # dev port\nEMPTY=\n").unwrap();
        assert_eq!(vars["PORT"], "8066");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn test_double_quoted_keeps_hash() {
        let vars = parse_env(r#"GREETING="hello # not a comment""#).unwrap();
        assert_eq!(vars["GREETING"], "hello # not a comment");
    }

    #[test]
    fn test_single_quoted_is_literal() {
        let vars = parse_env("PATTERN='$HOME ${GARFIELD_TEST_UNSET}'").unwrap();
        assert_eq!(vars["PATTERN"], "$HOME ${GARFIELD_TEST_UNSET}");
    }

    #[test]
    fn test_references_earlier_variable() {
        let vars = parse_env(
            "GARFIELD_TEST_ORIGIN=http://localhost:4000\nAPI=${GARFIELD_TEST_ORIGIN}/api\n",
        )
        .unwrap();
        assert_eq!(vars["API"], "http://localhost:4000/api");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let vars = parse_env("MODE=a\nMODE=b\n").unwrap();
        assert_eq!(vars["MODE"], "b");
    }

    #[test]
    fn test_unquoted_whitespace_rejected() {
        assert!(parse_env("NAME=two words").is_err());
    }

    #[test]
    fn test_missing_equals_rejected() {
        let err = parse_env("A=1\nnot a pair\n").unwrap_err();
        assert!(matches!(
            err,
            dotenvy::Error::LineParse(ref line, _) if line.contains("not a pair")
        ));
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(parse_env("1ABC=x").is_err());
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        assert!(parse_env("A=\"open").is_err());
    }
}

//! Command-line tokenization
//!
//! Splits a single command string into an argument vector using a small
//! subset of shell quoting:
//!
//! - spaces and tabs separate arguments outside quotes
//! - `'...'` keeps everything literal up to the closing quote
//! - `"..."` keeps whitespace but still honours backslash escapes
//! - `\x` outside single quotes yields `x` literally
//!
//! An unterminated quote runs to the end of the input. A trailing lone
//! backslash is dropped. Quotes that enclose nothing do not produce an
//! empty argument.

/// Split `command_line` into arguments.
///
/// Returns an empty vector for empty or whitespace-only input.
pub fn tokenize(command_line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escape = false;

    for c in command_line.chars() {
        if escape {
            current.push(c);
            escape = false;
            continue;
        }

        match c {
            '\\' if !in_single => escape = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ' ' | '\t' if !in_single && !in_double => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_inputs_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize(" \t \t").is_empty());
    }

    #[test]
    fn double_quotes_group_words() {
        assert_eq!(tokenize(r#"echo "hello world""#), vec!["echo", "hello world"]);
    }

    #[test]
    fn backslash_escapes_space() {
        assert_eq!(tokenize(r"a\ b"), vec!["a b"]);
    }

    #[test]
    fn single_quotes_group_words() {
        assert_eq!(tokenize("'a b'"), vec!["a b"]);
    }

    #[test]
    fn escaped_quote_inside_double_quotes() {
        assert_eq!(tokenize(r#""a\"b""#), vec![r#"a"b"#]);
    }

    #[test]
    fn backslash_is_literal_inside_single_quotes() {
        assert_eq!(tokenize(r"'a\b'"), vec![r"a\b"]);
        assert_eq!(tokenize(r"'C:\dir\'"), vec![r"C:\dir\"]);
    }

    #[test]
    fn escaped_backslash_is_kept_once() {
        assert_eq!(tokenize(r"a\\b"), vec![r"a\b"]);
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        assert_eq!(
            tokenize("  ls \t -la\t\t/tmp  "),
            vec!["ls", "-la", "/tmp"]
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("echo 'one two"), vec!["echo", "one two"]);
        assert_eq!(tokenize(r#"echo "one two"#), vec!["echo", "one two"]);
    }

    #[test]
    fn trailing_backslash_is_dropped() {
        assert_eq!(tokenize(r"echo abc\"), vec!["echo", "abc"]);
    }

    #[test]
    fn empty_quotes_do_not_produce_argument() {
        assert_eq!(tokenize(r#"echo "" x"#), vec!["echo", "x"]);
    }

    #[test]
    fn adjacent_quoted_segments_join() {
        assert_eq!(tokenize(r#"pre"mid dle"'post fix'"#), vec!["premid dlepost fix"]);
    }

    #[test]
    fn quote_of_other_kind_is_literal() {
        assert_eq!(tokenize(r#"say "it's""#), vec!["say", "it's"]);
        assert_eq!(tokenize(r#"say 'a "b"'"#), vec!["say", r#"a "b""#]);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(tokenize("grep 'héllo wörld' ñ"), vec!["grep", "héllo wörld", "ñ"]);
    }

    #[test]
    fn newline_is_not_a_separator() {
        assert_eq!(tokenize("a\nb c"), vec!["a\nb", "c"]);
    }
}

/// Split a command line into tokens, treating double-quoted spans as single
/// tokens with the quotes stripped.
///
/// An unterminated quote is not an error: the quoted span simply ends at the
/// end of input.
pub fn parse_query(query: &str) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut keyword = String::new();
    for chr in query.chars() {
        if chr == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if chr.is_whitespace() && !in_quotes {
            if !keyword.is_empty() {
                parsed.push(keyword);
                keyword = String::new();
            }
        } else {
            keyword.push(chr);
        }
    }
    if !keyword.is_empty() {
        parsed.push(keyword);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            parse_query("nc --get-time"),
            vec!["nc".to_string(), "--get-time".to_string()]
        );
    }

    #[test]
    fn quoted_spans_are_single_tokens() {
        assert_eq!(
            parse_query(r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "2023-07-15 12:30:45""#),
            vec![
                "nc".to_string(),
                "--set-time".to_string(),
                "yyyy-MM-dd HH:mm:ss".to_string(),
                "2023-07-15 12:30:45".to_string(),
            ]
        );
    }

    #[test]
    fn collapses_repeated_whitespace() {
        assert_eq!(
            parse_query("nc   --get-format  "),
            vec!["nc".to_string(), "--get-format".to_string()]
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_input() {
        assert_eq!(
            parse_query(r#"nc --set-format "dd/MM yyyy"#),
            vec![
                "nc".to_string(),
                "--set-format".to_string(),
                "dd/MM yyyy".to_string(),
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   ").is_empty());
    }
}

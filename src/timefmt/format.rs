use std::fmt;

use crate::error::FormatError;

/// Separator characters permitted between format tokens.
pub const SEPARATORS: &[char] = &['-', '/', ':', '.', ' '];

/// One fixed-width numeric field of a date format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatToken {
    Year4,
    Month2,
    Day2,
    Hour2,
    Minute2,
    Second2,
}

impl FormatToken {
    pub const ALL: [FormatToken; 6] = [
        FormatToken::Year4,
        FormatToken::Month2,
        FormatToken::Day2,
        FormatToken::Hour2,
        FormatToken::Minute2,
        FormatToken::Second2,
    ];

    /// The literal this token is written as in a format string.
    pub fn literal(self) -> &'static str {
        match self {
            FormatToken::Year4 => "yyyy",
            FormatToken::Month2 => "MM",
            FormatToken::Day2 => "dd",
            FormatToken::Hour2 => "HH",
            FormatToken::Minute2 => "mm",
            FormatToken::Second2 => "ss",
        }
    }

    /// Rendered width when formatting (zero-padded).
    pub fn width(self) -> usize {
        match self {
            FormatToken::Year4 => 4,
            _ => 2,
        }
    }
}

/// A token together with the separator literal that precedes it (empty for
/// the first token, at most one character otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatField {
    pub separator: Option<char>,
    pub token: FormatToken,
}

/// Compiled representation of a date-format string.
///
/// Immutable once parsed; the source string is retained verbatim so it can
/// be echoed back to the user (`--get-format`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    source: String,
    fields: Vec<FormatField>,
}

impl FormatSpec {
    /// Compile a format string.
    ///
    /// Valid strings are a concatenation of the six token literals with at
    /// most one separator character between adjacent tokens. Anything else,
    /// including the empty string, is rejected as a whole.
    pub fn parse(input: &str) -> Result<FormatSpec, FormatError> {
        if input.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut fields = Vec::new();
        let mut rest = input;

        while !rest.is_empty() {
            let separator = if fields.is_empty() {
                None
            } else {
                let c = rest.chars().next().unwrap();
                if SEPARATORS.contains(&c) {
                    rest = &rest[c.len_utf8()..];
                    Some(c)
                } else {
                    None
                }
            };

            let token = match_token(rest).ok_or_else(|| FormatError::UnknownToken {
                found: head_of(rest),
            })?;
            rest = &rest[token.literal().len()..];
            fields.push(FormatField { separator, token });
        }

        Ok(FormatSpec {
            source: input.to_string(),
            fields,
        })
    }

    /// The default display format shared by every new session.
    pub fn default_display() -> FormatSpec {
        FormatSpec::parse(super::codec::DEFAULT_FORMAT).expect("default format is valid")
    }

    pub fn fields(&self) -> &[FormatField] {
        &self.fields
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when every one of the six tokens appears in this format.
    pub fn is_complete(&self) -> bool {
        FormatToken::ALL
            .iter()
            .all(|t| self.fields.iter().any(|f| f.token == *t))
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_token(rest: &str) -> Option<FormatToken> {
    FormatToken::ALL
        .into_iter()
        .find(|t| rest.starts_with(t.literal()))
}

// First few characters of the offending input, for the error message.
fn head_of(rest: &str) -> String {
    rest.chars().take(4).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_format() {
        let spec = FormatSpec::parse("yyyy-MM-dd HH:mm:ss").unwrap();
        assert_eq!(spec.fields().len(), 6);
        assert_eq!(spec.as_str(), "yyyy-MM-dd HH:mm:ss");
        assert!(spec.is_complete());
        assert_eq!(spec.fields()[0].separator, None);
        assert_eq!(spec.fields()[0].token, FormatToken::Year4);
        assert_eq!(spec.fields()[3].separator, Some(' '));
        assert_eq!(spec.fields()[3].token, FormatToken::Hour2);
    }

    #[test]
    fn parses_all_separator_characters() {
        for sep in ['-', '/', ':', '.', ' '] {
            let input = format!("dd{sep}MM{sep}yyyy");
            let spec = FormatSpec::parse(&input).unwrap();
            assert_eq!(spec.fields()[1].separator, Some(sep));
        }
    }

    #[test]
    fn allows_consecutive_tokens() {
        let spec = FormatSpec::parse("yyyyMMdd").unwrap();
        assert_eq!(spec.fields().len(), 3);
        assert!(spec.fields().iter().all(|f| f.separator.is_none()));
    }

    #[test]
    fn allows_duplicate_tokens() {
        let spec = FormatSpec::parse("yyyy-yyyy").unwrap();
        assert_eq!(spec.fields().len(), 2);
        assert_eq!(spec.fields()[1].token, FormatToken::Year4);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(FormatSpec::parse(""), Err(FormatError::Empty));
    }

    #[test]
    fn rejects_unknown_substrings() {
        assert!(FormatSpec::parse("invalid-format").is_err());
        assert!(FormatSpec::parse("yyyy-MM-dd HH:mm:ss Z").is_err());
        assert!(FormatSpec::parse("YYYY-MM-dd").is_err());
    }

    #[test]
    fn rejects_misplaced_separators() {
        assert!(FormatSpec::parse("-yyyy").is_err());
        assert!(FormatSpec::parse("yyyy-").is_err());
        assert!(FormatSpec::parse("yyyy--MM").is_err());
    }

    #[test]
    fn default_display_matches_constant() {
        assert_eq!(
            FormatSpec::default_display().as_str(),
            crate::timefmt::DEFAULT_FORMAT
        );
    }
}

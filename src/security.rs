//! Security filtering for the command protocol.
//!
//! Classifies raw command text before it reaches the interpreter and escapes
//! response text for transports that render into markup.

use regex::Regex;

/// Outcome of classifying a raw command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Benign,
    Malicious,
}

/// Finer-grained result used by the interpreter: a command that fails the
/// shape check still gets its specific `Command not found:` / `Unknown
/// command:` reply, while a deny-list hit gets the fixed rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inspection {
    WellFormed,
    BadShape,
    DenyListHit,
}

// Pattern classes scanned against every whitespace part after the command
// name and subcommand; those first two parts are exempt.
const DENY_PATTERNS: &[&str] = &[
    r"(?i)<script\b[^>]*>",
    r"<[^>]+>",
    r"&[^;]+;",
    r"\|",
    r";|&&|\|\|",
    r"\b(wget|curl|scp|ftp)\b",
    r"\b(base64|eval|exec|system|passthru|shell_exec|popen|proc_open|pcntl_exec)\b",
];

/// Classifies raw command lines as benign or malicious.
///
/// Fail-closed: anything that is not `nc <known-subcommand> ...` is
/// malicious, and well-formed commands are still rejected when any later
/// argument matches a deny-list pattern. Never errors, never panics on input.
pub struct SecurityFilter {
    known_commands: Vec<&'static str>,
    deny_patterns: Vec<Regex>,
}

impl SecurityFilter {
    pub fn new(known_commands: &[&'static str]) -> SecurityFilter {
        let deny_patterns = DENY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("deny-list pattern compiles"))
            .collect();
        SecurityFilter {
            known_commands: known_commands.to_vec(),
            deny_patterns,
        }
    }

    /// Two-stage classification: shape check first, then the deny-list scan
    /// over arguments from position two onward.
    pub fn classify(&self, raw: &str) -> Classification {
        match self.inspect(raw) {
            Inspection::WellFormed => Classification::Benign,
            Inspection::BadShape | Inspection::DenyListHit => Classification::Malicious,
        }
    }

    pub fn inspect(&self, raw: &str) -> Inspection {
        let parts: Vec<&str> = raw.split_whitespace().collect();

        if parts.first() != Some(&"nc") {
            return Inspection::BadShape;
        }
        match parts.get(1) {
            Some(sub) if self.known_commands.iter().any(|c| c == sub) => {}
            _ => return Inspection::BadShape,
        }

        for part in &parts[2..] {
            if self.deny_patterns.iter().any(|re| re.is_match(part)) {
                return Inspection::DenyListHit;
            }
        }

        Inspection::WellFormed
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` to their named character references.
///
/// Callers must apply this exactly once per output path: an already-escaped
/// ampersand would be escaped again.
pub fn sanitize_output(output: &str) -> String {
    let mut escaped = String::with_capacity(output.len());
    for c in output.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

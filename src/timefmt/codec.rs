use chrono::{Datelike, Local, Timelike};

use crate::error::ParseError;
use crate::timefmt::format::{FormatSpec, FormatToken};

/// Canonical display format shared by new sessions and the HTTP API.
pub const DEFAULT_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Calendar-naive structured date/time value.
///
/// Month is 1-based on every boundary of this module; no 0-based
/// representation ever leaks to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Timestamp {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Timestamp {
        Timestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Current local wall-clock time.
    pub fn now() -> Timestamp {
        let now = Local::now().naive_local();
        Timestamp {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
        }
    }
}

/// Parse `text` against `spec`, mapping the i-th digit run of the text to the
/// i-th token occurrence of the format string.
///
/// Matching is deliberately lenient about separators: only the order of digit
/// runs matters, so `2023/07/15` parses fine against `yyyy-MM-dd`. When a
/// token occurs more than once, the last occurrence wins.
pub fn parse_date(text: &str, spec: &FormatSpec) -> Option<Timestamp> {
    try_parse_date(text, spec).ok()
}

/// Same as [`parse_date`] but with a diagnosable failure.
pub fn try_parse_date(text: &str, spec: &FormatSpec) -> Result<Timestamp, ParseError> {
    let runs = digit_runs(text);

    // Token occurrence -> digit-run index, later occurrences overwriting
    // earlier ones.
    let mut indices: [Option<usize>; 6] = [None; 6];
    for (i, field) in spec.fields().iter().enumerate() {
        indices[slot(field.token)] = Some(i);
    }

    let year = required(&runs, indices[slot(FormatToken::Year4)], "year")?;
    if year > i32::MAX as u32 {
        return Err(ParseError::OutOfRange {
            field: "year",
            value: year,
        });
    }
    let year = year as i32;
    let month = required(&runs, indices[slot(FormatToken::Month2)], "month")?;
    let day = required(&runs, indices[slot(FormatToken::Day2)], "day")?;
    let hour = optional(&runs, indices[slot(FormatToken::Hour2)], "hour")?;
    let minute = optional(&runs, indices[slot(FormatToken::Minute2)], "minute")?;
    let second = optional(&runs, indices[slot(FormatToken::Second2)], "second")?;

    check_range("month", month, 1, 12)?;
    check_range("day", day, 1, 31)?;
    check_range("hour", hour, 0, 23)?;
    check_range("minute", minute, 0, 59)?;
    check_range("second", second, 0, 59)?;

    Ok(Timestamp {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Render `timestamp` against `spec`. Total for any valid input: every token
/// is zero-padded to its fixed width and separators are emitted verbatim.
pub fn format_date(timestamp: &Timestamp, spec: &FormatSpec) -> String {
    let mut out = String::with_capacity(spec.as_str().len());
    for field in spec.fields() {
        if let Some(sep) = field.separator {
            out.push(sep);
        }
        let value = match field.token {
            FormatToken::Year4 => timestamp.year as i64,
            FormatToken::Month2 => timestamp.month as i64,
            FormatToken::Day2 => timestamp.day as i64,
            FormatToken::Hour2 => timestamp.hour as i64,
            FormatToken::Minute2 => timestamp.minute as i64,
            FormatToken::Second2 => timestamp.second as i64,
        };
        match field.token.width() {
            4 => out.push_str(&format!("{:04}", value)),
            _ => out.push_str(&format!("{:02}", value)),
        }
    }
    out
}

/// Re-express `text` from one format in another. `None` on any failure,
/// including invalid format strings.
pub fn convert_date_format(text: &str, from: &str, to: &str) -> Option<String> {
    let from_spec = FormatSpec::parse(from).ok()?;
    let to_spec = FormatSpec::parse(to).ok()?;
    let timestamp = parse_date(text, &from_spec)?;
    Some(format_date(&timestamp, &to_spec))
}

fn slot(token: FormatToken) -> usize {
    match token {
        FormatToken::Year4 => 0,
        FormatToken::Month2 => 1,
        FormatToken::Day2 => 2,
        FormatToken::Hour2 => 3,
        FormatToken::Minute2 => 4,
        FormatToken::Second2 => 5,
    }
}

fn digit_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            runs.push(&text[start..i]);
        } else {
            i += 1;
        }
    }
    runs
}

fn run_value(runs: &[&str], index: usize, field: &'static str) -> Result<u32, ParseError> {
    let run = runs.get(index).ok_or(ParseError::NotEnoughDigitRuns)?;
    run.parse::<u32>().map_err(|_| ParseError::Overflow {
        field,
        run: run.to_string(),
    })
}

fn required(
    runs: &[&str],
    index: Option<usize>,
    field: &'static str,
) -> Result<u32, ParseError> {
    let index = index.ok_or(ParseError::MissingField { field })?;
    run_value(runs, index, field)
}

// Hour/minute/second default to zero when the format omits them, but a
// declared occurrence still needs a matching digit run.
fn optional(
    runs: &[&str],
    index: Option<usize>,
    field: &'static str,
) -> Result<u32, ParseError> {
    match index {
        Some(index) => run_value(runs, index, field),
        None => Ok(0),
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), ParseError> {
    if value < min || value > max {
        return Err(ParseError::OutOfRange { field, value });
    }
    Ok(())
}

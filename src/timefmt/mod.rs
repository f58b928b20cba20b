//! Date-format mini-language: format-string compilation and the codec that
//! parses/formats timestamps against compiled specs.

pub mod codec;
pub mod format;

pub use codec::{convert_date_format, format_date, parse_date, Timestamp, DEFAULT_FORMAT};
pub use format::{FormatSpec, FormatToken};

//! Command interpreter: per-session state, the static command registry, and
//! dispatch of the `nc` command set.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use tracing::warn;

use crate::error::CollaboratorError;
use crate::observability::metrics::{
    METRIC_COMMANDS_REJECTED_TOTAL, METRIC_COMMANDS_TOTAL, METRIC_COMMAND_LATENCY,
};
use crate::parse_query::parse_query;
use crate::security::{Inspection, SecurityFilter};
use crate::system::{ClockSink, TimeSetter, TimeSource};
use crate::timefmt::{format_date, parse_date, FormatSpec, Timestamp};

/// Reply for commands rejected by the deny-list scan.
pub const DANGEROUS_COMMAND_MSG: &str = "Invalid or potentially dangerous command detected.";

const HELP_TEXT: &str = "\
Usage:

nc --help                     : Show this help message
nc --set-time [format] [date] : Set the date and time
nc --set-format [format]      : Set the date format
nc --get-format               : Get the current date format
nc --get-time                 : Get the current date";

/// The fixed command set. Built once; there is no runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    SetTime,
    SetFormat,
    GetFormat,
    GetTime,
}

/// Registry entries, name -> handler tag. Names are unique.
pub const COMMANDS: [(&str, CommandKind); 5] = [
    ("--help", CommandKind::Help),
    ("--set-time", CommandKind::SetTime),
    ("--set-format", CommandKind::SetFormat),
    ("--get-format", CommandKind::GetFormat),
    ("--get-time", CommandKind::GetTime),
];

/// Command names only, in registry order. Shared with the security filter.
pub const COMMAND_NAMES: [&str; 5] = [
    "--help",
    "--set-time",
    "--set-format",
    "--get-format",
    "--get-time",
];

impl CommandKind {
    pub fn lookup(name: &str) -> Option<CommandKind> {
        COMMANDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Help => "Usage: nc --help",
            CommandKind::SetTime => "Usage: nc --set-time [format] [date]",
            CommandKind::SetFormat => "Usage: nc --set-format [format]",
            CommandKind::GetFormat => "Usage: nc --get-format",
            CommandKind::GetTime => "Usage: nc --get-time",
        }
    }
}

/// Per-connection mutable state. One session per transport connection,
/// never shared, discarded on disconnect.
#[derive(Debug, Clone)]
pub struct Session {
    pub current_timestamp: Timestamp,
    pub display_format: FormatSpec,
}

impl Session {
    /// Fresh session starting at the current wall-clock time with the
    /// default display format.
    pub fn new() -> Session {
        Session::with_timestamp(Timestamp::now())
    }

    pub fn with_timestamp(current_timestamp: Timestamp) -> Session {
        Session {
            current_timestamp,
            display_format: FormatSpec::default_display(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

struct LatencyGuard {
    start: std::time::Instant,
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        histogram!(METRIC_COMMAND_LATENCY).record(self.start.elapsed().as_secs_f64());
    }
}

/// Interprets command lines against a session.
///
/// Holds only the security filter and the injected collaborators; all
/// per-connection state lives in the `Session` passed to [`handle`], so one
/// interpreter serves any number of concurrent sessions.
///
/// [`handle`]: Interpreter::handle
pub struct Interpreter {
    filter: SecurityFilter,
    clock_sink: Arc<dyn ClockSink>,
    time_source: Arc<dyn TimeSource>,
    time_setter: Option<Arc<dyn TimeSetter>>,
    collaborator_timeout: Duration,
}

impl Interpreter {
    pub fn new(
        clock_sink: Arc<dyn ClockSink>,
        time_source: Arc<dyn TimeSource>,
        time_setter: Option<Arc<dyn TimeSetter>>,
        collaborator_timeout: Duration,
    ) -> Interpreter {
        Interpreter {
            filter: SecurityFilter::new(&COMMAND_NAMES),
            clock_sink,
            time_source,
            time_setter,
            collaborator_timeout,
        }
    }

    pub fn filter(&self) -> &SecurityFilter {
        &self.filter
    }

    /// Process one command line and return the reply text.
    ///
    /// Never panics past this boundary: every failure becomes a plain-text
    /// message for the client.
    pub async fn handle(&self, raw: &str, session: &mut Session) -> String {
        counter!(METRIC_COMMANDS_TOTAL).increment(1);
        let _guard = LatencyGuard {
            start: std::time::Instant::now(),
        };

        if self.filter.inspect(raw) == Inspection::DenyListHit {
            counter!(METRIC_COMMANDS_REJECTED_TOTAL).increment(1);
            return DANGEROUS_COMMAND_MSG.to_string();
        }

        let tokens = parse_query(raw);
        let first = tokens.first().map(String::as_str).unwrap_or("");
        if first != "nc" {
            return format!("Command not found: {first}");
        }

        let name = tokens.get(1).map(String::as_str).unwrap_or("");
        let Some(kind) = CommandKind::lookup(name) else {
            return format!("Unknown command: {name}");
        };

        let args = &tokens[2..];
        match kind {
            CommandKind::Help => self.help(args),
            CommandKind::SetTime => self.set_time(args, session).await,
            CommandKind::SetFormat => self.set_format(args, session),
            CommandKind::GetFormat => self.get_format(args, session),
            CommandKind::GetTime => self.get_time(args, session).await,
        }
    }

    fn help(&self, args: &[String]) -> String {
        if !args.is_empty() {
            return CommandKind::Help.usage().to_string();
        }
        HELP_TEXT.to_string()
    }

    async fn set_time(&self, args: &[String], session: &mut Session) -> String {
        if args.len() != 2 {
            return CommandKind::SetTime.usage().to_string();
        }

        let spec = match FormatSpec::parse(&args[0]) {
            Ok(spec) => spec,
            Err(_) => return "Error: Invalid date format".to_string(),
        };
        let Some(timestamp) = parse_date(&args[1], &spec) else {
            return "Error: Invalid date format or date value".to_string();
        };

        // Apply to the host clock first; the session is only updated once
        // the capability reports success.
        if let Some(setter) = &self.time_setter {
            let formatted = format_date(&timestamp, &FormatSpec::default_display());
            let applied = tokio::time::timeout(self.collaborator_timeout, setter.apply(&formatted))
                .await
                .unwrap_or(Err(CollaboratorError::Timeout(self.collaborator_timeout)));
            if let Err(e) = applied {
                return format!("Error: {e}");
            }
        }

        session.current_timestamp = timestamp;
        self.refresh_clock(&timestamp).await;

        format!(
            "Date set to: {}",
            format_date(&session.current_timestamp, &session.display_format)
        )
    }

    fn set_format(&self, args: &[String], session: &mut Session) -> String {
        if args.len() != 1 {
            return CommandKind::SetFormat.usage().to_string();
        }
        match FormatSpec::parse(&args[0]) {
            Ok(spec) => {
                session.display_format = spec;
                format!("Date format set to: {}", session.display_format)
            }
            Err(_) => "Error: Invalid date format".to_string(),
        }
    }

    fn get_format(&self, args: &[String], session: &Session) -> String {
        if !args.is_empty() {
            return CommandKind::GetFormat.usage().to_string();
        }
        format!("Current date format: {}", session.display_format)
    }

    async fn get_time(&self, args: &[String], session: &mut Session) -> String {
        if !args.is_empty() {
            return CommandKind::GetTime.usage().to_string();
        }

        match tokio::time::timeout(self.collaborator_timeout, self.time_source.now()).await {
            Ok(Ok(timestamp)) => {
                session.current_timestamp = timestamp;
                self.refresh_clock(&timestamp).await;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "authoritative time source failed, using session time");
            }
            Err(_) => {
                warn!("authoritative time source timed out, using session time");
            }
        }

        format!(
            "Current date: {}",
            format_date(&session.current_timestamp, &session.display_format)
        )
    }

    // Display refresh is best-effort; a broken sink must not fail the command.
    async fn refresh_clock(&self, timestamp: &Timestamp) {
        match tokio::time::timeout(self.collaborator_timeout, self.clock_sink.update(timestamp))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "clock display sink failed"),
            Err(_) => warn!("clock display sink timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::CollaboratorError;
    use crate::timefmt::DEFAULT_FORMAT;

    struct NullSink;

    #[async_trait]
    impl ClockSink for NullSink {
        async fn update(&self, _timestamp: &Timestamp) -> Result<(), CollaboratorError> {
            Ok(())
        }
    }

    struct FixedSource(Timestamp);

    #[async_trait]
    impl TimeSource for FixedSource {
        async fn now(&self) -> Result<Timestamp, CollaboratorError> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TimeSource for FailingSource {
        async fn now(&self) -> Result<Timestamp, CollaboratorError> {
            Err(CollaboratorError::Failed("unreachable".to_string()))
        }
    }

    struct RecordingSetter {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TimeSetter for RecordingSetter {
        async fn apply(&self, _formatted: &str) -> Result<(), CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSetter;

    #[async_trait]
    impl TimeSetter for FailingSetter {
        async fn apply(&self, _formatted: &str) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::Failed("permission denied".to_string()))
        }
    }

    fn interpreter_with(
        source: Arc<dyn TimeSource>,
        setter: Option<Arc<dyn TimeSetter>>,
    ) -> Interpreter {
        Interpreter::new(Arc::new(NullSink), source, setter, Duration::from_secs(1))
    }

    fn interpreter() -> Interpreter {
        interpreter_with(
            Arc::new(FixedSource(Timestamp::new(2024, 1, 2, 3, 4, 5))),
            None,
        )
    }

    fn session() -> Session {
        Session::with_timestamp(Timestamp::new(2020, 6, 1, 10, 20, 30))
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let reply = interpreter().handle("nc --help", &mut session()).await;
        assert!(reply.contains("Usage:"));
        for (name, _) in COMMANDS {
            assert!(reply.contains(name), "help is missing {name}");
        }
    }

    #[tokio::test]
    async fn set_time_updates_the_session() {
        let mut s = session();
        let reply = interpreter()
            .handle(
                r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "2023-07-15 12:30:45""#,
                &mut s,
            )
            .await;
        assert_eq!(reply, "Date set to: 2023-07-15 12:30:45");
        assert_eq!(s.current_timestamp, Timestamp::new(2023, 7, 15, 12, 30, 45));
    }

    #[tokio::test]
    async fn set_time_reports_invalid_format() {
        let reply = interpreter()
            .handle(r#"nc --set-time "bogus" "2023-07-15 12:30:45""#, &mut session())
            .await;
        assert_eq!(reply, "Error: Invalid date format");
    }

    #[tokio::test]
    async fn set_time_reports_invalid_date() {
        let reply = interpreter()
            .handle(
                r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "invalid-date""#,
                &mut session(),
            )
            .await;
        assert_eq!(reply, "Error: Invalid date format or date value");
    }

    #[tokio::test]
    async fn set_time_invokes_the_configured_setter() {
        let setter = Arc::new(RecordingSetter {
            calls: AtomicU32::new(0),
        });
        let interp = interpreter_with(
            Arc::new(FixedSource(Timestamp::new(2024, 1, 2, 3, 4, 5))),
            Some(setter.clone()),
        );
        let reply = interp
            .handle(
                r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "2023-07-15 12:30:45""#,
                &mut session(),
            )
            .await;
        assert_eq!(reply, "Date set to: 2023-07-15 12:30:45");
        assert_eq!(setter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn setter_failure_leaves_the_session_unchanged() {
        let interp = interpreter_with(
            Arc::new(FixedSource(Timestamp::new(2024, 1, 2, 3, 4, 5))),
            Some(Arc::new(FailingSetter)),
        );
        let mut s = session();
        let before = s.current_timestamp;
        let reply = interp
            .handle(
                r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "2023-07-15 12:30:45""#,
                &mut s,
            )
            .await;
        assert_eq!(reply, "Error: permission denied");
        assert_eq!(s.current_timestamp, before);
    }

    #[tokio::test]
    async fn set_format_round_trips_through_get_format() {
        let interp = interpreter();
        let mut s = session();
        let reply = interp
            .handle(r#"nc --set-format "dd/MM/yyyy HH:mm:ss""#, &mut s)
            .await;
        assert_eq!(reply, "Date format set to: dd/MM/yyyy HH:mm:ss");
        let reply = interp.handle("nc --get-format", &mut s).await;
        assert_eq!(reply, "Current date format: dd/MM/yyyy HH:mm:ss");
    }

    #[tokio::test]
    async fn set_format_rejects_invalid_format() {
        let reply = interpreter()
            .handle(r#"nc --set-format "invalid-format""#, &mut session())
            .await;
        assert_eq!(reply, "Error: Invalid date format");
    }

    #[tokio::test]
    async fn get_format_defaults_to_the_canonical_format() {
        let reply = interpreter().handle("nc --get-format", &mut session()).await;
        assert_eq!(reply, format!("Current date format: {DEFAULT_FORMAT}"));
    }

    #[tokio::test]
    async fn get_time_prefers_the_authoritative_source() {
        let mut s = session();
        let reply = interpreter().handle("nc --get-time", &mut s).await;
        assert_eq!(reply, "Current date: 2024-01-02 03:04:05");
        assert_eq!(s.current_timestamp, Timestamp::new(2024, 1, 2, 3, 4, 5));
    }

    #[tokio::test]
    async fn get_time_falls_back_to_the_session_clock() {
        let interp = interpreter_with(Arc::new(FailingSource), None);
        let mut s = session();
        let reply = interp.handle("nc --get-time", &mut s).await;
        assert_eq!(reply, "Current date: 2020-06-01 10:20:30");
    }

    #[tokio::test]
    async fn get_time_formats_with_the_session_display_format() {
        let interp = interpreter();
        let mut s = session();
        interp
            .handle(r#"nc --set-format "dd/MM/yyyy""#, &mut s)
            .await;
        let reply = interp.handle("nc --get-time", &mut s).await;
        assert_eq!(reply, "Current date: 02/01/2024");
    }

    #[tokio::test]
    async fn unknown_subcommand_is_reported() {
        let reply = interpreter()
            .handle("nc --unknown-command", &mut session())
            .await;
        assert_eq!(reply, "Unknown command: --unknown-command");
    }

    #[tokio::test]
    async fn non_nc_command_is_not_found() {
        let reply = interpreter().handle("unknown-command", &mut session()).await;
        assert_eq!(reply, "Command not found: unknown-command");
    }

    #[tokio::test]
    async fn dangerous_command_gets_the_fixed_reply() {
        let reply = interpreter()
            .handle(
                r#"nc --set-time "yyyy-MM-dd HH:mm:ss" "2023-07-15 12:30:45" ; rm -rf /"#,
                &mut session(),
            )
            .await;
        assert_eq!(reply, DANGEROUS_COMMAND_MSG);
    }

    #[tokio::test]
    async fn wrong_arity_returns_the_usage_line() {
        let interp = interpreter();
        let mut s = session();
        assert_eq!(
            interp.handle("nc --set-time only-one", &mut s).await,
            "Usage: nc --set-time [format] [date]"
        );
        assert_eq!(
            interp.handle("nc --set-format", &mut s).await,
            "Usage: nc --set-format [format]"
        );
        assert_eq!(
            interp.handle("nc --get-format extra", &mut s).await,
            "Usage: nc --get-format"
        );
        assert_eq!(
            interp.handle("nc --get-time extra", &mut s).await,
            "Usage: nc --get-time"
        );
    }
}

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CollaboratorError;

use super::TimeSetter;

/// Applies a new system time by running a host-provided shell script with
/// the formatted time as its single argument.
///
/// The script owns all privilege and platform detail; this type only
/// launches `[sudo -u <user>] sh <script> <time>` and reports the outcome.
pub struct ScriptTimeSetter {
    script_path: PathBuf,
    run_as_user: Option<String>,
}

impl ScriptTimeSetter {
    pub fn new(script_path: impl Into<PathBuf>, run_as_user: Option<String>) -> ScriptTimeSetter {
        ScriptTimeSetter {
            script_path: script_path.into(),
            run_as_user,
        }
    }
}

#[async_trait]
impl TimeSetter for ScriptTimeSetter {
    async fn apply(&self, formatted: &str) -> Result<(), CollaboratorError> {
        let mut command = match &self.run_as_user {
            Some(user) => {
                let mut c = Command::new("sudo");
                c.arg("-u").arg(user).arg("sh");
                c
            }
            None => Command::new("sh"),
        };
        command
            .arg(&self.script_path)
            .arg(formatted)
            .stdin(Stdio::null());

        let output = command.output().await?;
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim();

        if !output.status.success() {
            return Err(CollaboratorError::Failed(format!(
                "time script exited with {}: {}",
                output.status, text
            )));
        }

        debug!(script = %self.script_path.display(), output = text, "system time applied");
        Ok(())
    }
}

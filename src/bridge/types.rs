use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timestamp type
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Captured result of one successful bridge invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Full argument vector, executable path first
    pub command: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub execution_time: Duration,
    pub completed_at: Timestamp,
}

impl InvocationResult {
    /// Check whether the child reported success
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Arguments after the executable path
    pub fn arguments(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    /// Space-joined command line, for display only
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

use thiserror::Error;
use std::io;

/// Result type for device bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while building or running a bridge command
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The command could not be turned into an argument vector
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The bridge process could not be started or exited unsuccessfully
    #[error("Process execution failed ({}): {}", describe_exit(.exit_code, .source), .command.join(" "))]
    ProcessExecution {
        command: Vec<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_exit(exit_code: &Option<i32>, source: &Option<io::Error>) -> String {
    match (exit_code, source) {
        (Some(code), _) => format!("exit code {}", code),
        (None, Some(_)) => "failed to launch".to_string(),
        (None, None) => "terminated by signal".to_string(),
    }
}

impl BridgeError {
    /// Create a new invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Create a new configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Error for a child that ran to completion with a failing status
    pub fn process_failed(
        command: Vec<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self::ProcessExecution {
            command,
            exit_code,
            stdout,
            stderr,
            source: None,
        }
    }

    /// Error for a child that never started
    pub fn launch_failed(command: Vec<String>, source: io::Error) -> Self {
        Self::ProcessExecution {
            command,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            source: Some(source),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_process_execution(&self) -> bool {
        matches!(self, Self::ProcessExecution { .. })
    }

    /// Exit code of the failed child, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessExecution { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Captured standard output of the failed child
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::ProcessExecution { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Captured standard error of the failed child
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ProcessExecution { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BridgeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_process_failure_display() {
        let err = BridgeError::process_failed(
            vec!["adb".to_string(), "devices".to_string()],
            Some(1),
            String::new(),
            "error: no devices".to_string(),
        );
        assert_eq!(err.to_string(), "Process execution failed (exit code 1): adb devices");
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.stderr(), Some("error: no devices"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_launch_failure_keeps_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = BridgeError::launch_failed(vec!["/missing/adb".to_string()], io_err);

        assert!(err.is_process_execution());
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("failed to launch"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_signal_termination_display() {
        let err = BridgeError::process_failed(vec!["adb".to_string()], None, String::new(), String::new());
        assert!(err.to_string().contains("terminated by signal"));
    }
}

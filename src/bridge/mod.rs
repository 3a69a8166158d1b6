// Device bridge module
//
// This module locates the vendored device-bridge executable for the host platform
// and runs commands against it, optionally scoped to a selected device.

pub mod error;
pub mod types;
pub mod platform;
pub mod tokenize;
pub mod command;
pub mod executor;
pub mod runner;
pub mod config;

// Re-export main types
pub use error::{BridgeError, BridgeResult};
pub use types::InvocationResult;
pub use platform::{HostPlatform, resolve_executable_path, default_tools_dir};
pub use tokenize::split_words;
pub use command::{BridgeCommand, SHELL_PREFIX};
pub use executor::{ProcessExecutor, ProcessOutput, SystemExecutor};
pub use runner::CommandRunner;
pub use config::RunnerConfig;

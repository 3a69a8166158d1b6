// Command runner for the vendored device-bridge executable

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::bridge::{
    command::BridgeCommand,
    config::RunnerConfig,
    error::{BridgeError, BridgeResult},
    executor::{ProcessExecutor, SystemExecutor},
    platform::{HostPlatform, default_tools_dir, resolve_executable_path},
    types::InvocationResult,
};

/// Flag the bridge uses to pick one of several attached devices
pub const DEVICE_FLAG: &str = "-s";

/// Runs commands against one resolved bridge executable.
///
/// The selected device is held here rather than globally; every call reads the
/// value current at that moment.
pub struct CommandRunner {
    executable: PathBuf,
    platform: HostPlatform,
    /// Word-splitting rules for free-form lines; always the host's unless overridden
    quoting: HostPlatform,
    device: Option<String>,
    executor: Arc<dyn ProcessExecutor>,
}

impl CommandRunner {
    /// Runner for the host platform using the default tools directory
    pub fn new() -> Self {
        Self::with_tools_dir(default_tools_dir())
    }

    /// Runner for the host platform beneath `tools_dir`
    pub fn with_tools_dir(tools_dir: impl AsRef<Path>) -> Self {
        Self::for_platform(tools_dir, HostPlatform::current())
    }

    /// Runner for an explicit platform tag beneath `tools_dir`
    pub fn for_platform(tools_dir: impl AsRef<Path>, platform: HostPlatform) -> Self {
        let executable = resolve_executable_path(tools_dir.as_ref(), platform);
        Self::with_executable(executable, platform)
    }

    /// Runner for an executable path chosen by the caller
    pub fn with_executable(executable: impl Into<PathBuf>, platform: HostPlatform) -> Self {
        Self {
            executable: executable.into(),
            platform,
            quoting: HostPlatform::current(),
            device: None,
            executor: Arc::new(SystemExecutor::new()),
        }
    }

    /// Build a runner from merged configuration
    pub fn from_config(config: &RunnerConfig) -> BridgeResult<Self> {
        if let Err(errors) = config.validate() {
            return Err(BridgeError::config(errors.join("; ")));
        }

        let platform = config.host_platform();
        let mut runner = Self::with_executable(config.resolve_executable(), platform);
        runner.set_device(config.device.as_deref());
        Ok(runner)
    }

    /// Replace the process executor
    pub fn with_executor(mut self, executor: Arc<dyn ProcessExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Split free-form lines with another platform's quoting rules
    pub fn with_quoting_rules(mut self, platform: HostPlatform) -> Self {
        self.quoting = platform;
        self
    }

    /// Select a device up front
    pub fn with_device(mut self, serial: impl Into<String>) -> Self {
        let serial = serial.into();
        self.set_device(Some(serial.as_str()));
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Platform the executable was resolved for
    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Platform whose rules split free-form lines
    pub fn quoting_rules(&self) -> HostPlatform {
        self.quoting
    }

    /// Currently selected device serial
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Select the device targeted by subsequent commands; `None` or `""` clears
    /// the selection
    pub fn set_device(&mut self, serial: Option<&str>) {
        self.device = serial.filter(|s| !s.is_empty()).map(str::to_string);
    }

    /// Argument vector `execute` would run for `command`
    pub fn build_argv(&self, command: &BridgeCommand) -> BridgeResult<Vec<String>> {
        let tokens = command.to_tokens(self.quoting)?;

        let mut argv = Vec::with_capacity(tokens.len() + 3);
        argv.push(self.executable.to_string_lossy().into_owned());
        if let Some(ref serial) = self.device {
            log::debug!("Using device: {}", serial);
            argv.push(DEVICE_FLAG.to_string());
            argv.push(serial.clone());
        }
        argv.extend(tokens);
        Ok(argv)
    }

    /// Run a command and capture its output.
    ///
    /// Strings starting with `"shell "` are forwarded to the device shell as one
    /// token; other strings are split with the host platform's quoting rules.
    pub fn execute(&self, command: impl Into<BridgeCommand>) -> BridgeResult<InvocationResult> {
        let command = command.into();
        let argv = self.build_argv(&command)?;
        self.run(argv)
    }

    /// Run explicit argument tokens without any splitting
    pub fn execute_args<I, S>(&self, tokens: I) -> BridgeResult<InvocationResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(BridgeCommand::args(tokens))
    }

    /// Run `shell <remainder>` with the remainder left for the device shell
    pub fn execute_shell_passthrough(&self, remainder: &str) -> BridgeResult<InvocationResult> {
        self.execute(BridgeCommand::shell(remainder))
    }

    /// Run a free-form line, recognising the `"shell "` prefix
    pub fn execute_line(&self, line: &str) -> BridgeResult<InvocationResult> {
        self.execute(BridgeCommand::parse(line))
    }

    /// Run a command given as untyped data (string or array of strings)
    pub fn execute_value(&self, value: Value) -> BridgeResult<InvocationResult> {
        let command = BridgeCommand::try_from(value)?;
        self.execute(command)
    }

    fn run(&self, argv: Vec<String>) -> BridgeResult<InvocationResult> {
        let start = Instant::now();

        let output = match self.executor.run(&argv) {
            Ok(output) => output,
            Err(e) => {
                log::debug!("cmd={:?}\nlaunch error={}", argv, e);
                return Err(BridgeError::launch_failed(argv, e));
            }
        };

        log::debug!("cmd={:?}\nstdout={:?}\nstderr={:?}", argv, output.stdout, output.stderr);

        match output.exit_code {
            Some(0) => Ok(InvocationResult {
                command: argv,
                exit_code: 0,
                stdout: output.stdout,
                stderr: output.stderr,
                execution_time: start.elapsed(),
                completed_at: chrono::Utc::now(),
            }),
            code => Err(BridgeError::process_failed(argv, code, output.stdout, output.stderr)),
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("executable", &self.executable)
            .field("platform", &self.platform)
            .field("quoting", &self.quoting)
            .field("device", &self.device)
            .field("executor", &self.executor.name())
            .finish()
    }
}

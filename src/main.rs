use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use platform_tools::{BridgeCommand, BridgeError, CommandRunner, RunnerConfig};

struct CliArgs {
    serial: Option<String>,
    config: Option<PathBuf>,
    dry_run: bool,
    verbose: bool,
    command: Vec<String>,
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args)? {
        Some(cli) => cli,
        None => {
            print_help();
            return Ok(());
        }
    };

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match cli.config {
        Some(ref path) => RunnerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RunnerConfig::default(),
    };
    config = config.apply_env();
    if cli.serial.is_some() {
        config.device = cli.serial.clone();
    }

    let runner = CommandRunner::from_config(&config).context("Invalid configuration")?;
    log::debug!("Resolved bridge executable: {}", runner.executable().display());

    let command = match cli.command.as_slice() {
        [line] => BridgeCommand::parse(line),
        tokens => BridgeCommand::args(tokens.iter().cloned()),
    };

    if cli.dry_run {
        let argv = runner.build_argv(&command)?;
        println!("{}", serde_json::to_string(&argv)?);
        return Ok(());
    }

    match runner.execute(command) {
        Ok(result) => {
            emit_output(&result.stdout, &result.stderr)?;
            Ok(())
        }
        Err(BridgeError::ProcessExecution { exit_code: Some(code), stdout, stderr, .. }) => {
            emit_output(&stdout, &stderr)?;
            std::process::exit(code);
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns `None` when help was requested
fn parse_args(args: &[String]) -> Result<Option<CliArgs>> {
    let mut cli = CliArgs {
        serial: None,
        config: None,
        dry_run: false,
        verbose: false,
        command: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--serial" => {
                let serial = iter.next().context("-s requires a device serial")?;
                cli.serial = Some(serial.clone());
            }
            "--config" => {
                let path = iter.next().context("--config requires a file path")?;
                cli.config = Some(PathBuf::from(path));
            }
            "--dry-run" => cli.dry_run = true,
            "-v" | "--verbose" => cli.verbose = true,
            "--" => {
                cli.command.extend(iter.by_ref().cloned());
            }
            _ => {
                cli.command.push(arg.clone());
                cli.command.extend(iter.by_ref().cloned());
            }
        }
    }

    if cli.command.is_empty() {
        return Ok(None);
    }
    Ok(Some(cli))
}

fn emit_output(stdout: &str, stderr: &str) -> Result<()> {
    emit(&mut io::stdout().lock(), &mut io::stderr().lock(), stdout, stderr)
        .context("Failed to write command output")
}

fn emit(out: &mut impl Write, err: &mut impl Write, stdout: &str, stderr: &str) -> io::Result<()> {
    out.write_all(stdout.as_bytes())?;
    out.flush()?;
    err.write_all(stderr.as_bytes())?;
    err.flush()
}

fn print_help() {
    println!("platform-tools - run the vendored device bridge");
    println!();
    println!("USAGE:");
    println!("    platform-tools [-s SERIAL] [--config FILE] [--dry-run] [-v] [--] <command>...");
    println!();
    println!("A single quoted argument is split like a shell line; \"shell ...\" is");
    println!("forwarded to the device shell unsplit. Several arguments are passed as-is.");
    println!();
    println!("ENVIRONMENT:");
    println!("    PLATFORM_TOOLS_DIR    directory holding win32/, darwin/, linux/");
    println!("    PLATFORM_TOOLS_ADB    explicit bridge executable");
    println!("    ANDROID_SERIAL        device to target");
    println!();
    println!("SAMPLE CONFIG:");
    println!("{}", RunnerConfig::generate_sample_config());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_then_command() {
        let cli = parse_args(&strings(&["-s", "emu", "--dry-run", "shell ls -l"])).unwrap().unwrap();
        assert_eq!(cli.serial.as_deref(), Some("emu"));
        assert!(cli.dry_run);
        assert_eq!(cli.command, vec!["shell ls -l"]);
    }

    #[test]
    fn test_flags_after_command_belong_to_command() {
        let cli = parse_args(&strings(&["install", "-r", "-s", "x.apk"])).unwrap().unwrap();
        assert_eq!(cli.serial, None);
        assert_eq!(cli.command, vec!["install", "-r", "-s", "x.apk"]);
    }

    #[test]
    fn test_double_dash() {
        let cli = parse_args(&strings(&["--", "--help"])).unwrap().unwrap();
        assert_eq!(cli.command, vec!["--help"]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_emit_writes_both_streams() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        emit(&mut out, &mut err, "device\n", "warning\n").unwrap();
        assert_eq!(out, b"device\n");
        assert_eq!(err, b"warning\n");
    }

    #[test]
    fn test_emit_reports_write_failure() {
        let mut err = Vec::new();
        let result = emit(&mut BrokenPipe, &mut err, "device\n", "");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_help_and_missing_values() {
        assert!(parse_args(&strings(&["--help"])).unwrap().is_none());
        assert!(parse_args(&[]).unwrap().is_none());
        assert!(parse_args(&strings(&["-s"])).is_err());
    }
}

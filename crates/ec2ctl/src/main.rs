// # ec2ctl - start, stop and inspect one EC2 instance
//
// This binary is a thin integration layer:
// 1. Parse the command line
// 2. Initialize logging and a single-threaded runtime
// 3. Hand the configuration path, command and provider constructor to
//    `ec2ctl_core::run_from_file`
// 4. Print the outcome and exit with its status
//
// ## Usage
//
// ```bash
// ec2ctl -ini EC2Commands.json -cmd start
// ec2ctl --cmd status
// EC2CTL_MODE=dry-run ec2ctl -cmd start   # log the DNS change, do not submit it
// ```
//
// ## Exit Codes
//
// - 0: Success (including nothing to do)
// - 1: Configuration or command-line error
// - 2: Provider error
// - 3: DNS update failed after a successful start
// - 4: Timed out waiting for the instance

use anyhow::{Context, Result};
use clap::Parser;
use ec2ctl_core::config::DEFAULT_CONFIG_FILE;
use ec2ctl_core::{Command, CommandSettings, ExitStatus, Outcome, Providers};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// Long flags that may also be written with a single dash (`-ini file`)
const SINGLE_DASH_FLAGS: &[&str] = &["ini", "cmd", "log-level"];

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with EC2InstanceID and DomainZoneID
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    ini: PathBuf,

    /// Command to run: status, start or stop
    #[arg(long, default_value = "status", value_parser = parse_command)]
    cmd: Command,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "EC2CTL_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: Level,
}

fn parse_command(s: &str) -> std::result::Result<Command, String> {
    s.parse::<Command>().map_err(|e| e.to_string())
}

fn parse_level(s: &str) -> std::result::Result<Level, String> {
    match s.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "'{}' is not valid. Valid levels: trace, debug, info, warn, error",
            s
        )),
    }
}

/// Rewrite `-ini`, `-cmd=start` and friends into their `--` form
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if is_single_dash_long_flag(s) => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or_default();
    SINGLE_DASH_FLAGS.contains(&name)
}

fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

#[cfg(feature = "aws")]
async fn connect(settings: CommandSettings) -> ec2ctl_core::Result<Providers> {
    ec2ctl_provider_aws::connect(settings).await
}

#[cfg(not(feature = "aws"))]
async fn connect(_settings: CommandSettings) -> ec2ctl_core::Result<Providers> {
    Err(ec2ctl_core::Error::config(
        "ec2ctl was built without a provider, enable the `aws` feature",
    ))
}

async fn run(args: &Args) -> ec2ctl_core::Result<Outcome> {
    info!("Running {} with {}", args.cmd, args.ini.display());
    ec2ctl_core::run_from_file(&args.ini, args.cmd, CommandSettings::default(), connect).await
}

fn main() -> ExitCode {
    let args = match Args::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitStatus::ConfigError.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    if let Err(e) = init_tracing(args.log_level) {
        eprintln!("{:#}", e);
        return ExitStatus::ConfigError.into();
    }

    let rt = match build_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitStatus::ProviderError.into();
        }
    };

    match rt.block_on(run(&args)) {
        Ok(outcome) => {
            println!("{}", outcome);
            outcome.exit_status().into()
        }
        Err(e) => {
            let status = ExitStatus::from_error(&e);
            debug!("Command failed with exit status {:?}: {:?}", status, e);
            eprintln!("{}", e);
            status.into()
        }
    }
}

//! ffbsim - interactive force-feedback effect tester
//!
//! Opens a steering wheel, registers the effect catalog and lets the
//! operator play, stop and tune effects from the keyboard.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod app;
mod backend;
mod error;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ffbsim_errors::FfbSimError;
use ffbsim_session::{DeviceLocator, DeviceSession, SessionConfig};
use tracing::{error, info};

use crate::backend::{Backend, VirtualModel};
use crate::error::CliError;
use crate::logging::LogOptions;

#[derive(Parser, Debug)]
#[command(name = "ffbsim")]
#[command(about = "Force-feedback effect tester for steering wheels")]
#[command(version)]
#[command(long_about = "
ffbsim opens a force-feedback wheel, uploads a catalog of constant, periodic,
ramp and condition effects, and lets you play them one at a time from the
keyboard while watching the wheel axis, pedals and buttons.

Without a device argument it looks for the Microsoft SideWinder Force
Feedback Wheel (045E:0034). Use --virtual to try it without hardware.
")]
struct Cli {
    /// Session configuration file (JSON); missing file means defaults
    #[arg(
        short,
        long,
        env = "FFBSIM_CONFIG",
        default_value = "ffbsim.json",
        value_name = "PATH"
    )]
    config: PathBuf,

    /// Open this event device instead of searching
    #[arg(long, value_name = "PATH")]
    device: Option<PathBuf>,

    /// Vendor id to search for, hexadecimal
    #[arg(long, value_parser = parse_hex_id, conflicts_with = "device")]
    vid: Option<u16>,

    /// Product id to search for, hexadecimal
    #[arg(long, value_parser = parse_hex_id, conflicts_with = "device")]
    pid: Option<u16>,

    /// Case-insensitive device name fragment to search for
    #[arg(long, value_name = "TEXT", conflicts_with = "device")]
    name: Option<String>,

    /// Use an in-memory wheel instead of real hardware
    #[arg(long = "virtual", global = true, value_enum, value_name = "MODEL")]
    virtual_model: Option<VirtualModel>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mirror log output to stderr
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Directory for the session log file
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    log_dir: PathBuf,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List force-feedback capable devices
    Devices {
        /// Output in JSON format for machine parsing
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn locator(&self) -> DeviceLocator {
        if let Some(path) = &self.device {
            return DeviceLocator::by_path(path);
        }
        match (self.vid, self.pid, &self.name) {
            (None, None, None) => DeviceLocator::default(),
            (vendor_id, product_id, name_hint) => DeviceLocator {
                path: None,
                vendor_id,
                product_id,
                name_hint: name_hint.clone(),
            },
        }
    }

    fn log_options(&self) -> LogOptions {
        LogOptions {
            verbose: self.verbose,
            stderr: self.log_stderr,
            // Only the interactive session writes a log file
            file: !self.no_log_file && self.command.is_none(),
            directory: self.log_dir.clone(),
        }
    }
}

/// Accepts `045E`, `045e` or `0x045E`.
fn parse_hex_id(value: &str) -> Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{value}' is not a hex id: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error_human(&e);
            if let Some(cli_error) = e.downcast_ref::<CliError>() {
                output::print_hints(cli_error, &cli.locator());
            }
            error::exit_code_for(&e)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SessionConfig::load(&cli.config).map_err(CliError::from)?;

    if cli.dump_config {
        println!("{}", config.to_json().map_err(CliError::from)?);
        return Ok(());
    }

    let log = logging::init(&cli.log_options())?;
    let backend = Backend::select(cli.virtual_model)?;

    match &cli.command {
        Some(Commands::Devices { json }) => {
            let devices = backend
                .provider()
                .list()
                .map_err(|e| CliError::from(FfbSimError::from(e)))?;
            output::print_device_list(&devices, *json)?;
            Ok(())
        }
        None => {
            if let Some(path) = log.path() {
                println!("Log file: {}", path.display());
            }
            interactive(cli, config, &backend)
        }
    }
}

fn interactive(cli: &Cli, config: SessionConfig, backend: &Backend) -> Result<()> {
    info!(backend = %backend, config = %cli.config.display(), "Starting force-feedback simulator");

    let (session, report) = DeviceSession::initialize(backend.provider(), &cli.locator(), config)
        .map_err(|e| {
            error!(error = %e, "Initialization failed");
            CliError::from(e)
        })?;
    output::print_init_report(session.info(), &report);

    let result = app::run(&session);
    session.close();
    result?;
    Ok(())
}

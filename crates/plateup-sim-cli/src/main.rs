//! Open PlateUp deep links on an iOS Simulator.
//!
//! Runs the launch-then-navigate sequence through `xcrun simctl`: open the
//! Focus tab, wait two seconds, then jump to the morning check-in.
//!
//! # Usage
//!
//! ```bash
//! # The stock sequence on "iPhone 16 Pro"
//! plateup-sim
//!
//! # Another simulator, another check-in
//! plateup-sim --device "iPhone 16" --target-link plateup://checkin/evening
//!
//! # Machine-readable report
//! plateup-sim --format json
//!
//! # What simulators are available
//! plateup-sim list-devices
//! plateup-sim list-devices --booted
//! ```
//!
//! Exit codes: `0` once the sequence has run, whatever simctl returned; `1`
//! for an invalid device or link; `2` for usage errors and `list-devices`
//! failures.
//!
//! Settings not given on the command line come from
//! `~/.plateup-sim/config.json`, then from built-in defaults.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plateup_sim_core::config::{ConfigError, SequenceConfig};
use plateup_sim_core::runner::SystemRunner;
use plateup_sim_core::sequencer::{SequenceReport, Sequencer};
use plateup_sim_core::simctl::{Simctl, SimctlError, SimulatorDevice};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Open PlateUp deep links on an iOS Simulator.
#[derive(Parser)]
#[command(name = "plateup-sim")]
#[command(about = "Open the PlateUp Focus tab, then navigate to a check-in, on an iOS Simulator")]
#[command(version)]
struct Cli {
    /// Simulator name or UDID
    #[arg(short, long, env = "PLATEUP_SIM_DEVICE")]
    device: Option<String>,

    /// Link opened first via `simctl spawn <device> uiopen`
    #[arg(long, env = "PLATEUP_SIM_LAUNCH_LINK")]
    launch_link: Option<String>,

    /// Link opened second via `simctl openurl`
    #[arg(long, env = "PLATEUP_SIM_TARGET_LINK")]
    target_link: Option<String>,

    /// Milliseconds to wait between the two links
    #[arg(long, env = "PLATEUP_SIM_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Open the launch link, wait, then open the target link (default)
    Run,

    /// List available simulator devices
    ListDevices {
        /// Only show the simulator with this exact name (a booted one if several match)
        #[arg(short, long)]
        name: Option<String>,
        /// Only show the first booted simulator
        #[arg(short, long, conflicts_with = "name")]
        booted: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Simctl(SimctlError),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) => ExitCode::from(1),
            CliError::Simctl(_) => ExitCode::from(2),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Simctl(e) => write!(f, "simctl error: {}", e),
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command.as_ref().unwrap_or(&Command::Run) {
        Command::Run => run_sequence(&cli),
        Command::ListDevices { name, booted } => list_devices(&cli, name.as_deref(), *booted),
    }
}

/// Merge command-line overrides over the loaded config.
fn resolve_config(cli: &Cli, base: SequenceConfig) -> SequenceConfig {
    SequenceConfig {
        device: cli.device.clone().unwrap_or(base.device),
        launch_link: cli.launch_link.clone().unwrap_or(base.launch_link),
        target_link: cli.target_link.clone().unwrap_or(base.target_link),
        delay_ms: cli.delay_ms.unwrap_or(base.delay_ms),
    }
}

fn run_sequence(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli, SequenceConfig::load());
    debug!(
        device = %config.device,
        launch_link = %config.launch_link,
        target_link = %config.target_link,
        delay_ms = config.delay_ms,
        "resolved sequence config"
    );
    let plan = config.validate().map_err(CliError::Config)?;

    let report = Sequencer::system(plan).run();

    // Step failures are reported, never turned into an exit status.
    match cli.format {
        OutputFormat::Json => println!("{}", report_json(&report)),
        OutputFormat::Text if !cli.quiet => print_report(&report),
        OutputFormat::Text => {}
    }
    Ok(())
}

fn report_json(report: &SequenceReport) -> serde_json::Value {
    serde_json::to_value(report).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
}

fn print_report(report: &SequenceReport) {
    for step in &report.steps {
        println!("{:<8} {}  [{}]", step.step, step.invocation, step.status);
        for line in step.stdout.lines() {
            println!("         {}", line);
        }
    }
}

/// Narrow the device list to a name match or the booted simulator.
fn select_devices(
    devices: Vec<SimulatorDevice>,
    name: Option<&str>,
    booted: bool,
) -> Vec<SimulatorDevice> {
    let picked = if let Some(name) = name {
        Simctl::<SystemRunner>::find_device_by_name(&devices, name)
    } else if booted {
        Simctl::<SystemRunner>::find_booted_device(&devices)
    } else {
        return devices;
    };
    picked.cloned().into_iter().collect()
}

fn list_devices(cli: &Cli, name: Option<&str>, booted: bool) -> Result<(), CliError> {
    let devices = Simctl::system().list_devices().map_err(CliError::Simctl)?;
    debug!(count = devices.len(), "simctl reported devices");
    let devices = select_devices(devices, name, booted);

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "devices": devices }));
    } else if devices.is_empty() {
        if !cli.quiet {
            eprintln!("No simulators found");
        }
    } else {
        for device in devices {
            println!("{}\t{}\t{}", device.name, device.udid, device.state);
        }
    }
    Ok(())
}

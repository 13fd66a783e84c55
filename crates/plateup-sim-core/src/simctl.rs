//! Interface to Apple's `xcrun simctl` command-line tool.
//!
//! This module wraps the handful of simctl subcommands the deep-link helper
//! needs: opening a link through the simulator's `uiopen` process, opening a
//! link with `openurl`, and listing devices.
//!
//! # Requirements
//!
//! Xcode must be installed for `xcrun simctl` to be available.
//!
//! # Example
//!
//! ```no_run
//! use plateup_sim_core::deeplink::DeepLink;
//! use plateup_sim_core::simctl::Simctl;
//!
//! let simctl = Simctl::system();
//! for device in simctl.list_devices().unwrap() {
//!     println!("{}: {} ({})", device.name, device.udid, device.state);
//! }
//!
//! let outcome = simctl.open_url("iPhone 16 Pro", &DeepLink::focus()).unwrap();
//! assert!(outcome.success());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deeplink::DeepLink;
use crate::runner::{CommandOutcome, CommandRunner, Invocation, SystemRunner};

/// The launcher used to reach simctl.
pub const XCRUN: &str = "xcrun";

/// Errors that can occur when interacting with simctl.
#[derive(Error, Debug)]
pub enum SimctlError {
    /// A simctl command ran but returned a non-zero exit code.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse JSON output from simctl.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The command could not be started (typically `xcrun` is not installed).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Represents an iOS Simulator device.
///
/// This struct contains information about a simulator device as reported
/// by `xcrun simctl list devices -j`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorDevice {
    /// The unique device identifier (UDID) for this simulator.
    pub udid: String,

    /// The human-readable name of the device (e.g., "iPhone 16 Pro").
    pub name: String,

    /// The current state of the device (e.g., "Booted", "Shutdown").
    pub state: String,

    /// The device type identifier (e.g., "com.apple.CoreSimulator.SimDeviceType.iPhone-16-Pro").
    #[serde(rename = "deviceTypeIdentifier")]
    pub device_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: HashMap<String, Vec<SimulatorDevice>>,
}

/// Arguments for `xcrun` that open `link` through the simulator's `uiopen`.
pub fn spawn_uiopen_args(device: &str, link: &DeepLink) -> Vec<String> {
    vec![
        "simctl".to_string(),
        "spawn".to_string(),
        device.to_string(),
        "uiopen".to_string(),
        link.to_string(),
    ]
}

/// Arguments for `xcrun` that open `link` with `simctl openurl`.
pub fn open_url_args(device: &str, link: &DeepLink) -> Vec<String> {
    vec![
        "simctl".to_string(),
        "openurl".to_string(),
        device.to_string(),
        link.to_string(),
    ]
}

/// Wrapper for `xcrun simctl` commands over a [`CommandRunner`].
///
/// All methods are synchronous and block until the child process exits.
pub struct Simctl<R = SystemRunner> {
    runner: R,
}

impl Simctl<SystemRunner> {
    /// A wrapper that spawns real `xcrun` processes.
    pub fn system() -> Self {
        Self::new(SystemRunner)
    }
}

impl<R: CommandRunner> Simctl<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `xcrun` with the given arguments and returns its raw outcome.
    ///
    /// A non-zero exit is not an error here; callers decide what it means.
    pub fn invoke(&self, args: Vec<String>) -> Result<CommandOutcome, SimctlError> {
        let invocation = Invocation {
            program: XCRUN.to_string(),
            args,
        };
        tracing::debug!(command = %invocation, "running simctl");
        Ok(self.runner.run(&invocation)?)
    }

    /// `xcrun simctl spawn <device> uiopen <link>`
    pub fn spawn_uiopen(&self, device: &str, link: &DeepLink) -> Result<CommandOutcome, SimctlError> {
        self.invoke(spawn_uiopen_args(device, link))
    }

    /// `xcrun simctl openurl <device> <link>`
    pub fn open_url(&self, device: &str, link: &DeepLink) -> Result<CommandOutcome, SimctlError> {
        self.invoke(open_url_args(device, link))
    }

    /// Lists all available iOS Simulator devices.
    ///
    /// Queries `xcrun simctl list devices -j` and flattens the per-runtime
    /// groups into one list.
    ///
    /// # Errors
    ///
    /// - [`SimctlError::Io`] if the command fails to execute
    /// - [`SimctlError::CommandFailed`] if simctl returns a non-zero exit code
    /// - [`SimctlError::JsonParse`] if the output cannot be parsed as JSON
    pub fn list_devices(&self) -> Result<Vec<SimulatorDevice>, SimctlError> {
        let outcome = self.invoke(
            ["simctl", "list", "devices", "-j"]
                .into_iter()
                .map(String::from)
                .collect(),
        )?;

        if !outcome.success() {
            return Err(SimctlError::CommandFailed(outcome.stderr));
        }

        Self::parse_device_list(&outcome.stdout)
    }

    /// Parses device list JSON into a flat vector of devices.
    pub fn parse_device_list(json: &[u8]) -> Result<Vec<SimulatorDevice>, SimctlError> {
        let device_list: DeviceList = serde_json::from_slice(json)?;
        Ok(device_list.devices.into_values().flatten().collect())
    }

    /// Finds the first device in the "Booted" state.
    pub fn find_booted_device(devices: &[SimulatorDevice]) -> Option<&SimulatorDevice> {
        devices.iter().find(|d| d.state == "Booted")
    }

    /// Finds a device by exact name, preferring a booted one when several
    /// runtimes carry a simulator with the same name.
    pub fn find_device_by_name<'a>(
        devices: &'a [SimulatorDevice],
        name: &str,
    ) -> Option<&'a SimulatorDevice> {
        let mut matches = devices.iter().filter(|d| d.name == name);
        let first = matches.next()?;
        if first.state == "Booted" {
            return Some(first);
        }
        matches.find(|d| d.state == "Booted").or(Some(first))
    }
}

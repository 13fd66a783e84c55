//! The launch-then-navigate deep-link sequence.
//!
//! [`Sequencer::run`] performs a fixed, straight-line script against one
//! simulator:
//!
//! 1. `xcrun simctl spawn <device> uiopen <launch-link>`
//! 2. sleep for the configured delay
//! 3. `xcrun simctl openurl <device> <target-link>`
//!
//! Neither step's result influences what happens next. A step that cannot be
//! started, or that exits non-zero, is logged and recorded in the returned
//! [`SequenceReport`], and the sequence carries on.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SequencePlan;
use crate::runner::{CommandOutcome, CommandRunner, Invocation, SystemRunner};
use crate::simctl::{self, Simctl, SimctlError, XCRUN};

/// Which of the two invocations a [`StepReport`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// `spawn <device> uiopen <launch-link>`
    Launch,
    /// `openurl <device> <target-link>`
    Navigate,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Launch => f.write_str("launch"),
            Step::Navigate => f.write_str("navigate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The process exited with status zero.
    Succeeded,
    /// The process ran and exited non-zero, or was killed by a signal.
    Exited { code: Option<i32>, stderr: String },
    /// The process could not be started.
    SpawnFailed { message: String },
}

impl StepStatus {
    fn from_result(result: Result<CommandOutcome, SimctlError>) -> Self {
        match result {
            Ok(outcome) if outcome.success() => StepStatus::Succeeded,
            Ok(outcome) => StepStatus::Exited {
                code: outcome.code,
                stderr: outcome.stderr.trim().to_string(),
            },
            Err(e) => StepStatus::SpawnFailed { message: e.to_string() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Succeeded => f.write_str("ok"),
            StepStatus::Exited { code: Some(code), stderr } if stderr.is_empty() => {
                write!(f, "exited with status {}", code)
            }
            StepStatus::Exited { code: Some(code), stderr } => {
                write!(f, "exited with status {}: {}", code, stderr)
            }
            StepStatus::Exited { code: None, .. } => f.write_str("terminated by signal"),
            StepStatus::SpawnFailed { message } => write!(f, "could not start: {}", message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub invocation: Invocation,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: StepStatus,
    /// Whatever the process printed on stdout, lossily decoded and trimmed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
}

/// Record of one [`Sequencer::run`]. Always holds both steps, in order.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    pub device: String,
    pub delay_ms: u64,
    pub steps: Vec<StepReport>,
}

impl SequenceReport {
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_success())
    }

    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }
}

/// Runs the two-step deep-link sequence described by a [`SequencePlan`].
pub struct Sequencer<R = SystemRunner> {
    simctl: Simctl<R>,
    plan: SequencePlan,
}

impl Sequencer<SystemRunner> {
    /// A sequencer that drives the real `xcrun`.
    pub fn system(plan: SequencePlan) -> Self {
        Self::new(Simctl::system(), plan)
    }
}

impl<R: CommandRunner> Sequencer<R> {
    pub fn new(simctl: Simctl<R>, plan: SequencePlan) -> Self {
        Self { simctl, plan }
    }

    /// Open the launch link, wait, then open the target link.
    ///
    /// Blocks for the whole sequence. Never fails: step failures end up in
    /// the report.
    pub fn run(&self) -> SequenceReport {
        let device = self.plan.device.as_str();
        let launch_link = &self.plan.launch_link;
        let target_link = &self.plan.target_link;
        let mut steps = Vec::with_capacity(2);

        steps.push(self.step(
            Step::Launch,
            simctl::spawn_uiopen_args(device, launch_link),
            || self.simctl.spawn_uiopen(device, launch_link),
        ));

        debug!(delay_ms = self.plan.delay.as_millis() as u64, "waiting before navigation");
        std::thread::sleep(self.plan.delay);

        steps.push(self.step(
            Step::Navigate,
            simctl::open_url_args(device, target_link),
            || self.simctl.open_url(device, target_link),
        ));

        SequenceReport {
            device: device.to_string(),
            delay_ms: self.plan.delay.as_millis() as u64,
            steps,
        }
    }

    fn step<F>(&self, step: Step, args: Vec<String>, call: F) -> StepReport
    where
        F: FnOnce() -> Result<CommandOutcome, SimctlError>,
    {
        let invocation = Invocation {
            program: XCRUN.to_string(),
            args,
        };
        info!(%step, device = %self.plan.device, "starting step");
        let started_at = Utc::now();
        let result = call();

        let stdout = match &result {
            Ok(outcome) => String::from_utf8_lossy(&outcome.stdout).trim().to_string(),
            Err(_) => String::new(),
        };
        let status = StepStatus::from_result(result);

        if !status.is_success() {
            warn!(%step, command = %invocation, "{}", status);
        }

        StepReport {
            step,
            invocation,
            started_at,
            status,
            stdout,
        }
    }
}

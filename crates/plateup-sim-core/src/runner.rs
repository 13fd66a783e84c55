//! Process execution seam.
//!
//! Everything that shells out goes through [`CommandRunner`], so the
//! sequencer and the simctl wrapper can be exercised against a recorder in
//! tests while [`SystemRunner`] spawns real processes in production.

use std::fmt;
use std::process::Command;

use serde::{Deserialize, Serialize};

/// A single external command line: the program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// The executable to run, resolved through `PATH`.
    pub program: String,
    /// Arguments passed verbatim, without shell interpretation.
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// What a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutcome {
    /// An outcome with exit code zero and no output.
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// An outcome with the given exit code and stderr text.
    pub fn exited(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an [`Invocation`] to completion.
///
/// Implementations must block until the process has exited. An `Err` means
/// the process could not be started at all; a process that starts and fails
/// is an `Ok` with a non-zero [`CommandOutcome::code`].
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutcome>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutcome> {
        (**self).run(invocation)
    }
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutcome> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()?;

        Ok(CommandOutcome {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

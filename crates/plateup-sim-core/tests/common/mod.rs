//! Shared test helpers for plateup-sim-core integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use plateup_sim_core::config::SequencePlan;
use plateup_sim_core::runner::{CommandOutcome, CommandRunner, Invocation};

/// One call seen by [`RecordingRunner`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub invocation: Invocation,
    pub started: Instant,
    pub finished: Instant,
}

/// What the recorder should do for the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    Outcome(CommandOutcome),
    SpawnError(io::ErrorKind),
}

/// A [`CommandRunner`] that records every invocation instead of spawning it.
///
/// Replies are consumed in order; once exhausted every call succeeds.
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<VecDeque<Reply>>,
    work: Duration,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into()),
            work: Duration::ZERO,
        }
    }

    /// Make each call block for `work` before returning, like a slow process.
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        let started = Instant::now();
        if !self.work.is_zero() {
            std::thread::sleep(self.work);
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Outcome(CommandOutcome::ok()));
        self.calls.lock().unwrap().push(RecordedCall {
            invocation: invocation.clone(),
            started,
            finished: Instant::now(),
        });

        match reply {
            Reply::Outcome(outcome) => Ok(outcome),
            Reply::SpawnError(kind) => Err(io::Error::new(kind, "mock spawn failure")),
        }
    }
}

/// The default plan with a shorter delay, for tests that don't need the
/// full two seconds.
pub fn quick_plan(delay: Duration) -> SequencePlan {
    SequencePlan {
        delay,
        ..SequencePlan::default()
    }
}

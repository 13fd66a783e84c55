//! # plateup-sim-core
//!
//! Drives the PlateUp app on an iOS Simulator through deep links.
//!
//! The crate opens a launch link on a named simulator, waits, and then opens a
//! more specific in-app link, all through Apple's `xcrun simctl`.
//!
//! ## Modules
//!
//! - [`runner`] - Process execution trait and the real `std::process` runner
//! - [`simctl`] - Wrapper around `xcrun simctl` (uiopen, openurl, device listing)
//! - [`deeplink`] - Validated scheme-qualified link type
//! - [`config`] - Settings persisted in `~/.plateup-sim/config.json`
//! - [`sequencer`] - The launch, wait, navigate sequence
//!
//! ## External Dependencies
//!
//! **Xcode** must be installed for `xcrun simctl`.
//!
//! ## Example
//!
//! ```no_run
//! use plateup_sim_core::config::SequencePlan;
//! use plateup_sim_core::sequencer::Sequencer;
//!
//! let report = Sequencer::system(SequencePlan::default()).run();
//! for step in &report.steps {
//!     println!("{}: {}", step.step, step.status);
//! }
//! ```

pub mod config;
pub mod deeplink;
pub mod runner;
pub mod sequencer;
pub mod simctl;

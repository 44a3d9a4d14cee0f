//! Campus plugins: Nagios/Icinga checks for the services a university runs
//!
//! Every check is a small binary in `src/bin/` that measures one thing about
//! one remote service and reports it the way Nagios and Icinga expect: a
//! single status line, optional performance data after a `|`, and an exit
//! code of 0 (OK), 1 (WARNING), 2 (CRITICAL) or 3 (UNKNOWN).
//!
//! This library holds what the checks share:
//!
//! * [`threshold`] parses `[@]start:end` ranges and evaluates values against
//!   a warning/critical pair
//! * [`report`] aggregates any number of results into the worst status and
//!   renders the output line, including [`perfdata`]
//! * [`error`] maps every failure to the status it should be reported as
//! * [`http`], [`nut`] and [`state`] are the plumbing a few checks need
//!
//! A check usually looks like this:
//!
//! ```rust,no_run
//! use campus_plugins::{report, PerfData, Report, Status};
//!
//! fn main() {
//!     report::run("EXAMPLE", || {
//!         let mut report = Report::new("EXAMPLE");
//!         report.add(Status::Ok, "all is well");
//!         report.perf(PerfData::new("answer", 42.0));
//!         Ok(report)
//!     })
//! }
//! ```
//!
//! See the [`scripts`] module for the documentation of every check.

pub mod cli;
pub mod error;
pub mod http;
pub mod nut;
pub mod perfdata;
pub mod report;
pub mod scripts;
pub mod state;
pub mod status;
pub mod threshold;
pub mod version;

pub use crate::error::{CheckError, Result};
pub use crate::perfdata::PerfData;
pub use crate::report::{CheckResult, Report};
pub use crate::status::Status;
pub use crate::threshold::{Range, Thresholds};

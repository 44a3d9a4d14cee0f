//! Collect the results of one plugin run and print them the Nagios way
//!
//! ```plain
//! WEBDAV CRITICAL - GET took 3.2s, PUT took 0.1s | put=0.1s get=3.2s;1;2
//! optional long output lines
//! ```

use std::cmp::max;
use std::fmt;

use itertools::Itertools;

use crate::error::Result;
use crate::perfdata::{format_value, PerfData};
use crate::status::Status;
use crate::threshold::Thresholds;

/// One independent verdict inside a plugin run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
}

impl CheckResult {
    pub fn new<S: Into<String>>(status: Status, message: S) -> CheckResult {
        CheckResult {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct Report {
    name: String,
    results: Vec<CheckResult>,
    perfdata: Vec<PerfData>,
    details: Vec<String>,
}

impl Report {
    /// `name` is the short service name that starts the output line
    pub fn new<S: Into<String>>(name: S) -> Report {
        Report {
            name: name.into(),
            results: Vec::new(),
            perfdata: Vec::new(),
            details: Vec::new(),
        }
    }

    pub fn add<S: Into<String>>(&mut self, status: Status, message: S) -> &mut Report {
        self.results.push(CheckResult::new(status, message));
        self
    }

    pub fn push(&mut self, result: CheckResult) -> &mut Report {
        self.results.push(result);
        self
    }

    pub fn perf(&mut self, perfdata: PerfData) -> &mut Report {
        self.perfdata.push(perfdata);
        self
    }

    /// A line of long output, printed below the status line
    pub fn detail<S: Into<String>>(&mut self, line: S) -> &mut Report {
        self.details.push(line.into());
        self
    }

    /// Evaluate `value` against `thresholds`, recording both a result and
    /// perfdata for it
    ///
    /// `describe` receives the formatted value (with unit) and should return
    /// the human readable message, the violated range is appended to it.
    pub fn measure<F>(
        &mut self,
        label: &str,
        value: f64,
        uom: &'static str,
        thresholds: &Thresholds,
        describe: F,
    ) -> Status
    where
        F: FnOnce(&str) -> String,
    {
        let status = thresholds.evaluate(value);
        let shown = format!("{}{}", format_value(value), uom);
        let mut message = describe(&shown);
        if let Some(range) = thresholds.violated(status) {
            let side = if range.alert_inside { "inside" } else { "outside" };
            message.push_str(&format!(" ({} {})", side, range));
        }
        self.results.push(CheckResult::new(status, message));
        self.perfdata
            .push(PerfData::new(label, value).uom(uom).thresholds(thresholds));
        status
    }

    /// Merge another report's results, perfdata and details into this one
    pub fn extend(&mut self, other: Report) -> &mut Report {
        self.results.extend(other.results);
        self.perfdata.extend(other.perfdata);
        self.details.extend(other.details);
        self
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// The worst status of all results, `Unknown` if nothing was checked
    pub fn status(&self) -> Status {
        if self.results.is_empty() {
            return Status::Unknown;
        }
        self.results
            .iter()
            .fold(Status::Ok, |acc, r| max(acc, r.status))
    }

    /// All messages, worst first
    pub fn summary(&self) -> String {
        if self.results.is_empty() {
            return "no check results".to_owned();
        }
        self.results
            .iter()
            .sorted_by(|l, r| r.status.cmp(&l.status))
            .map(|r| r.message.as_str())
            .filter(|m| !m.is_empty())
            .join(", ")
    }

    #[cfg_attr(test, allow(dead_code))]
    pub fn exit(self) -> ! {
        let status = self.status();
        println!("{}", self);
        status.exit()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} - {}", self.name, self.status(), self.summary())?;
        if !self.perfdata.is_empty() {
            write!(f, " | {}", self.perfdata.iter().join(" "))?;
        }
        for line in &self.details {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Build the report an error produces
pub fn from_error<S: Into<String>>(name: S, err: &crate::error::CheckError) -> Report {
    let mut report = Report::new(name);
    report.add(err.status(), err.to_string());
    report
}

/// Run a check and exit with whatever it produced
///
/// Errors are reported with the status `CheckError::status` assigns them.
#[cfg_attr(test, allow(dead_code))]
pub fn run<F>(name: &str, check: F) -> !
where
    F: FnOnce() -> Result<Report>,
{
    match check() {
        Ok(report) => report.exit(),
        Err(e) => {
            tracing::debug!("check failed: {:?}", e);
            from_error(name, &e).exit()
        }
    }
}

//! Check the SSL Labs grade of a public TLS server

mod api;
mod grade;

use std::time::Duration;

use reqwest::Url;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::status::Status;
use campus_plugins::{report, CheckError, PerfData, Report, Result};

use crate::api::{Api, AssessmentStatus, Host, Start};
use crate::grade::Grade;

/// Run (or fetch a cached) SSL Labs assessment and check the grades.
///
/// Every endpoint (IP address) of the host gets its own grade, the worst
/// verdict wins. Grades rank A+ > A > A- > B > C > D > E > F > T > M.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-ssllabs (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "Public host name to assess")]
    host: String,
    #[structopt(
        short = "w",
        long = "warning",
        default_value = "A",
        help = "Warn about grades below this one"
    )]
    warning: Grade,
    #[structopt(
        short = "c",
        long = "critical",
        default_value = "B",
        help = "Go critical for grades below this one"
    )]
    critical: Grade,
    #[structopt(
        long = "ignore-trust",
        help = "Use the grade SSL Labs gives when ignoring certificate trust issues"
    )]
    ignore_trust: bool,
    #[structopt(
        long = "no-grade-status",
        default_value = "critical",
        possible_values = &Status::str_values(),
        case_insensitive = true,
        help = "Status for endpoints without a grade, e.g. unreachable ones"
    )]
    no_grade_status: Status,
    #[structopt(
        long = "from-cache",
        help = "Accept a cached assessment instead of starting a new one"
    )]
    from_cache: bool,
    #[structopt(
        long = "max-age",
        default_value = "24",
        help = "Hours a cached assessment may be old, with --from-cache"
    )]
    max_age: u32,
    #[structopt(
        long = "max-wait",
        default_value = "300",
        help = "Seconds to wait for the assessment to finish"
    )]
    max_wait: u64,
    #[structopt(
        long = "poll-interval",
        default_value = "10",
        help = "Seconds between polls of a running assessment"
    )]
    poll_interval: u64,
    #[structopt(
        long = "pending-status",
        default_value = "unknown",
        possible_values = &Status::str_values(),
        case_insensitive = true,
        help = "Status when the assessment does not finish in time or SSL Labs is busy"
    )]
    pending_status: Status,
    #[structopt(
        long = "api",
        default_value = "https://api.ssllabs.com/api/v3/",
        help = "Base URL of the SSL Labs API"
    )]
    api: String,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

impl Args {
    fn start(&self) -> Start {
        if self.from_cache {
            Start::Cached(self.max_age)
        } else {
            Start::New
        }
    }

    fn judge(&self, grade: Grade) -> Status {
        if grade < self.critical {
            Status::Critical
        } else if grade < self.warning {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}

fn evaluate(host: &Host, args: &Args) -> Report {
    let mut report = Report::new("SSLLABS");
    match host.status {
        AssessmentStatus::Ready => {}
        AssessmentStatus::Error => {
            report.add(
                Status::Critical,
                format!(
                    "assessment of {} failed: {}",
                    host.host,
                    host.status_message.as_deref().unwrap_or("no reason given")
                ),
            );
            return report;
        }
        AssessmentStatus::Dns | AssessmentStatus::InProgress => {
            report.add(
                args.pending_status,
                format!(
                    "assessment of {} did not finish within {}s",
                    host.host, args.max_wait
                ),
            );
            return report;
        }
    }

    if host.endpoints.is_empty() {
        report.add(
            args.no_grade_status,
            format!("SSL Labs found no endpoints for {}", host.host),
        );
    }

    for endpoint in &host.endpoints {
        let raw = if args.ignore_trust {
            endpoint
                .grade_trust_ignored
                .as_ref()
                .or_else(|| endpoint.grade.as_ref())
        } else {
            endpoint.grade.as_ref()
        };
        match raw.and_then(|g| g.parse::<Grade>().ok()) {
            Some(grade) => {
                let status = args.judge(grade);
                let mut message = format!("{} has grade {}", endpoint.ip_address, grade);
                if status != Status::Ok {
                    message.push_str(&format!(
                        " (expected {} or better)",
                        if status == Status::Critical {
                            args.critical
                        } else {
                            args.warning
                        }
                    ));
                }
                report.add(status, message);
                report.perf(
                    PerfData::new(format!("grade_{}", endpoint.ip_address), grade.score() as f64)
                        .min(0.0)
                        .max(Grade::APlus.score() as f64),
                );
            }
            None => {
                report.add(
                    args.no_grade_status,
                    format!(
                        "{} has no grade: {}",
                        endpoint.ip_address,
                        endpoint.status_message.as_deref().unwrap_or("unknown reason")
                    ),
                );
            }
        }
        if endpoint.has_warnings {
            report.detail(format!("{} has warnings", endpoint.ip_address));
        }
        if let Some(ref name) = endpoint.server_name {
            report.detail(format!("{} is {}", endpoint.ip_address, name));
        }
    }
    report
}

fn do_check(args: &Args) -> Result<Report> {
    let client = http::client(&args.common, &args.http)?;
    let api = Api {
        client: &client,
        base: Url::parse(&args.api)?,
    };
    let assessed = api.assess(
        &args.host,
        args.start(),
        Duration::from_secs(args.max_wait),
        Duration::from_secs(args.poll_interval),
    );
    match assessed {
        Ok(host) => Ok(evaluate(&host, args)),
        // rate limited (429) or overloaded (503, 529)
        Err(CheckError::HttpStatus { status, .. }) if status == 429 || status == 503 || status == 529 => {
            let mut report = Report::new("SSLLABS");
            report.add(
                args.pending_status,
                format!("SSL Labs is busy (HTTP {}), try again later", status),
            );
            Ok(report)
        }
        Err(e) => Err(e),
    }
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("SSLLABS", || do_check(&args))
}

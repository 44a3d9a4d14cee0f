//! Check an ownCloud (or Nextcloud) instance through its `status.php`

use reqwest::blocking::Client;
use serde::Deserialize;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::version::Version;
use campus_plugins::{report, PerfData, Report, Result, Status};

/// Check that an ownCloud instance is installed, not in maintenance mode and
/// does not need a database upgrade.
///
/// The warning and critical ranges apply to the response time in seconds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-owncloud (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "Base URL of the instance, e.g. https://cloud.example.org")]
    url: String,
    #[structopt(
        long = "min-version",
        help = "Warn if the instance reports a version older than this"
    )]
    min_version: Option<Version>,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

/// The interesting part of `status.php`
#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct OwnCloudStatus {
    installed: bool,
    maintenance: bool,
    #[serde(default)]
    needs_db_upgrade: bool,
    version: String,
    #[serde(default)]
    versionstring: String,
    #[serde(default)]
    edition: String,
    #[serde(default)]
    productname: String,
}

fn status_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("status.php") {
        base.to_owned()
    } else {
        format!("{}/status.php", base)
    }
}

fn evaluate(status: &OwnCloudStatus, elapsed: f64, args: &Args) -> Report {
    let mut report = Report::new("OWNCLOUD");
    let product = if status.productname.is_empty() {
        "ownCloud"
    } else {
        status.productname.as_str()
    };
    let shown_version = if status.versionstring.is_empty() {
        &status.version
    } else {
        &status.versionstring
    };

    if !status.installed {
        report.add(Status::Critical, format!("{} is not installed", product));
    }
    if status.maintenance {
        report.add(Status::Critical, "maintenance mode is enabled");
    }
    if status.needs_db_upgrade {
        report.add(Status::Critical, "database upgrade required");
    }

    match (&args.min_version, status.version.parse::<Version>()) {
        (Some(min), Ok(ref running)) if running < min => {
            report.add(
                Status::Warning,
                format!("{} {} is older than {}", product, shown_version, min),
            );
        }
        (Some(_), Err(e)) => {
            report.add(Status::Unknown, e);
        }
        _ => {
            report.add(
                Status::Ok,
                format!("{} {} {}", product, shown_version, status.edition)
                    .trim_end()
                    .to_owned(),
            );
        }
    }

    report.measure(
        "time",
        elapsed,
        "s",
        &args.thresholds.thresholds(),
        |t| format!("answered in {}", t),
    );
    report
}

fn do_check(client: &Client, args: &Args) -> Result<Report> {
    let fetched = http::get(client, &status_url(&args.url))?;
    let status: OwnCloudStatus = fetched.json()?;
    tracing::info!("status.php: {:?}", status);
    let mut report = evaluate(&status, fetched.elapsed.as_secs_f64(), args);
    report.perf(PerfData::new("size", fetched.body.len() as f64).uom("B").min(0.0));
    Ok(report)
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("OWNCLOUD", || {
        let client = http::client(&args.common, &args.http)?;
        do_check(&client, &args)
    })
}

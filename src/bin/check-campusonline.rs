//! Check that a CAMPUSonline portal page is served

use regex::Regex;
use reqwest::blocking::Client;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::http::{self, Fetched, HttpOpts};
use campus_plugins::{report, PerfData, Report, Result, Status};

/// Check that a CAMPUSonline portal page loads and contains what it should.
///
/// The warning and critical ranges apply to the response time in seconds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-campusonline (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "The portal page to load, e.g. https://online.example.org/co/")]
    url: String,
    #[structopt(
        short = "e",
        long = "expect",
        default_value = "CAMPUSonline",
        help = "Regex the page body has to match"
    )]
    expect: Regex,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

fn evaluate(fetched: &Fetched, args: &Args) -> Report {
    let mut report = Report::new("CAMPUSONLINE");
    if args.expect.is_match(&fetched.body) {
        report.add(Status::Ok, format!("{} matches '{}'", fetched.url, args.expect));
    } else {
        report.add(
            Status::Critical,
            format!("{} does not match '{}'", fetched.url, args.expect),
        );
    }
    report.measure(
        "time",
        fetched.elapsed.as_secs_f64(),
        "s",
        &args.thresholds.thresholds(),
        |t| format!("loaded in {}", t),
    );
    report.perf(PerfData::new("size", fetched.body.len() as f64).uom("B").min(0.0));
    report
}

fn do_check(client: &Client, args: &Args) -> Result<Report> {
    let fetched = http::get(client, &args.url)?;
    Ok(evaluate(&fetched, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("CAMPUSONLINE", || {
        let client = http::client(&args.common, &args.http)?;
        do_check(&client, &args)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    fn run(body: &'static str, extra: &[&str]) -> Report {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/co/");
            then.status(200).body(body);
        });
        let url = server.url("/co/");
        let mut argv = vec!["check-campusonline", url.as_str()];
        argv.extend_from_slice(extra);
        let a = args(&argv);
        let client = http::client(&a.common, &a.http).unwrap();
        do_check(&client, &a).unwrap()
    }

    #[test]
    fn default_expectation() {
        let a = args(&["check-campusonline", "https://co.example"]);
        assert_eq!(a.expect.as_str(), "CAMPUSonline");
        assert!(Args::from_iter_safe(&["check-campusonline", "u", "-e", "("]).is_err());
    }

    #[test]
    fn matching_page_is_ok() {
        let report = run("<title>CAMPUSonline</title>", &[]);
        assert_eq!(report.status(), Status::Ok);
    }

    #[test]
    fn wrong_page_is_critical() {
        let report = run("<title>Maintenance</title>", &[]);
        assert_eq!(report.status(), Status::Critical);
        let report = run("<title>Maintenance</title>", &["-e", "Mainten"]);
        assert_eq!(report.status(), Status::Ok);
    }

    #[test]
    fn server_errors_propagate() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.any_request();
            then.status(500);
        });
        let url = server.url("/co/");
        let a = args(&["check-campusonline", url.as_str()]);
        let client = http::client(&a.common, &a.http).unwrap();
        let err = do_check(&client, &a).unwrap_err();
        assert_eq!(err.status(), Status::Critical);
    }
}

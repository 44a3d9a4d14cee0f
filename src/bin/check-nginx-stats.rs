//! Check nginx through its stub_status page

use regex::Regex;
use reqwest::blocking::Client;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, StateArgs, ThresholdArgs};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::state::{CounterSample, StateStore};
use campus_plugins::threshold::{Range, Thresholds};
use campus_plugins::{report, CheckError, PerfData, Report, Result, Status};

/// Check the connections and request rate of an nginx server.
///
/// The warning and critical ranges apply to the number of active connections.
/// The request rate is computed against the sample taken on the previous run,
/// so the first run only records a sample.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-nginx-stats (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "URL of the stub_status page, e.g. http://localhost/nginx_status")]
    url: String,
    #[structopt(long = "rate-warning", help = "Warning range for requests per second")]
    rate_warning: Option<Range>,
    #[structopt(long = "rate-critical", help = "Critical range for requests per second")]
    rate_critical: Option<Range>,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    state: StateArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StubStatus {
    active: u64,
    accepts: u64,
    handled: u64,
    requests: u64,
    reading: u64,
    writing: u64,
    waiting: u64,
}

impl StubStatus {
    fn parse(page: &str) -> Result<StubStatus> {
        let re = Regex::new(
            r"(?s)Active connections:\s*(\d+).*?(\d+)\s+(\d+)\s+(\d+)\s+Reading:\s*(\d+)\s+Writing:\s*(\d+)\s+Waiting:\s*(\d+)",
        )?;
        let caps = re.captures(page).ok_or_else(|| {
            CheckError::Unexpected(format!("not an nginx stub_status page: {:?}", page))
        })?;
        let n = |i: usize| -> Result<u64> {
            caps[i]
                .parse()
                .map_err(|e| CheckError::Unexpected(format!("bad number '{}': {}", &caps[i], e)))
        };
        Ok(StubStatus {
            active: n(1)?,
            accepts: n(2)?,
            handled: n(3)?,
            requests: n(4)?,
            reading: n(5)?,
            writing: n(6)?,
            waiting: n(7)?,
        })
    }

    fn dropped(&self) -> u64 {
        self.accepts.saturating_sub(self.handled)
    }
}

/// The samples of the previous run, if there was one
#[derive(Debug, Default)]
struct Previous {
    requests: Option<CounterSample>,
    dropped: Option<CounterSample>,
}

fn evaluate(
    stats: &StubStatus,
    requests: &CounterSample,
    dropped: &CounterSample,
    previous: &Previous,
    args: &Args,
) -> Report {
    let mut report = Report::new("NGINX");
    report.measure(
        "active",
        stats.active as f64,
        "",
        &args.thresholds.thresholds(),
        |v| format!("{} active connections", v),
    );

    let rate_thresholds = Thresholds::new(args.rate_warning, args.rate_critical);
    match previous.requests.and_then(|p| requests.rate_since(&p)) {
        Some(rate) => {
            let rate = (rate * 100.0).round() / 100.0;
            report.measure("req_per_sec", rate, "", &rate_thresholds, |v| {
                format!("{} requests/s", v)
            });
        }
        None => {
            report.detail("no usable previous sample, request rate starts with the next run");
        }
    }

    if let Some(grown) = previous.dropped.and_then(|p| dropped.delta_since(&p)) {
        if grown > 0 {
            report.add(
                Status::Warning,
                format!("{} connections dropped since the last run", grown),
            );
        }
    }

    report
        .perf(PerfData::new("reading", stats.reading as f64).min(0.0))
        .perf(PerfData::new("writing", stats.writing as f64).min(0.0))
        .perf(PerfData::new("waiting", stats.waiting as f64).min(0.0))
        .perf(PerfData::new("accepts", stats.accepts as f64).uom("c"))
        .perf(PerfData::new("handled", stats.handled as f64).uom("c"))
        .perf(PerfData::new("requests", stats.requests as f64).uom("c"));
    report
}

fn do_check(client: &Client, store: &StateStore, args: &Args) -> Result<Report> {
    let fetched = http::get(client, &args.url)?;
    let stats = StubStatus::parse(&fetched.body)?;
    tracing::debug!("{:?}", stats);

    let requests_key = format!("{}#requests", args.url);
    let dropped_key = format!("{}#dropped", args.url);
    let previous = Previous {
        requests: store.get(&requests_key)?,
        dropped: store.get(&dropped_key)?,
    };
    let requests = CounterSample::now(stats.requests);
    let dropped = CounterSample::now(stats.dropped());
    store.put(&requests_key, &requests)?;
    store.put(&dropped_key, &dropped)?;

    Ok(evaluate(&stats, &requests, &dropped, &previous, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("NGINX", || {
        let client = http::client(&args.common, &args.http)?;
        let store = StateStore::open(&args.state.state_dir, "check-nginx-stats", &args.url)?;
        do_check(&client, &store, &args)
    })
}

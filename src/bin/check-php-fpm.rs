//! Check a PHP-FPM pool through its status page

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::threshold::{Range, Thresholds};
use campus_plugins::{report, PerfData, Report, Result, Status};

/// Check how busy a PHP-FPM pool is.
///
/// The warning and critical ranges apply to the percentage of the pool's
/// processes that are currently serving a request.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-php-fpm (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "URL of the pool's pm.status_path, e.g. http://localhost/fpm-status")]
    url: String,
    #[structopt(long = "queue-warning", help = "Warning range for the listen queue")]
    queue_warning: Option<Range>,
    #[structopt(long = "queue-critical", help = "Critical range for the listen queue")]
    queue_critical: Option<Range>,
    #[structopt(
        long = "ignore-max-children",
        help = "Do not warn when the pool has hit pm.max_children since it started"
    )]
    ignore_max_children: bool,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

/// The JSON variant of the FPM status page
#[derive(Deserialize, Debug, PartialEq)]
struct PoolStatus {
    pool: String,
    #[serde(rename = "process manager")]
    process_manager: String,
    #[serde(rename = "start since")]
    start_since: u64,
    #[serde(rename = "accepted conn")]
    accepted_conn: u64,
    #[serde(rename = "listen queue")]
    listen_queue: u64,
    #[serde(rename = "max listen queue")]
    max_listen_queue: u64,
    #[serde(rename = "listen queue len")]
    listen_queue_len: u64,
    #[serde(rename = "idle processes")]
    idle_processes: u64,
    #[serde(rename = "active processes")]
    active_processes: u64,
    #[serde(rename = "total processes")]
    total_processes: u64,
    #[serde(rename = "max active processes")]
    max_active_processes: u64,
    #[serde(rename = "max children reached")]
    max_children_reached: u64,
    #[serde(rename = "slow requests", default)]
    slow_requests: u64,
}

impl PoolStatus {
    fn percent_active(&self) -> f64 {
        if self.total_processes == 0 {
            0.0
        } else {
            self.active_processes as f64 / self.total_processes as f64 * 100.0
        }
    }
}

/// Ask for JSON no matter how the URL was given
fn json_url(url: &str) -> Result<Url> {
    let mut url = Url::parse(url)?;
    if !url.query_pairs().any(|(k, _)| k == "json") {
        url.query_pairs_mut().append_key_only("json");
    }
    Ok(url)
}

fn evaluate(status: &PoolStatus, args: &Args) -> Report {
    let mut report = Report::new("PHP-FPM");
    let busy = status.percent_active();
    report.measure(
        "active_percent",
        (busy * 10.0).round() / 10.0,
        "%",
        &args.thresholds.thresholds(),
        |v| {
            format!(
                "pool {} ({}) has {} of {} processes busy ({})",
                status.pool,
                status.process_manager,
                status.active_processes,
                status.total_processes,
                v
            )
        },
    );

    let queue = Thresholds::new(args.queue_warning, args.queue_critical);
    if queue != Thresholds::default() {
        report.measure(
            "listen_queue",
            status.listen_queue as f64,
            "",
            &queue,
            |v| format!("{} requests queued", v),
        );
    } else {
        report.perf(PerfData::new("listen_queue", status.listen_queue as f64).min(0.0));
    }

    if status.max_children_reached > 0 && !args.ignore_max_children {
        report.add(
            Status::Warning,
            format!(
                "max_children reached {} times in the last {}s",
                status.max_children_reached, status.start_since
            ),
        );
    }

    report
        .perf(PerfData::new("active", status.active_processes as f64).min(0.0))
        .perf(PerfData::new("idle", status.idle_processes as f64).min(0.0))
        .perf(
            PerfData::new("total", status.total_processes as f64)
                .min(0.0)
                .max(status.max_active_processes.max(status.total_processes) as f64),
        )
        .perf(
            PerfData::new("max_listen_queue", status.max_listen_queue as f64)
                .min(0.0)
                .max(status.listen_queue_len as f64),
        )
        .perf(PerfData::new("accepted_conn", status.accepted_conn as f64).uom("c"))
        .perf(PerfData::new("slow_requests", status.slow_requests as f64).uom("c"));
    report
}

fn do_check(client: &Client, args: &Args) -> Result<Report> {
    let url = json_url(&args.url)?;
    let fetched = http::fetch(client.get(url))?;
    let status: PoolStatus = fetched.json()?;
    Ok(evaluate(&status, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("PHP-FPM", || {
        let client = http::client(&args.common, &args.http)?;
        do_check(&client, &args)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;

    const STATUS: &str = r#"{"pool":"www","process manager":"dynamic",
        "start time":1700000000,"start since":3600,"accepted conn":12345,
        "listen queue":0,"max listen queue":4,"listen queue len":128,
        "idle processes":6,"active processes":4,"total processes":10,
        "max active processes":10,"max children reached":0,"slow requests":2}"#;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    fn status() -> PoolStatus {
        serde_json::from_str(STATUS).unwrap()
    }

    #[test]
    fn adds_json_query() {
        assert_eq!(
            json_url("http://localhost/status").unwrap().as_str(),
            "http://localhost/status?json"
        );
        assert_eq!(
            json_url("http://localhost/status?json&full").unwrap().as_str(),
            "http://localhost/status?json&full"
        );
    }

    #[test]
    fn busy_percentage() {
        let a = args(&["check-php-fpm", "http://l/s", "-w", "30", "-c", "80"]);
        let report = evaluate(&status(), &a);
        assert_eq!(report.status(), Status::Warning);
        assert!(report.to_string().contains("active_percent=40%;30;80"));
    }

    #[test]
    fn queue_thresholds() {
        let mut s = status();
        s.listen_queue = 20;
        let a = args(&["check-php-fpm", "http://l/s", "--queue-critical", "10"]);
        assert_eq!(evaluate(&s, &a).status(), Status::Critical);
    }

    #[test]
    fn max_children_warns_unless_ignored() {
        let mut s = status();
        s.max_children_reached = 3;
        let a = args(&["check-php-fpm", "http://l/s"]);
        assert_eq!(evaluate(&s, &a).status(), Status::Warning);
        let a = args(&["check-php-fpm", "http://l/s", "--ignore-max-children"]);
        assert_eq!(evaluate(&s, &a).status(), Status::Ok);
    }

    #[test]
    fn empty_pool_is_not_busy() {
        let mut s = status();
        s.total_processes = 0;
        s.active_processes = 0;
        assert_eq!(s.percent_active(), 0.0);
    }

    #[test]
    fn fetches_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/fpm-status").query_param_exists("json");
            then.status(200).body(STATUS);
        });
        let url = server.url("/fpm-status");
        let a = args(&["check-php-fpm", url.as_str()]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a).unwrap();
        mock.assert();
        assert_eq!(report.status(), Status::Ok);
    }
}

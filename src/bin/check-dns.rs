//! Resolve a name and time how long the answer takes

use std::net::IpAddr;
use std::time::Instant;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::Resolver;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::{report, Report, Result, Status};

/// Query a DNS record and check the answer.
///
/// Without --server the system resolver configuration is used. The warning
/// and critical ranges apply to the query time in seconds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-dns (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(short = "q", long = "query", help = "Name to look up")]
    query: String,
    #[structopt(
        short = "T",
        long = "type",
        default_value = "A",
        help = "Record type, e.g. A, AAAA, MX, TXT"
    )]
    record_type: RecordType,
    #[structopt(short = "s", long = "server", help = "Ask this name server directly")]
    server: Option<IpAddr>,
    #[structopt(long = "port", default_value = "53", help = "Port of --server")]
    port: u16,
    #[structopt(
        short = "e",
        long = "expect",
        number_of_values = 1,
        help = "A value the answer has to contain, may be repeated"
    )]
    expect: Vec<String>,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    common: Common,
}

/// Compare names without caring about the trailing dot or case
fn normalize(s: &str) -> String {
    s.trim_end_matches('.').to_lowercase()
}

fn missing<'a>(expected: &'a [String], answers: &[String]) -> Vec<&'a str> {
    let answers: Vec<String> = answers.iter().map(|a| normalize(a)).collect();
    expected
        .iter()
        .filter(|e| !answers.contains(&normalize(e)))
        .map(String::as_str)
        .collect()
}

fn evaluate(answers: &[String], elapsed: f64, args: &Args) -> Report {
    let mut report = Report::new("DNS");
    let what = format!("{} {}", args.query, args.record_type);
    if answers.is_empty() {
        report.add(Status::Critical, format!("no {} records", what));
    } else {
        let missing = missing(&args.expect, answers);
        if missing.is_empty() {
            report.add(Status::Ok, format!("{} is {}", what, answers.join(" ")));
        } else {
            report.add(
                Status::Critical,
                format!(
                    "{} is {}, expected {}",
                    what,
                    answers.join(" "),
                    missing.join(" ")
                ),
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

fn resolver(args: &Args) -> Result<Resolver> {
    let mut opts = ResolverOpts::default();
    opts.timeout = args.common.timeout();
    opts.attempts = 0;
    opts.cache_size = 0;
    let resolver = match args.server {
        Some(ip) => {
            opts.use_hosts_file = false;
            let servers = NameServerConfigGroup::from_ips_clear(&[ip], args.port, true);
            Resolver::new(ResolverConfig::from_parts(None, vec![], servers), opts)?
        }
        None => {
            let (config, _) = hickory_resolver::system_conf::read_system_conf()?;
            Resolver::new(config, opts)?
        }
    };
    Ok(resolver)
}

fn do_check(args: &Args) -> Result<Report> {
    let resolver = resolver(args)?;
    let start = Instant::now();
    let answers = match resolver.lookup(args.query.as_str(), args.record_type) {
        Ok(lookup) => lookup.iter().map(|r| r.to_string()).collect(),
        Err(e) => match *e.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => Vec::new(),
            _ => return Err(e.into()),
        },
    };
    let elapsed = start.elapsed().as_secs_f64();
    tracing::debug!("answers: {:?}", answers);
    Ok(evaluate(&answers, elapsed, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("DNS", || do_check(&args))
}

//! Check for pending security updates reported over SNMP

use std::str::FromStr;

use chrono::{DateTime, Utc};
use snmp::{SyncSession, Value};
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, StateArgs};
use campus_plugins::state::StateStore;
use campus_plugins::{report, CheckError, PerfData, Report, Result, Status};

/// NET-SNMP-EXTEND-MIB::nsExtendOutput1Line, indexed by the extend name
const EXTEND_OUTPUT_1LINE: &[u32] = &[1, 3, 6, 1, 4, 1, 8072, 1, 3, 2, 3, 1, 1];

/// Ask a host over SNMP how many security updates are waiting.
///
/// The host runs a net-snmp `extend` that prints the number of pending
/// security updates, e.g. `extend security-updates /usr/local/bin/count-updates`.
/// Pending updates are a warning, and become critical once they have been
/// pending for longer than --max-age days.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-security-updates (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(short = "H", long = "host", help = "Host to query")]
    host: String,
    #[structopt(short = "P", long = "port", default_value = "161", help = "SNMP port")]
    port: u16,
    #[structopt(
        short = "C",
        long = "community",
        env = "SNMP_COMMUNITY",
        hide_env_values = true,
        default_value = "public",
        help = "SNMP v2c community"
    )]
    community: String,
    #[structopt(
        short = "e",
        long = "extend",
        default_value = "security-updates",
        help = "Name of the net-snmp extend printing the update count"
    )]
    extend: String,
    #[structopt(long = "oid", help = "Read this OID instead of the extend output")]
    oid: Option<Oid>,
    #[structopt(
        long = "max-age",
        default_value = "7",
        help = "Days updates may be pending before going critical"
    )]
    max_age: i64,
    #[structopt(flatten)]
    state: StateArgs,
    #[structopt(flatten)]
    common: Common,
}

#[derive(Debug, Clone, PartialEq)]
struct Oid(Vec<u32>);

impl Oid {
    /// The extend output line for `name`, the index is the name as a string
    fn extend_output(name: &str) -> Oid {
        let mut parts = EXTEND_OUTPUT_1LINE.to_vec();
        parts.push(name.len() as u32);
        parts.extend(name.bytes().map(u32::from));
        Oid(parts)
    }
}

impl FromStr for Oid {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Oid, String> {
        s.trim_start_matches('.')
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Oid)
            .map_err(|_| format!("'{}' is not a numeric OID", s))
    }
}

/// The update count from the first varbind of the answer
///
/// The agent leaves the varbind out when it does not know the OID.
fn count_from(value: Option<Value>) -> Result<u64> {
    match value {
        Some(Value::OctetString(bytes)) => {
            let text = String::from_utf8_lossy(bytes);
            text.trim().parse().map_err(|_| {
                CheckError::Unexpected(format!("update count '{}' is not a number", text.trim()))
            })
        }
        Some(Value::Integer(n)) if n >= 0 => Ok(n as u64),
        Some(Value::Counter32(n)) | Some(Value::Unsigned32(n)) => Ok(u64::from(n)),
        Some(Value::Counter64(n)) => Ok(n),
        Some(ref other) => Err(CheckError::Unexpected(format!(
            "unexpected SNMP value {:?}",
            other
        ))),
        None => Err(CheckError::Precondition(
            "the agent does not have that OID, is the extend configured?".to_owned(),
        )),
    }
}

fn evaluate(updates: u64, since: Option<DateTime<Utc>>, now: DateTime<Utc>, args: &Args) -> Report {
    let mut report = Report::new("UPDATES");
    let pending_days = since.map_or(0.0, |s| {
        now.signed_duration_since(s).num_minutes() as f64 / 1440.0
    });

    if updates == 0 {
        report.add(Status::Ok, format!("no security updates pending on {}", args.host));
    } else {
        let status = if pending_days > args.max_age as f64 {
            Status::Critical
        } else {
            Status::Warning
        };
        let mut message = format!("{} security updates pending on {}", updates, args.host);
        if let Some(since) = since {
            message.push_str(&format!(" since {}", since.format("%Y-%m-%d %H:%M")));
        }
        report.add(status, message);
    }

    report
        .perf(PerfData::new("updates", updates as f64).min(0.0))
        .perf(
            PerfData::new("pending_days", (pending_days * 10.0).round() / 10.0)
                .uom("d")
                .min(0.0),
        );
    report
}

/// Remember since when updates are pending, forget it once they are installed
fn pending_since(store: &StateStore, host: &str, updates: u64, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    if updates == 0 {
        store.remove(host)?;
        return Ok(None);
    }
    match store.get::<DateTime<Utc>>(host)? {
        Some(since) => Ok(Some(since)),
        None => {
            store.put(host, &now)?;
            Ok(Some(now))
        }
    }
}

fn query(args: &Args) -> Result<u64> {
    let oid = args
        .oid
        .clone()
        .unwrap_or_else(|| Oid::extend_output(&args.extend));
    let mut session = SyncSession::new(
        (args.host.as_str(), args.port),
        args.community.as_bytes(),
        Some(args.common.timeout()),
        0,
    )?;
    let mut pdu = session
        .get(&oid.0)
        .map_err(|e| CheckError::Snmp(format!("{:?}", e)))?;
    count_from(pdu.varbinds.next().map(|(_, value)| value))
}

fn do_check(store: &StateStore, updates: u64, args: &Args) -> Result<Report> {
    let now = Utc::now();
    let since = pending_since(store, &args.host, updates, now)?;
    Ok(evaluate(updates, since, now, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("UPDATES", || {
        let updates = query(&args)?;
        tracing::info!("{} reports {} pending updates", args.host, updates);
        let store = StateStore::open(&args.state.state_dir, "check-security-updates", &args.host)?;
        do_check(&store, updates, &args)
    })
}

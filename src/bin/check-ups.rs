//! Check a UPS through Network UPS Tools

use std::collections::BTreeMap;

use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::nut::{self, UpsFlag};
use campus_plugins::{report, PerfData, Report, Result, Status};

/// Ask upsd about a UPS and check its status flags.
///
/// Running on battery is a warning, a low or worn out battery, an overload
/// or a forced shutdown is critical. With --variable the warning and
/// critical ranges apply to that variable, e.g.
/// `--variable battery.charge -w 50: -c 25:`.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-ups (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(short = "u", long = "ups", help = "Name of the UPS as upsd knows it")]
    ups: String,
    #[structopt(short = "H", long = "host", default_value = "localhost", help = "Host running upsd")]
    host: String,
    #[structopt(short = "P", long = "port", default_value = "3493", help = "upsd port")]
    port: u16,
    #[structopt(long = "user", help = "upsd user, if the variables need a login")]
    user: Option<String>,
    #[structopt(
        long = "password",
        env = "NUT_PASSWORD",
        hide_env_values = true,
        help = "Password for --user"
    )]
    password: Option<String>,
    #[structopt(long = "variable", help = "Variable the thresholds apply to")]
    variable: Option<String>,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    common: Common,
}

/// Variables always reported as perfdata when present, with their unit
const PERF_VARS: &[(&str, &str, Option<f64>)] = &[
    ("battery.charge", "%", Some(100.0)),
    ("ups.load", "%", Some(100.0)),
    ("battery.runtime", "s", None),
];

fn flag_status(flag: &UpsFlag) -> Status {
    match *flag {
        UpsFlag::OnBattery => Status::Warning,
        UpsFlag::LowBattery
        | UpsFlag::ReplaceBattery
        | UpsFlag::Overloaded
        | UpsFlag::ForcedShutdown => Status::Critical,
        _ => Status::Ok,
    }
}

fn evaluate(vars: &BTreeMap<String, String>, args: &Args) -> Report {
    let mut report = Report::new("UPS");

    match vars.get("ups.status") {
        Some(raw) => {
            let flags = nut::parse_status(raw);
            let problems: Vec<_> = flags
                .iter()
                .filter(|f| flag_status(f) != Status::Ok)
                .collect();
            if problems.is_empty() {
                let shown: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
                report.add(Status::Ok, format!("{} is {}", args.ups, shown.join(", ")));
            }
            for flag in problems {
                report.add(flag_status(flag), format!("{} is {}", args.ups, flag));
            }
        }
        None => {
            report.add(Status::Unknown, format!("{} reports no ups.status", args.ups));
        }
    }

    for &(name, uom, max) in PERF_VARS {
        if args.variable.as_deref() == Some(name) {
            continue;
        }
        if let Some(value) = vars.get(name).and_then(|v| v.parse::<f64>().ok()) {
            let mut perf = PerfData::new(name, value).uom(uom).min(0.0);
            if let Some(max) = max {
                perf = perf.max(max);
            }
            report.perf(perf);
        }
    }

    if let Some(ref name) = args.variable {
        match vars.get(name).map(|v| (v, v.parse::<f64>())) {
            Some((_, Ok(value))) => {
                let uom = PERF_VARS
                    .iter()
                    .find(|&&(n, _, _)| n == name.as_str())
                    .map_or("", |&(_, uom, _)| uom);
                report.measure(name, value, uom, &args.thresholds.thresholds(), |v| {
                    format!("{} is {}", name, v)
                });
            }
            Some((raw, Err(_))) => {
                report.add(Status::Unknown, format!("{} is not a number: '{}'", name, raw));
            }
            None => {
                report.add(Status::Unknown, format!("{} does not report {}", args.ups, name));
            }
        }
    }

    for (name, value) in vars {
        report.detail(format!("{}: {}", name, value));
    }
    report
}

fn do_check(args: &Args) -> Result<Report> {
    let vars = nut::list_vars(
        &args.host,
        args.port,
        args.user.as_deref(),
        args.password.as_deref(),
        args.common.timeout(),
        &args.ups,
    )?;
    tracing::debug!("{} variables for {}", vars.len(), args.ups);
    Ok(evaluate(&vars, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("UPS", || do_check(&args))
}

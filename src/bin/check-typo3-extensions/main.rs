//! Audit the extensions of a TYPO3 instance against the extension repository

mod installed;
mod ter;

use std::path::PathBuf;

use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::{report, PerfData, Report, Result, Status};

use crate::installed::Installed;
use crate::ter::Index;

/// Check the installed TYPO3 extensions for known security issues.
///
/// Installed versions are looked up in the TYPO3 Extension Repository index;
/// releases TER marks as insecure are critical. Extensions TER does not know
/// (site packages, in-house code) are ignored.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-typo3-extensions (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(
        parse(from_os_str),
        help = "TYPO3 root directory, the one containing typo3conf/"
    )]
    root: PathBuf,
    #[structopt(
        long = "ter",
        default_value = "https://typo3.org/fileadmin/ter/extensions.xml.gz",
        help = "URL or path of the extension index, plain or gzipped"
    )]
    ter: String,
    #[structopt(
        long = "warn-outdated",
        help = "Warn about extensions with a newer secure release"
    )]
    warn_outdated: bool,
    #[structopt(
        short = "x",
        long = "exclude",
        number_of_values = 1,
        help = "Extension key to skip, may be repeated"
    )]
    exclude: Vec<String>,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

fn evaluate(installed: &[Installed], index: &Index, args: &Args) -> Report {
    let mut report = Report::new("TYPO3");
    let mut checked = 0;
    let mut insecure = 0;
    let mut outdated = 0;

    for ext in installed {
        if args.exclude.contains(&ext.key) {
            continue;
        }
        checked += 1;
        if !index.knows(&ext.key) {
            if args.common.verbose > 0 {
                report.detail(format!("{} {} is not in TER", ext.key, ext.version));
            }
            continue;
        }

        if index
            .release(&ext.key, &ext.version)
            .map_or(false, |r| r.insecure())
        {
            insecure += 1;
            let fix = match index.newest_secure(&ext.key) {
                Some(newest) if *newest > ext.version => format!(", update to {}", newest),
                _ => String::new(),
            };
            report.add(
                Status::Critical,
                format!("{} {} is insecure{}", ext.key, ext.version, fix),
            );
            continue;
        }

        if let Some(newest) = index.newest_secure(&ext.key) {
            if *newest > ext.version {
                outdated += 1;
                let status = if args.warn_outdated {
                    Status::Warning
                } else {
                    Status::Ok
                };
                let line = format!("{} {} is outdated, {} is available", ext.key, ext.version, newest);
                if status == Status::Ok {
                    report.detail(line);
                } else {
                    report.add(status, line);
                }
            }
        }
    }

    if insecure == 0 && (outdated == 0 || !args.warn_outdated) {
        report.add(
            Status::Ok,
            format!("{} extensions checked, none insecure", checked),
        );
    }

    report
        .perf(PerfData::new("installed", checked as f64).min(0.0))
        .perf(PerfData::new("insecure", insecure as f64).min(0.0))
        .perf(PerfData::new("outdated", outdated as f64).min(0.0));
    report
}

fn do_check(args: &Args) -> Result<Report> {
    let installed = installed::scan(&args.root)?;
    tracing::info!("found {} extensions in {}", installed.len(), args.root.display());
    let client = http::client(&args.common, &args.http)?;
    let index = Index::load(&client, &args.ter)?;
    Ok(evaluate(&installed, &index, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("TYPO3", || do_check(&args))
}

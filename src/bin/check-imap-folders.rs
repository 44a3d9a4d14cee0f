//! Count the folders (or messages) an IMAP account has

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Instant;

use native_tls::TlsConnector;
use regex::Regex;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::{report, CheckError, PerfData, Report, Result};

/// Log into an IMAP server over TLS and count the folders of the account.
///
/// With --mailbox, count the messages in that mailbox instead. The warning and
/// critical ranges apply to the count, e.g. `-c 1:` to require at least one.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-imap-folders (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(short = "H", long = "host", help = "IMAP server")]
    host: String,
    #[structopt(short = "P", long = "port", default_value = "993", help = "IMAPS port")]
    port: u16,
    #[structopt(short = "u", long = "user", help = "Login name")]
    user: String,
    #[structopt(
        short = "p",
        long = "password",
        env = "IMAP_PASSWORD",
        hide_env_values = true,
        help = "Password"
    )]
    password: String,
    #[structopt(
        long = "pattern",
        default_value = "*",
        help = "LIST pattern selecting the folders to count"
    )]
    pattern: String,
    #[structopt(long = "exclude", help = "Do not count folders matching this regex")]
    exclude: Option<Regex>,
    #[structopt(short = "m", long = "mailbox", help = "Count messages in this mailbox instead")]
    mailbox: Option<String>,
    #[structopt(short = "k", long = "insecure", help = "Accept invalid TLS certificates")]
    insecure: bool,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    common: Common,
}

/// What was counted, with the numbers to report
#[derive(Debug, PartialEq)]
enum Counted {
    Folders(usize),
    Messages { mailbox: String, exists: u32 },
}

fn count_folders<'a, I: IntoIterator<Item = &'a str>>(names: I, exclude: &Option<Regex>) -> usize {
    names
        .into_iter()
        .filter(|name| exclude.as_ref().map_or(true, |re| !re.is_match(name)))
        .count()
}

fn evaluate(counted: &Counted, elapsed: f64, args: &Args) -> Report {
    let mut report = Report::new("IMAP");
    let thresholds = args.thresholds.thresholds();
    match *counted {
        Counted::Folders(n) => {
            report.measure("folders", n as f64, "", &thresholds, |v| {
                format!("{} has {} folders", args.user, v)
            });
        }
        Counted::Messages {
            ref mailbox,
            exists,
        } => {
            report.measure("messages", exists as f64, "", &thresholds, |v| {
                format!("{} of {} has {} messages", mailbox, args.user, v)
            });
        }
    }
    report.perf(PerfData::new("time", elapsed).uom("s").min(0.0));
    report
}

fn do_check(args: &Args) -> Result<Report> {
    let start = Instant::now();
    let tls = TlsConnector::builder()
        .danger_accept_invalid_certs(args.insecure)
        .danger_accept_invalid_hostnames(args.insecure)
        .build()?;
    let addr = (args.host.as_str(), args.port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| {
            CheckError::Precondition(format!("{} does not resolve to an address", args.host))
        })?;
    let tcp = TcpStream::connect_timeout(&addr, args.common.timeout())?;
    tcp.set_read_timeout(Some(args.common.timeout()))?;
    tcp.set_write_timeout(Some(args.common.timeout()))?;
    let stream = tls.connect(&args.host, tcp).map_err(|e| {
        CheckError::Protocol(format!("TLS handshake with {} failed: {}", args.host, e))
    })?;
    let mut client = imap::Client::new(stream);
    client.read_greeting()?;
    let mut session = client
        .login(&args.user, &args.password)
        .map_err(|(e, _client)| e)?;
    tracing::info!("logged into {} as {}", args.host, args.user);

    let counted = match args.mailbox {
        Some(ref mailbox) => {
            let status = session.examine(mailbox)?;
            Counted::Messages {
                mailbox: mailbox.clone(),
                exists: status.exists,
            }
        }
        None => {
            let names = session.list(Some(""), Some(args.pattern.as_str()))?;
            for name in names.iter() {
                tracing::debug!("folder {}", name.name());
            }
            Counted::Folders(count_folders(names.iter().map(|n| n.name()), &args.exclude))
        }
    };
    session.logout()?;

    Ok(evaluate(&counted, start.elapsed().as_secs_f64(), args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("IMAP", || do_check(&args))
}

#[cfg(test)]
mod test {
    use super::*;
    use campus_plugins::Status;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn parses_args() {
        let a = args(&["check-imap-folders", "-H", "imap.example", "-u", "probe", "-p", "pw"]);
        assert_eq!(a.port, 993);
        assert_eq!(a.pattern, "*");
        assert_eq!(a.mailbox, None);
    }

    #[test]
    fn excludes_folders() {
        let names = vec!["INBOX", "Sent", "shared/Team", "shared/Other"];
        assert_eq!(count_folders(names.iter().cloned(), &None), 4);
        let exclude = Some(Regex::new("^shared/").unwrap());
        assert_eq!(count_folders(names.iter().cloned(), &exclude), 2);
    }

    #[test]
    fn folder_thresholds() {
        let a = args(&[
            "check-imap-folders", "-H", "h", "-u", "probe", "-p", "pw", "-w", "100", "-c", "500",
        ]);
        let report = evaluate(&Counted::Folders(120), 0.5, &a);
        assert_eq!(report.status(), Status::Warning);
        assert_eq!(
            report.to_string(),
            "IMAP WARNING - probe has 120 folders (outside 100) | folders=120;100;500 time=0.5s;;;0"
        );
    }

    #[test]
    fn message_counts() {
        let a = args(&["check-imap-folders", "-H", "h", "-u", "probe", "-p", "pw", "-c", "1:"]);
        let counted = Counted::Messages {
            mailbox: "INBOX".into(),
            exists: 0,
        };
        let report = evaluate(&counted, 0.1, &a);
        assert_eq!(report.status(), Status::Critical);
        assert!(report.summary().starts_with("INBOX of probe has 0 messages"));
    }
}

//! Count the entries an LDAP search returns

use std::str::FromStr;
use std::time::Instant;

use ldap3::{LdapConn, LdapConnSettings, Scope};
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::{report, CheckError, PerfData, Report, Result};

/// Run an LDAP search and count the entries it returns.
///
/// The warning and critical ranges apply to the number of entries, use e.g.
/// `-c 1:` to go critical when nothing is found.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-ldap-search (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(
        short = "H",
        long = "uri",
        help = "LDAP URI, e.g. ldaps://ldap.example.org"
    )]
    uri: String,
    #[structopt(short = "b", long = "base", help = "Search base DN")]
    base: String,
    #[structopt(
        short = "f",
        long = "filter",
        default_value = "(objectClass=*)",
        help = "Search filter"
    )]
    filter: String,
    #[structopt(
        short = "s",
        long = "scope",
        default_value = "sub",
        possible_values = &["base", "one", "sub"],
        help = "Search scope"
    )]
    scope: SearchScope,
    #[structopt(short = "D", long = "bind-dn", help = "DN to bind as, anonymous if absent")]
    bind_dn: Option<String>,
    #[structopt(
        short = "P",
        long = "bind-password",
        env = "LDAP_BIND_PASSWORD",
        hide_env_values = true,
        help = "Password for --bind-dn"
    )]
    bind_password: Option<String>,
    #[structopt(long = "starttls", help = "Upgrade ldap:// connections with StartTLS")]
    starttls: bool,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    common: Common,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchScope {
    Base,
    One,
    Sub,
}

impl SearchScope {
    fn ldap(self) -> Scope {
        match self {
            SearchScope::Base => Scope::Base,
            SearchScope::One => Scope::OneLevel,
            SearchScope::Sub => Scope::Subtree,
        }
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<SearchScope, String> {
        match s {
            "base" => Ok(SearchScope::Base),
            "one" => Ok(SearchScope::One),
            "sub" => Ok(SearchScope::Sub),
            _ => Err(format!("unknown scope '{}'", s)),
        }
    }
}

fn evaluate(entries: usize, elapsed: f64, args: &Args) -> Report {
    let mut report = Report::new("LDAP");
    report.measure(
        "entries",
        entries as f64,
        "",
        &args.thresholds.thresholds(),
        |v| format!("{} entries match {} below {}", v, args.filter, args.base),
    );
    report.perf(PerfData::new("time", elapsed).uom("s").min(0.0));
    report
}

fn do_check(args: &Args) -> Result<Report> {
    if args.bind_dn.is_some() && args.bind_password.is_none() {
        return Err(CheckError::Precondition(
            "--bind-dn needs a --bind-password".to_owned(),
        ));
    }

    let start = Instant::now();
    let settings = LdapConnSettings::new()
        .set_conn_timeout(args.common.timeout())
        .set_starttls(args.starttls);
    let mut ldap = LdapConn::with_settings(settings, &args.uri)?;
    ldap.with_timeout(args.common.timeout());

    if let (Some(dn), Some(password)) = (&args.bind_dn, &args.bind_password) {
        ldap.simple_bind(dn, password)?.success()?;
        tracing::info!("bound as {}", dn);
    }

    let (entries, _result) = ldap
        .search(&args.base, args.scope.ldap(), &args.filter, vec!["1.1"])?
        .success()?;
    let elapsed = start.elapsed().as_secs_f64();
    tracing::debug!("{} entries", entries.len());
    ldap.unbind()?;

    Ok(evaluate(entries.len(), elapsed, args))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("LDAP", || do_check(&args))
}

#[cfg(test)]
mod test {
    use super::*;
    use campus_plugins::Status;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn defaults() {
        let a = args(&["check-ldap-search", "-H", "ldap://l", "-b", "dc=example,dc=org"]);
        assert_eq!(a.filter, "(objectClass=*)");
        assert_eq!(a.scope, SearchScope::Sub);
        assert!(!a.starttls);
    }

    #[test]
    fn scopes() {
        let a = args(&["check-ldap-search", "-H", "ldap://l", "-b", "o=x", "-s", "one"]);
        assert_eq!(a.scope, SearchScope::One);
        assert!(Args::from_iter_safe(&["check-ldap-search", "-H", "l", "-b", "o", "-s", "x"]).is_err());
    }

    #[test]
    fn bind_dn_needs_password() {
        let mut a = args(&["check-ldap-search", "-H", "ldap://l", "-b", "o=x", "-D", "cn=probe"]);
        // LDAP_BIND_PASSWORD may be set where the tests run
        a.bind_password = None;
        let err = do_check(&a).unwrap_err();
        assert_eq!(err.status(), Status::Unknown);
        assert_eq!(err.to_string(), "--bind-dn needs a --bind-password");
    }

    #[test]
    fn requires_entries() {
        let a = args(&["check-ldap-search", "-H", "ldap://l", "-b", "o=x", "-c", "1:"]);
        assert_eq!(evaluate(0, 0.1, &a).status(), Status::Critical);
        assert_eq!(evaluate(3, 0.1, &a).status(), Status::Ok);
        assert_eq!(
            evaluate(3, 0.1, &a).to_string(),
            "LDAP OK - 3 entries match (objectClass=*) below o=x | entries=3;;1: time=0.1s;;;0"
        );
    }
}

//! Log into a Roundcube webmail and time it

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::{report, CheckError, PerfData, Report, Result, Status};

/// Log into a Roundcube webmail installation with a test account.
///
/// Loads the login form, posts the credentials and checks that the mailbox
/// view comes back. The warning and critical ranges apply to the total time
/// in seconds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-webmail (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "URL of the webmail, e.g. https://webmail.example.org/")]
    url: String,
    #[structopt(short = "u", long = "user", help = "Login name of the test account")]
    user: String,
    #[structopt(
        short = "p",
        long = "password",
        env = "WEBMAIL_PASSWORD",
        hide_env_values = true,
        help = "Password of the test account"
    )]
    password: String,
    #[structopt(
        short = "e",
        long = "expect",
        help = "Regex the page after login has to match instead of the mailbox view"
    )]
    expect: Option<Regex>,
    #[structopt(long = "logout", help = "Log out again after a successful login")]
    logout: bool,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

/// The CSRF token of the login form
fn login_token(page: &str) -> Option<String> {
    let re = Regex::new(r#"<input[^>]*name="_token"[^>]*value="([^"]*)""#).unwrap();
    re.captures(page).map(|c| c[1].to_owned())
}

/// The token the mailbox view uses for further requests
fn request_token(page: &str) -> Option<String> {
    let re = Regex::new(r#""request_token"\s*:\s*"([^"]+)""#).unwrap();
    re.captures(page).map(|c| c[1].to_owned())
}

fn logged_in(final_url: &Url, page: &str, expect: &Option<Regex>) -> bool {
    match *expect {
        Some(ref re) => re.is_match(page),
        None => {
            final_url
                .query_pairs()
                .any(|(k, v)| k == "_task" && v == "mail")
                || page.contains(r#""task":"mail""#)
        }
    }
}

fn do_check(client: &Client, args: &Args) -> Result<Report> {
    let mut report = Report::new("WEBMAIL");
    let base = Url::parse(&args.url)?;

    let form = http::fetch(client.get(base.clone()))?;
    let token = login_token(&form.body).ok_or_else(|| {
        CheckError::Unexpected(format!("no login form token found on {}", form.url))
    })?;
    tracing::debug!("login token {}", token);

    let mut login_url = base.clone();
    login_url.query_pairs_mut().append_pair("_task", "login");
    let params = [
        ("_token", token.as_str()),
        ("_task", "login"),
        ("_action", "login"),
        ("_timezone", "_default_"),
        ("_url", ""),
        ("_user", args.user.as_str()),
        ("_pass", args.password.as_str()),
    ];
    let mailbox = http::fetch(client.post(login_url).form(&params))?;
    let total = (form.elapsed + mailbox.elapsed).as_secs_f64();

    if logged_in(&mailbox.url, &mailbox.body, &args.expect) {
        report.add(Status::Ok, format!("{} logged in", args.user));
    } else {
        report.add(
            Status::Critical,
            format!("login as {} failed at {}", args.user, mailbox.url),
        );
    }

    report.measure(
        "time",
        total,
        "s",
        &args.thresholds.thresholds(),
        |t| format!("took {}", t),
    );
    report
        .perf(PerfData::new("form_time", form.elapsed.as_secs_f64()).uom("s").min(0.0))
        .perf(PerfData::new("login_time", mailbox.elapsed.as_secs_f64()).uom("s").min(0.0));

    if args.logout && report.status() == Status::Ok {
        match request_token(&mailbox.body) {
            Some(token) => {
                let mut logout_url = base;
                logout_url
                    .query_pairs_mut()
                    .append_pair("_task", "logout")
                    .append_pair("_token", &token);
                http::fetch(client.get(logout_url))?;
                report.detail("logged out");
            }
            None => {
                report.detail("no request token on the mailbox page, not logging out");
            }
        }
    }
    Ok(report)
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("WEBMAIL", || {
        let client = http::client(&args.common, &args.http)?;
        do_check(&client, &args)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;

    const LOGIN_FORM: &str = r#"<form name="login" method="post">
        <input type="hidden" name="_token" value="tok123">
        <input type="hidden" name="_task" value="login"></form>"#;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn finds_tokens() {
        assert_eq!(login_token(LOGIN_FORM), Some("tok123".to_owned()));
        assert_eq!(login_token("<html></html>"), None);
        assert_eq!(
            request_token(r#"rcmail.set_env({"task":"mail","request_token":"abc"});"#),
            Some("abc".to_owned())
        );
    }

    #[test]
    fn recognizes_the_mailbox() {
        let url = Url::parse("https://w.example/?_task=mail&_mbox=INBOX").unwrap();
        assert!(logged_in(&url, "", &None));
        let url = Url::parse("https://w.example/?_task=login").unwrap();
        assert!(!logged_in(&url, "Login failed", &None));
        assert!(logged_in(&url, r#"{"task":"mail"}"#, &None));
        let expect = Some(Regex::new("Posteingang").unwrap());
        assert!(!logged_in(&url, r#"{"task":"mail"}"#, &expect));
    }

    #[test]
    fn password_from_flag() {
        let a = args(&["check-webmail", "https://w", "-u", "probe", "-p", "pw"]);
        assert_eq!(a.password, "pw");
        assert!(!a.logout);
    }

    fn server_with(mailbox_body: &'static str) -> MockServer {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(LOGIN_FORM);
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .query_param("_task", "login")
                .body_contains("_token=tok123")
                .body_contains("_user=probe");
            then.status(200).body(mailbox_body);
        });
        server
    }

    #[test]
    fn successful_login() {
        let server = server_with(r#"rcmail.set_env({"task":"mail","request_token":"t2"});"#);
        let url = server.url("/");
        let a = args(&["check-webmail", url.as_str(), "-u", "probe", "-p", "pw"]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a).unwrap();
        assert_eq!(report.status(), Status::Ok);
        assert!(report.summary().starts_with("probe logged in"));
    }

    #[test]
    fn failed_login_is_critical() {
        let server = server_with(r#"rcmail.display_message("Login failed.","warning");"#);
        let url = server.url("/");
        let a = args(&["check-webmail", url.as_str(), "-u", "probe", "-p", "bad"]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a).unwrap();
        assert_eq!(report.status(), Status::Critical);
    }
}

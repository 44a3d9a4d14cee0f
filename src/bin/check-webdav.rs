//! Write, read back and delete a file on a WebDAV share

use std::process;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, Url};
use structopt::StructOpt;

use campus_plugins::cli::{init_logging, Common, ThresholdArgs};
use campus_plugins::http::{self, HttpOpts};
use campus_plugins::{report, CheckError, PerfData, Report, Result, Status};

/// Check that a WebDAV collection can be written to, read from and cleaned up.
///
/// Uploads a small probe file with PUT, downloads it with GET and compares the
/// contents, then removes it with DELETE. Every step is timed; the warning and
/// critical ranges apply to the total time in seconds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-webdav (part of campus-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(help = "URL of a writable collection, e.g. https://dav.example.org/probe/")]
    url: String,
    #[structopt(short = "u", long = "user", help = "User for basic authentication")]
    user: Option<String>,
    #[structopt(
        short = "p",
        long = "password",
        env = "WEBDAV_PASSWORD",
        hide_env_values = true,
        help = "Password for basic authentication"
    )]
    password: Option<String>,
    #[structopt(long = "keep", help = "Do not delete the probe file afterwards")]
    keep: bool,
    #[structopt(flatten)]
    thresholds: ThresholdArgs,
    #[structopt(flatten)]
    http: HttpOpts,
    #[structopt(flatten)]
    common: Common,
}

/// Where the probe file goes, unique per run
fn probe_url(collection: &str, stamp: i64) -> Result<Url> {
    let mut base = Url::parse(collection)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!(
        "campus-plugins-probe-{}-{}.txt",
        process::id(),
        stamp
    ))?)
}

struct Dav<'a> {
    client: &'a Client,
    args: &'a Args,
}

impl<'a> Dav<'a> {
    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let request = self.client.request(method, url.clone());
        match self.args.user {
            Some(ref user) => request.basic_auth(user, self.args.password.as_ref()),
            None => request,
        }
    }
}

fn probe_content(at: DateTime<Utc>) -> String {
    format!("campus-plugins webdav probe written at {}\n", at.to_rfc3339())
}

fn do_check(client: &Client, args: &Args, now: DateTime<Utc>) -> Result<Report> {
    let mut report = Report::new("WEBDAV");
    let dav = Dav { client, args };
    let url = probe_url(&args.url, now.timestamp_millis())?;
    let content = probe_content(now);

    let put = http::fetch(dav.request(Method::PUT, &url).body(content.clone()))?;
    report.perf(PerfData::new("put", put.elapsed.as_secs_f64()).uom("s").min(0.0));

    // once the file exists it is deleted, whatever the read back says
    let read_back = http::fetch(dav.request(Method::GET, &url));
    let deleted = if args.keep {
        report.detail(format!("kept {}", url));
        None
    } else {
        Some(http::fetch(dav.request(Method::DELETE, &url)))
    };

    let get = match read_back {
        Ok(get) => get,
        Err(e) => {
            if let Some(Err(ref cleanup)) = deleted {
                tracing::warn!("deleting {} failed as well: {}", url, cleanup);
            }
            return Err(e);
        }
    };
    report.perf(PerfData::new("get", get.elapsed.as_secs_f64()).uom("s").min(0.0));
    if get.body != content {
        report.add(
            Status::Critical,
            format!("{} came back with different content", url),
        );
        tracing::info!("expected {:?}, got {:?}", content, get.body);
    }

    let mut total = put.elapsed + get.elapsed;
    if let Some(deleted) = deleted {
        let delete = deleted?;
        report.perf(PerfData::new("delete", delete.elapsed.as_secs_f64()).uom("s").min(0.0));
        total += delete.elapsed;

        // a successful DELETE that leaves the file around is still a failure
        match http::fetch(dav.request(Method::HEAD, &url)) {
            Err(CheckError::HttpStatus { status: 404, .. }) => {}
            Err(CheckError::HttpStatus { status: 410, .. }) => {}
            Ok(_) => {
                report.add(Status::Critical, format!("{} still exists after DELETE", url));
            }
            Err(e) => return Err(e),
        }
    }

    let steps = if args.keep { "PUT/GET" } else { "PUT/GET/DELETE" };
    report.measure(
        "time",
        total.as_secs_f64(),
        "s",
        &args.thresholds.thresholds(),
        |t| format!("{} took {}", steps, t),
    );
    Ok(report)
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.common.verbose);
    report::run("WEBDAV", || {
        let client = http::client(&args.common, &args.http)?;
        do_check(&client, &args, Utc::now())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method as MockMethod;
    use httpmock::Mock;

    fn args(argv: &[&str]) -> Args {
        Args::from_iter(argv.iter())
    }

    #[test]
    fn probe_urls_stay_in_the_collection() {
        let url = probe_url("https://dav.example/probe", 7).unwrap();
        assert!(url.as_str().starts_with("https://dav.example/probe/campus-plugins-probe-"));
        assert!(url.as_str().ends_with("-7.txt"));
        let url = probe_url("https://dav.example/probe/", 7).unwrap();
        assert!(url.as_str().starts_with("https://dav.example/probe/campus-plugins-probe-"));
    }

    #[test]
    fn put_failure_is_critical() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(MockMethod::PUT);
            then.status(507);
        });
        let url = server.url("/dav/");
        let a = args(&["check-webdav", url.as_str()]);
        let client = http::client(&a.common, &a.http).unwrap();
        let err = do_check(&client, &a, Utc::now()).unwrap_err();
        assert_eq!(err.status(), Status::Critical);
    }

    #[test]
    fn content_mismatch_is_critical() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(MockMethod::PUT).header_exists("authorization");
            then.status(201);
        });
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("something else");
        });
        let url = server.url("/dav/");
        let a = args(&["check-webdav", url.as_str(), "-u", "probe", "-p", "pw", "--keep"]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a, Utc::now()).unwrap();
        assert_eq!(report.status(), Status::Critical);
        assert!(report.summary().contains("came back with different content"));
    }

    /// A share that accepts the probe file, serves it back and deletes it
    fn share(server: &MockServer, now: DateTime<Utc>) -> (Mock<'_>, Mock<'_>) {
        server.mock(|when, then| {
            when.method(MockMethod::PUT).path_contains("/dav/campus-plugins-probe-");
            then.status(201);
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("/dav/campus-plugins-probe-");
            then.status(200).body(probe_content(now));
        });
        let delete = server.mock(|when, then| {
            when.method(MockMethod::DELETE).path_contains("/dav/campus-plugins-probe-");
            then.status(204);
        });
        let gone = server.mock(|when, then| {
            when.method(MockMethod::HEAD).path_contains("/dav/campus-plugins-probe-");
            then.status(404);
        });
        (delete, gone)
    }

    #[test]
    fn round_trip_is_ok() {
        let server = MockServer::start();
        let now = Utc::now();
        let (delete, gone) = share(&server, now);
        let url = server.url("/dav/");
        let a = args(&["check-webdav", url.as_str(), "-w", "10", "-c", "20"]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a, now).unwrap();
        delete.assert();
        gone.assert();
        assert_eq!(report.status(), Status::Ok);
        assert!(report.summary().starts_with("PUT/GET/DELETE took "));
        let out = report.to_string();
        assert!(out.contains(" put="));
        assert!(out.contains(" delete="));
    }

    #[test]
    fn surviving_file_is_critical() {
        let server = MockServer::start();
        let now = Utc::now();
        server.mock(|when, then| {
            when.method(MockMethod::PUT);
            then.status(201);
        });
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(probe_content(now));
        });
        let delete = server.mock(|when, then| {
            when.method(MockMethod::DELETE);
            then.status(204);
        });
        server.mock(|when, then| {
            when.method(MockMethod::HEAD);
            then.status(200);
        });
        let url = server.url("/dav/");
        let a = args(&["check-webdav", url.as_str()]);
        let client = http::client(&a.common, &a.http).unwrap();
        let report = do_check(&client, &a, now).unwrap();
        delete.assert();
        assert_eq!(report.status(), Status::Critical);
        assert!(report.summary().contains("still exists after DELETE"));
    }

    #[test]
    fn failed_read_back_still_deletes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(MockMethod::PUT);
            then.status(201);
        });
        server.mock(|when, then| {
            when.method(GET);
            then.status(500);
        });
        let delete = server.mock(|when, then| {
            when.method(MockMethod::DELETE);
            then.status(204);
        });
        let url = server.url("/dav/");
        let a = args(&["check-webdav", url.as_str()]);
        let client = http::client(&a.common, &a.http).unwrap();
        match do_check(&client, &a, Utc::now()) {
            Err(CheckError::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected the GET failure, got {:?}", other.map(|r| r.to_string())),
        }
        delete.assert();
    }

    #[test]
    fn parses_credentials() {
        let a = args(&["check-webdav", "https://d/", "-u", "probe"]);
        assert_eq!(a.user.as_deref(), Some("probe"));
        assert!(!a.keep);
    }
}

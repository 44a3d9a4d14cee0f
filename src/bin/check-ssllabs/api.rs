//! The parts of the SSL Labs assessment API (v3) this check uses
//!
//! An assessment is started with `analyze?host=..&startNew=on` and then polled
//! with plain `analyze?host=..` until its status is `READY` or `ERROR`.

use std::thread::sleep;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use campus_plugins::http;
use campus_plugins::Result;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum AssessmentStatus {
    Dns,
    InProgress,
    Ready,
    Error,
}

impl AssessmentStatus {
    pub fn finished(self) -> bool {
        self == AssessmentStatus::Ready || self == AssessmentStatus::Error
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Host {
    pub host: String,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Endpoint {
    pub ip_address: String,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub grade_trust_ignored: Option<String>,
    #[serde(default)]
    pub has_warnings: bool,
}

/// How to start the assessment
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Start {
    /// Always run a fresh assessment
    New,
    /// Reuse a cached result no older than this many hours
    Cached(u32),
}

pub(crate) struct Api<'a> {
    pub client: &'a Client,
    pub base: Url,
}

impl<'a> Api<'a> {
    fn analyze_url(&self, host: &str, start: Option<Start>) -> Result<Url> {
        let mut url = self.base.join("analyze")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("host", host)
                .append_pair("publish", "off")
                .append_pair("all", "done");
            match start {
                Some(Start::New) => {
                    query.append_pair("startNew", "on");
                }
                Some(Start::Cached(hours)) => {
                    query
                        .append_pair("fromCache", "on")
                        .append_pair("maxAge", &hours.to_string());
                }
                None => {}
            }
        }
        Ok(url)
    }

    pub fn analyze(&self, host: &str, start: Option<Start>) -> Result<Host> {
        let url = self.analyze_url(host, start)?;
        http::fetch(self.client.get(url))?.json()
    }

    /// Start an assessment and poll it until it finishes or `max_wait` passes
    ///
    /// The last answer is returned either way, check its status.
    pub fn assess(
        &self,
        host: &str,
        start: Start,
        max_wait: Duration,
        interval: Duration,
    ) -> Result<Host> {
        let deadline = Instant::now() + max_wait;
        let mut answer = self.analyze(host, Some(start))?;
        while !answer.status.finished() && Instant::now() + interval <= deadline {
            tracing::info!(
                "assessment of {} is {:?}: {}",
                host,
                answer.status,
                answer.status_message.as_deref().unwrap_or("")
            );
            sleep(interval);
            answer = self.analyze(host, None)?;
        }
        Ok(answer)
    }
}

#[cfg(test)]
pub(crate) const READY: &str = r#"{"host":"www.example.org","port":443,"protocol":"http",
    "status":"READY","startTime":1700000000000,"endpoints":[
    {"ipAddress":"192.0.2.1","serverName":"www.example.org","statusMessage":"Ready",
     "grade":"A+","gradeTrustIgnored":"A+","hasWarnings":false,"progress":100},
    {"ipAddress":"2001:db8::1","statusMessage":"Ready","grade":"T",
     "gradeTrustIgnored":"B","hasWarnings":true,"progress":100}]}"#;

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;

    fn api<'a>(server: &MockServer, client: &'a Client) -> Api<'a> {
        Api {
            client,
            base: Url::parse(&server.url("/api/v3/")).unwrap(),
        }
    }

    #[test]
    fn parses_answers() {
        let host: Host = serde_json::from_str(READY).unwrap();
        assert_eq!(host.status, AssessmentStatus::Ready);
        assert_eq!(host.endpoints.len(), 2);
        assert_eq!(host.endpoints[1].grade.as_deref(), Some("T"));
        assert!(host.endpoints[1].has_warnings);

        let host: Host =
            serde_json::from_str(r#"{"host":"x","status":"IN_PROGRESS"}"#).unwrap();
        assert!(!host.status.finished());
        assert!(host.endpoints.is_empty());
    }

    #[test]
    fn start_options() {
        let server = MockServer::start();
        let client = Client::new();
        let api = api(&server, &client);
        let url = api.analyze_url("h.example", Some(Start::Cached(24))).unwrap();
        assert!(url.as_str().ends_with("/api/v3/analyze?host=h.example&publish=off&all=done&fromCache=on&maxAge=24"));
        let url = api.analyze_url("h.example", None).unwrap();
        assert!(!url.as_str().contains("startNew"));
    }

    #[test]
    fn polls_until_ready() {
        let server = MockServer::start();
        let start = server.mock(|when, then| {
            when.method(GET).path("/api/v3/analyze").query_param("startNew", "on");
            then.status(200).body(r#"{"host":"www.example.org","status":"DNS"}"#);
        });
        let poll = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v3/analyze")
                .query_param("host", "www.example.org")
                .matches(|req| {
                    !req.query_params
                        .as_ref()
                        .map_or(false, |q| q.iter().any(|(k, _)| k == "startNew"))
                });
            then.status(200).body(READY);
        });
        let client = Client::new();
        let host = api(&server, &client)
            .assess(
                "www.example.org",
                Start::New,
                Duration::from_secs(5),
                Duration::from_millis(10),
            )
            .unwrap();
        start.assert();
        poll.assert();
        assert_eq!(host.status, AssessmentStatus::Ready);
    }

    #[test]
    fn gives_up_after_max_wait() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v3/analyze");
            then.status(200).body(r#"{"host":"slow.example","status":"IN_PROGRESS"}"#);
        });
        let client = Client::new();
        let host = api(&server, &client)
            .assess(
                "slow.example",
                Start::New,
                Duration::from_millis(50),
                Duration::from_millis(20),
            )
            .unwrap();
        assert_eq!(host.status, AssessmentStatus::InProgress);
    }
}

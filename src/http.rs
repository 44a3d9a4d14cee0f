//! Blocking HTTP helpers shared by the web checks

use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use structopt::StructOpt;

use crate::cli::Common;
use crate::error::{CheckError, Result};

#[derive(StructOpt, Debug, Clone)]
pub struct HttpOpts {
    #[structopt(
        short = "k",
        long = "insecure",
        help = "Accept invalid TLS certificates and host names"
    )]
    pub insecure: bool,
    #[structopt(
        long = "user-agent",
        default_value = "campus-plugins",
        help = "User-Agent header to send"
    )]
    pub user_agent: String,
}

/// A fully read response
#[derive(Debug)]
pub struct Fetched {
    pub status: u16,
    pub url: Url,
    pub body: String,
    pub elapsed: Duration,
}

impl Fetched {
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Build a client honouring `--timeout`, `--insecure` and `--user-agent`
///
/// Cookies are kept for the lifetime of the client so that login flows work.
pub fn client(common: &Common, opts: &HttpOpts) -> Result<Client> {
    let client = Client::builder()
        .timeout(common.timeout())
        .user_agent(opts.user_agent.clone())
        .danger_accept_invalid_certs(opts.insecure)
        .danger_accept_invalid_hostnames(opts.insecure)
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Time `f`
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Send a request and read the whole body, timing both
///
/// Any status outside 2xx is an error.
pub fn fetch(request: RequestBuilder) -> Result<Fetched> {
    let (fetched, elapsed) = timed(|| -> Result<(u16, Url, String)> {
        let response = request.send()?;
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            return Err(CheckError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        Ok((status.as_u16(), url, body))
    });
    let (status, url, body) = fetched?;
    tracing::debug!("{} answered {} after {:?}", url, status, elapsed);
    Ok(Fetched {
        status,
        url,
        body,
        elapsed,
    })
}

/// Like `fetch`, for bodies that are not text
pub fn fetch_bytes(request: RequestBuilder) -> Result<Vec<u8>> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(CheckError::HttpStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes()?.to_vec())
}

/// Convenience for `fetch(client.get(url))`
pub fn get(client: &Client, url: &str) -> Result<Fetched> {
    let url = Url::parse(url)?;
    fetch(client.get(url))
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;

    fn client_with(insecure: bool) -> Result<Client> {
        let common = Common {
            timeout: 5,
            verbose: 0,
        };
        let opts = HttpOpts {
            insecure,
            user_agent: "test".into(),
        };
        client(&common, &opts)
    }

    fn test_client() -> Client {
        client_with(false).unwrap()
    }

    #[test]
    fn insecure_clients_build() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/ok");
            then.status(200).body("hello");
        });
        let insecure = client_with(true).unwrap();
        assert_eq!(get(&insecure, &server.url("/ok")).unwrap().body, "hello");
    }

    #[test]
    fn fetch_reads_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ok").header("user-agent", "test");
            then.status(200).body("hello");
        });

        let fetched = get(&test_client(), &server.url("/ok")).unwrap();
        mock.assert();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body, "hello");
    }

    #[test]
    fn non_success_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/down");
            then.status(503);
        });

        match get(&test_client(), &server.url("/down")) {
            Err(CheckError::HttpStatus { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected an HTTP status error, got {:?}", other),
        }
    }

    #[test]
    fn bad_urls_are_unknown() {
        let err = get(&test_client(), "not a url").unwrap_err();
        assert_eq!(err.status(), crate::Status::Unknown);
    }
}

//! Everything that can stop a check from producing a measurement
//!
//! Every error knows which plugin status it should be reported as: failing to
//! talk to the service is the service's problem (`Critical`), failing to make
//! sense of what it said is ours (`Unknown`).

use std::fmt;
use std::io;
use std::result::Result as StdResult;

use derive_more::From;

use crate::status::Status;
use crate::threshold::ThresholdError;

#[derive(Debug, From)]
pub enum CheckError {
    /// Transport level HTTP failures, including timeouts
    Http(reqwest::Error),
    /// The server answered, but not with a 2xx
    #[from(ignore)]
    HttpStatus { url: String, status: u16 },
    Io(io::Error),
    Json(serde_json::Error),
    Regex(regex::Error),
    Url(url::ParseError),
    /// The on-disk state store could not be read or written
    State(sled::Error),
    Threshold(ThresholdError),
    Ldap(ldap3::LdapError),
    Imap(imap::error::Error),
    Dns(hickory_resolver::error::ResolveError),
    Tls(native_tls::Error),
    /// Talking to upsd failed or it answered with an `ERR`
    Nut(rups::ClientError),
    #[from(ignore)]
    Snmp(String),
    /// The peer broke off the conversation, e.g. in the TLS handshake
    #[from(ignore)]
    Protocol(String),
    /// Something the check needs before it can run is missing
    #[from(ignore)]
    Precondition(String),
    /// The response did not have the expected shape
    Unexpected(String),
}

impl CheckError {
    /// The status a plugin should exit with when it hits this error
    pub fn status(&self) -> Status {
        use self::CheckError::*;
        match *self {
            Http(_) | HttpStatus { .. } | Io(_) | Ldap(_) | Imap(_) | Dns(_) | Snmp(_)
            | Nut(_) | Protocol(_) => Status::Critical,
            Json(_) | Regex(_) | Url(_) | State(_) | Threshold(_) | Tls(_) | Precondition(_)
            | Unexpected(_) => Status::Unknown,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> StdResult<(), fmt::Error> {
        use self::CheckError::*;
        match *self {
            Http(ref e) => write!(f, "HTTP request failed: {}", e),
            HttpStatus { ref url, status } => write!(f, "{} returned HTTP {}", url, status),
            Io(ref e) => write!(f, "{}", e),
            Json(ref e) => write!(f, "invalid JSON: {}", e),
            Regex(ref e) => write!(f, "{}", e),
            Url(ref e) => write!(f, "invalid URL: {}", e),
            State(ref e) => write!(f, "state store: {}", e),
            Threshold(ref e) => write!(f, "{}", e),
            Ldap(ref e) => write!(f, "LDAP: {}", e),
            Imap(ref e) => write!(f, "IMAP: {}", e),
            Dns(ref e) => write!(f, "DNS: {}", e),
            Tls(ref e) => write!(f, "TLS: {}", e),
            Nut(ref e) => write!(f, "upsd: {}", e),
            Snmp(ref e) => write!(f, "SNMP: {}", e),
            Protocol(ref e) => write!(f, "{}", e),
            Precondition(ref e) => write!(f, "{}", e),
            Unexpected(ref e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CheckError {}

/// All the results are results with `CheckError`s
pub type Result<T> = StdResult<T, CheckError>;

//! Read a UPS from a Network UPS Tools `upsd`
//!
//! The connection itself is `rups`. What is left here is turning its answer
//! into a map and making sense of the `ups.status` flags.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::time::Duration;

use rups::blocking::Connection;
use rups::{Auth, ConfigBuilder, Host};

use crate::error::Result;

pub const DEFAULT_PORT: u16 = 3493;

/// Every variable `upsd` on `host` knows about `ups`
///
/// Logs in first when a `user` is given.
pub fn list_vars(
    host: &str,
    port: u16,
    user: Option<&str>,
    password: Option<&str>,
    timeout: Duration,
    ups: &str,
) -> Result<BTreeMap<String, String>> {
    let config = ConfigBuilder::new()
        .with_host(Host::try_from((host.to_owned(), port))?)
        .with_auth(user.map(|u| Auth::new(u.to_owned(), password.map(str::to_owned))))
        .with_timeout(timeout)
        .build();
    let mut conn = Connection::new(&config)?;
    let vars = conn
        .list_vars(ups)?
        .into_iter()
        .map(|var| (var.name().to_owned(), var.value().to_string()))
        .collect();
    conn.close()?;
    Ok(vars)
}

/// One flag from `ups.status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsFlag {
    Online,
    OnBattery,
    LowBattery,
    ReplaceBattery,
    Charging,
    Discharging,
    Bypass,
    Calibrating,
    Offline,
    Overloaded,
    Trimming,
    Boosting,
    ForcedShutdown,
    Other(String),
}

impl UpsFlag {
    fn parse(s: &str) -> UpsFlag {
        use self::UpsFlag::*;
        match s {
            "OL" => Online,
            "OB" => OnBattery,
            "LB" => LowBattery,
            "RB" => ReplaceBattery,
            "CHRG" => Charging,
            "DISCHRG" => Discharging,
            "BYPASS" => Bypass,
            "CAL" => Calibrating,
            "OFF" => Offline,
            "OVER" => Overloaded,
            "TRIM" => Trimming,
            "BOOST" => Boosting,
            "FSD" => ForcedShutdown,
            other => Other(other.to_owned()),
        }
    }
}

impl fmt::Display for UpsFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::UpsFlag::*;
        let s = match *self {
            Online => "online",
            OnBattery => "on battery",
            LowBattery => "low battery",
            ReplaceBattery => "replace battery",
            Charging => "charging",
            Discharging => "discharging",
            Bypass => "on bypass",
            Calibrating => "calibrating",
            Offline => "offline",
            Overloaded => "overloaded",
            Trimming => "trimming voltage",
            Boosting => "boosting voltage",
            ForcedShutdown => "forced shutdown",
            Other(ref s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// The space separated flags of `ups.status`, e.g. `OL CHRG`
pub fn parse_status(s: &str) -> Vec<UpsFlag> {
    s.split_whitespace().map(UpsFlag::parse).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// A one-connection upsd that knows `ups1` and records what it was sent
    fn fake_upsd() -> (u16, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut out = stream.try_clone().unwrap();
            let mut seen = Vec::new();
            for line in BufReader::new(stream).lines() {
                let line = line.unwrap();
                let reply = if line == "LIST VAR ups1" {
                    "BEGIN LIST VAR ups1\n\
                     VAR ups1 battery.charge \"87\"\n\
                     VAR ups1 ups.status \"OB DISCHRG\"\n\
                     END LIST VAR ups1\n"
                        .to_owned()
                } else if line.starts_with("LIST VAR ") {
                    "ERR UNKNOWN-UPS\n".to_owned()
                } else if line == "LOGOUT" {
                    "OK Goodbye\n".to_owned()
                } else if line.starts_with("USERNAME ") || line.starts_with("PASSWORD ") {
                    "OK\n".to_owned()
                } else {
                    "ERR UNKNOWN-COMMAND\n".to_owned()
                };
                seen.push(line.clone());
                out.write_all(reply.as_bytes()).unwrap();
                if line == "LOGOUT" {
                    break;
                }
            }
            seen
        });
        (port, handle)
    }

    #[test]
    fn lists_variables() {
        let (port, upsd) = fake_upsd();
        let vars = list_vars(
            "127.0.0.1",
            port,
            Some("monitor"),
            Some("secret"),
            Duration::from_secs(5),
            "ups1",
        )
        .unwrap();
        assert_eq!(vars["battery.charge"], "87");
        assert_eq!(vars["ups.status"], "OB DISCHRG");
        let seen = upsd.join().unwrap();
        assert!(seen.contains(&"USERNAME monitor".to_owned()));
        assert!(seen.contains(&"LIST VAR ups1".to_owned()));
    }

    #[test]
    fn unknown_ups_is_critical() {
        let (port, _upsd) = fake_upsd();
        let err = list_vars("127.0.0.1", port, None, None, Duration::from_secs(5), "nope")
            .unwrap_err();
        assert_eq!(err.status(), crate::Status::Critical);
    }

    #[test]
    fn status_flags() {
        assert_eq!(
            parse_status("OL CHRG"),
            vec![UpsFlag::Online, UpsFlag::Charging]
        );
        assert_eq!(
            parse_status("OB LB WAT"),
            vec![
                UpsFlag::OnBattery,
                UpsFlag::LowBattery,
                UpsFlag::Other("WAT".into())
            ]
        );
        assert_eq!(UpsFlag::OnBattery.to_string(), "on battery");
    }
}

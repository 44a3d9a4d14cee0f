//! The four plugin states and their exit codes

use std::fmt;
use std::process;
use std::str::FromStr;

/// The result of a check, in increasing order of severity
///
/// `Unknown` sorts above `Critical` so that `max` over a set of results
/// surfaces a check that could not be evaluated at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    #[cfg_attr(test, allow(dead_code))]
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    /// Every spelling accepted by `from_str`, for use as `possible_values`
    pub fn str_values() -> [&'static str; 6] {
        ["ok", "warn", "warning", "crit", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        f.pad(s)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Status, String> {
        match s.to_ascii_lowercase().as_ref() {
            "ok" => Ok(Status::Ok),
            "warn" | "warning" => Ok(Status::Warning),
            "crit" | "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(format!(
                "Unexpected status '{}', expected one of: {}",
                s,
                Status::str_values().join(", ")
            )),
        }
    }
}

impl Default for Status {
    fn default() -> Status {
        Status::Ok
    }
}

#[cfg(test)]
mod test {
    use super::Status;
    use std::cmp::max;

    #[test]
    fn severity_ordering() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Critical < Status::Unknown);
        assert_eq!(max(Status::Warning, Status::Critical), Status::Critical);
    }

    #[test]
    fn parses_every_advertised_spelling() {
        for s in Status::str_values().iter() {
            s.parse::<Status>().unwrap();
        }
        assert_eq!("WARN".parse::<Status>(), Ok(Status::Warning));
        assert!("bad".parse::<Status>().is_err());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Unknown.code(), 3);
        assert_eq!(Status::Critical.to_string(), "CRITICAL");
    }
}

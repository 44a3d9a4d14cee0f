//! Nagios threshold ranges
//!
//! A range is written `[@]start:end`. Without the `@` a value alerts when it
//! falls *outside* `start..=end`; with it, when it falls *inside*. Either
//! side may be left open:
//!
//! | Range    | Alert when          |
//! |----------|---------------------|
//! | `10`     | `< 0` or `> 10`     |
//! | `10:`    | `< 10`              |
//! | `~:10`   | `> 10`              |
//! | `10:20`  | `< 10` or `> 20`    |
//! | `@10:20` | `>= 10` and `<= 20` |

use std::fmt;
use std::str::FromStr;

use crate::status::Status;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ThresholdError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid threshold '{}': {}", self.input, self.reason)
    }
}

/// One `[@]start:end` range
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Range {
    pub start: f64,
    pub end: f64,
    pub alert_inside: bool,
}

impl Range {
    /// A range that alerts when a value is greater than `end`
    pub fn upto(end: f64) -> Range {
        Range {
            start: f64::NEG_INFINITY,
            end,
            alert_inside: false,
        }
    }

    /// A range that alerts when a value is less than `start`
    pub fn atleast(start: f64) -> Range {
        Range {
            start,
            end: f64::INFINITY,
            alert_inside: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Whether `value` should raise an alert against this range
    pub fn alerts(&self, value: f64) -> bool {
        if self.alert_inside {
            self.contains(value)
        } else {
            !self.contains(value)
        }
    }
}

fn parse_bound(input: &str, s: &str, open: f64) -> Result<f64, ThresholdError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(open);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Err(ThresholdError {
            input: input.to_owned(),
            reason: "NaN is not a valid bound",
        }),
        Ok(v) => Ok(v),
        Err(_) => Err(ThresholdError {
            input: input.to_owned(),
            reason: "bounds must be numbers",
        }),
    }
}

impl FromStr for Range {
    type Err = ThresholdError;

    fn from_str(input: &str) -> Result<Range, ThresholdError> {
        let trimmed = input.trim();
        let (alert_inside, bounds) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if bounds.is_empty() {
            return Err(ThresholdError {
                input: input.to_owned(),
                reason: "empty range",
            });
        }

        let (start, end) = match bounds.find(':') {
            Some(idx) => {
                let (start, end) = (&bounds[..idx], &bounds[idx + 1..]);
                let start = if start.trim() == "~" {
                    f64::NEG_INFINITY
                } else {
                    parse_bound(input, start, 0.0)?
                };
                (start, parse_bound(input, end, f64::INFINITY)?)
            }
            None => (0.0, parse_bound(input, bounds, f64::INFINITY)?),
        };

        if start > end {
            return Err(ThresholdError {
                input: input.to_owned(),
                reason: "start must not be greater than end",
            });
        }
        Ok(Range {
            start,
            end,
            alert_inside,
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.alert_inside {
            write!(f, "@")?;
        }
        let start = if self.start == f64::NEG_INFINITY {
            "~".to_owned()
        } else {
            self.start.to_string()
        };
        if self.end == f64::INFINITY {
            write!(f, "{}:", start)
        } else if self.start == 0.0 {
            write!(f, "{}", self.end)
        } else {
            write!(f, "{}:{}", start, self.end)
        }
    }
}

/// A warning and a critical range for one measured value
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Thresholds {
    pub warning: Option<Range>,
    pub critical: Option<Range>,
}

impl Thresholds {
    pub fn new(warning: Option<Range>, critical: Option<Range>) -> Thresholds {
        Thresholds { warning, critical }
    }

    /// The worst status `value` earns, critical is checked first
    pub fn evaluate(&self, value: f64) -> Status {
        if self.critical.map_or(false, |r| r.alerts(value)) {
            Status::Critical
        } else if self.warning.map_or(false, |r| r.alerts(value)) {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    /// The range responsible for `status`, used to explain alerts
    pub fn violated(&self, status: Status) -> Option<Range> {
        match status {
            Status::Critical => self.critical,
            Status::Warning => self.warning,
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn r(s: &str) -> Range {
        s.parse().unwrap()
    }

    #[test]
    fn plain_number_is_zero_to_n() {
        let range = r("10");
        assert_eq!(range.start, 0.0);
        assert_eq!(range.end, 10.0);
        assert!(range.alerts(-1.0));
        assert!(range.alerts(10.5));
        assert!(!range.alerts(0.0));
        assert!(!range.alerts(10.0));
    }

    #[test]
    fn open_ended_ranges() {
        let atleast = r("10:");
        assert!(atleast.alerts(9.9));
        assert!(!atleast.alerts(1e12));

        let upto = r("~:10");
        assert!(upto.alerts(10.1));
        assert!(!upto.alerts(-1e12));
        assert_eq!(upto, Range::upto(10.0));
    }

    #[test]
    fn bounded_and_inverted() {
        let outside = r("10:20");
        assert!(outside.alerts(9.0));
        assert!(outside.alerts(21.0));
        assert!(!outside.alerts(15.0));

        let inside = r("@10:20");
        assert!(inside.alerts(10.0));
        assert!(inside.alerts(20.0));
        assert!(!inside.alerts(21.0));
        assert!(!inside.alerts(9.0));
    }

    #[test]
    fn empty_start_means_zero() {
        assert_eq!(r(":5"), r("0:5"));
        assert_eq!(r("2.5:"), Range::atleast(2.5));
    }

    #[test]
    fn rejects_bad_ranges() {
        assert_eq!(
            "".parse::<Range>().unwrap_err().reason,
            "empty range"
        );
        assert_eq!(
            "@".parse::<Range>().unwrap_err().reason,
            "empty range"
        );
        assert_eq!(
            "20:10".parse::<Range>().unwrap_err().reason,
            "start must not be greater than end"
        );
        assert!("ten".parse::<Range>().is_err());
        assert!("1:x".parse::<Range>().is_err());
        assert!("NaN".parse::<Range>().is_err());
    }

    #[test]
    fn displays_in_nagios_syntax() {
        for s in &["10", "10:", "~:10", "10:20", "@10:20", "@5", "1.5:2.5", "-5:"] {
            assert_eq!(r(s).to_string(), *s);
        }
    }

    #[test]
    fn evaluate_prefers_critical() {
        let t = Thresholds::new(Some(r("5")), Some(r("10")));
        assert_eq!(t.evaluate(1.0), Status::Ok);
        assert_eq!(t.evaluate(7.0), Status::Warning);
        assert_eq!(t.evaluate(11.0), Status::Critical);
        assert_eq!(t.violated(Status::Critical), Some(r("10")));

        let none = Thresholds::default();
        assert_eq!(none.evaluate(1e9), Status::Ok);

        let crit_only = Thresholds::new(None, Some(r("1:")));
        assert_eq!(crit_only.evaluate(0.0), Status::Critical);
        assert_eq!(crit_only.evaluate(3.0), Status::Ok);
    }
}

//! Performance data, the part of a plugin's output after the `|`
//!
//! Each entry is rendered as `'label'=value[uom];[warn];[crit];[min];[max]`.

use std::fmt;

use crate::threshold::{Range, Thresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: f64,
    pub uom: &'static str,
    pub warning: Option<Range>,
    pub critical: Option<Range>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PerfData {
    pub fn new<S: Into<String>>(label: S, value: f64) -> PerfData {
        PerfData {
            label: label.into(),
            value,
            uom: "",
            warning: None,
            critical: None,
            min: None,
            max: None,
        }
    }

    /// Unit of measurement, e.g. `s`, `%`, `B` or `c` for counters
    pub fn uom(mut self, uom: &'static str) -> PerfData {
        self.uom = uom;
        self
    }

    pub fn thresholds(mut self, thresholds: &Thresholds) -> PerfData {
        self.warning = thresholds.warning;
        self.critical = thresholds.critical;
        self
    }

    pub fn min(mut self, min: f64) -> PerfData {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> PerfData {
        self.max = Some(max);
        self
    }
}

/// Print a number without a trailing `.0` or float noise
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

fn quote_label(label: &str) -> String {
    if label
        .chars()
        .any(|c| c.is_whitespace() || c == '=' || c == '\'')
    {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_owned()
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut fields = vec![
            self.warning.map(|r| r.to_string()).unwrap_or_default(),
            self.critical.map(|r| r.to_string()).unwrap_or_default(),
            self.min.map(format_value).unwrap_or_default(),
            self.max.map(format_value).unwrap_or_default(),
        ];
        while fields.last().map_or(false, |s| s.is_empty()) {
            fields.pop();
        }

        write!(
            f,
            "{}={}{}",
            quote_label(&self.label),
            format_value(self.value),
            self.uom
        )?;
        for field in fields {
            write!(f, ";{}", field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn minimal_entry() {
        assert_eq!(PerfData::new("count", 3.0).to_string(), "count=3");
    }

    #[test]
    fn full_entry() {
        let t = Thresholds::new(Some("1".parse().unwrap()), Some("2".parse().unwrap()));
        let pd = PerfData::new("time", 0.25)
            .uom("s")
            .thresholds(&t)
            .min(0.0)
            .max(10.0);
        assert_eq!(pd.to_string(), "time=0.25s;1;2;0;10");
    }

    #[test]
    fn keeps_inner_empty_fields() {
        let pd = PerfData::new("load", 5.5).uom("%").min(0.0).max(100.0);
        assert_eq!(pd.to_string(), "load=5.5%;;;0;100");

        let t = Thresholds::new(None, Some("@0:3".parse().unwrap()));
        let pd = PerfData::new("entries", 1.0).thresholds(&t);
        assert_eq!(pd.to_string(), "entries=1;;@3");
    }

    #[test]
    fn quotes_labels_when_needed() {
        assert_eq!(PerfData::new("a b", 1.0).to_string(), "'a b'=1");
        assert_eq!(PerfData::new("it's", 1.0).to_string(), "'it''s'=1");
        assert_eq!(PerfData::new("plain_label", 1.0).to_string(), "plain_label=1");
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(0.1 + 0.2), "0.3");
        assert_eq!(format_value(1.234567891), "1.234568");
    }
}

use std::fmt;
use std::str::FromStr;

/// SSL Labs grades, worst first so that the derived ordering ranks them
///
/// `T` (certificate not trusted) and `M` (certificate name mismatch) rank
/// below `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Grade {
    M,
    T,
    F,
    E,
    D,
    C,
    B,
    AMinus,
    A,
    APlus,
}

impl Grade {
    /// Numeric value for perfdata, 0 for M up to 9 for A+
    pub fn score(self) -> u8 {
        self as u8
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Grade, String> {
        use self::Grade::*;
        Ok(match s.trim().to_uppercase().as_str() {
            "A+" => APlus,
            "A" => A,
            "A-" => AMinus,
            "B" => B,
            "C" => C,
            "D" => D,
            "E" => E,
            "F" => F,
            "T" => T,
            "M" => M,
            _ => return Err(format!("'{}' is not an SSL Labs grade", s)),
        })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Grade::*;
        let s = match *self {
            APlus => "A+",
            A => "A",
            AMinus => "A-",
            B => "B",
            C => "C",
            D => "D",
            E => "E",
            F => "F",
            T => "T",
            M => "M",
        };
        f.pad(s)
    }
}

#[cfg(test)]
mod test {
    use super::Grade;

    fn g(s: &str) -> Grade {
        s.parse().unwrap()
    }

    #[test]
    fn ordering() {
        assert!(g("A+") > g("A"));
        assert!(g("A") > g("a-"));
        assert!(g("A-") > g("B"));
        assert!(g("F") > g("T"));
        assert!(g("T") > g("M"));
        assert_eq!(g("A+").score(), 9);
        assert_eq!(g("M").score(), 0);
    }

    #[test]
    fn display_round_trips() {
        for s in &["A+", "A", "A-", "B", "C", "D", "E", "F", "T", "M"] {
            assert_eq!(g(s).to_string(), *s);
        }
        assert!("A++".parse::<Grade>().is_err());
    }
}

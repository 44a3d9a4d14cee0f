//! Dotted numeric versions, e.g. `10.13.4`
//!
//! Only the leading numeric components are compared; anything after the
//! first non-numeric component (`-beta`, `RC1`) is kept for display only.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Eq)]
pub struct Version {
    parts: Vec<u64>,
    original: String,
}

impl Version {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Version, String> {
        let trimmed = s.trim().trim_start_matches(|c| c == 'v' || c == 'V');
        let parts: Vec<u64> = trimmed
            .split('.')
            .map(|p| {
                let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
                (digits.len() == p.len(), digits.parse::<u64>())
            })
            .scan(true, |keep_going, (whole, parsed)| {
                if !*keep_going {
                    return None;
                }
                *keep_going = whole;
                parsed.ok()
            })
            .collect();
        if parts.is_empty() {
            return Err(format!("'{}' is not a version number", s));
        }
        Ok(Version {
            parts,
            original: s.trim().to_owned(),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Version) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let l = self.parts.get(i).cloned().unwrap_or(0);
            let r = other.parts.get(i).cloned().unwrap_or(0);
            match l.cmp(&r) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Version) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

#[cfg(test)]
mod test {
    use super::Version;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn compares_numerically() {
        assert!(v("10.2.0") > v("9.12.99"));
        assert!(v("1.10") > v("1.9"));
        assert_eq!(v("1.2"), v("1.2.0"));
        assert!(v("v2.0.1") > v("2.0"));
    }

    #[test]
    fn ignores_suffixes() {
        assert_eq!(v("10.13.4-beta").parts(), &[10, 13, 4]);
        assert_eq!(v("8.7.1 RC").to_string(), "8.7.1 RC");
        assert_eq!(v("3.x.1").parts(), &[3]);
    }

    #[test]
    fn rejects_garbage() {
        assert!("dev-master".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }
}

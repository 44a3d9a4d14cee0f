//! Values remembered between plugin runs
//!
//! Every monitored target gets its own `sled` database below
//! `<state dir>/<plugin>/`. sled locks a database for a single process, and
//! monitoring systems run checks against different targets in parallel.
//! Values are stored as JSON so that a database can be inspected by hand, and
//! every write is flushed before the plugin exits.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};

pub struct StateStore {
    db: sled::Db,
    path: PathBuf,
}

impl StateStore {
    /// Open (creating if needed) the store `plugin` keeps for `target`
    pub fn open<P: AsRef<Path>>(dir: P, plugin: &str, target: &str) -> Result<StateStore> {
        let path = dir.as_ref().join(plugin).join(file_name(target));
        fs::create_dir_all(&path).map_err(|e| {
            CheckError::Precondition(format!("cannot create {}: {}", path.display(), e))
        })?;
        let db = sled::open(&path)?;
        tracing::debug!("opened state store at {}", path.display());
        Ok(StateStore { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.db.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    CheckError::Unexpected(format!(
                        "corrupt state for '{}' in {}: {}",
                        key,
                        self.path.display(),
                        e
                    ))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}

/// `target` (a host or URL) as a single path component
fn file_name(target: &str) -> String {
    let name: String = target
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    match name.trim_start_matches('.') {
        "" => "_".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

/// A monotonically increasing counter read at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterSample {
    pub value: u64,
    pub at: DateTime<Utc>,
}

impl CounterSample {
    pub fn now(value: u64) -> CounterSample {
        CounterSample {
            value,
            at: Utc::now(),
        }
    }

    /// Per-second increase since `previous`
    ///
    /// `None` if the counter went backwards (the service restarted) or no
    /// time has passed.
    pub fn rate_since(&self, previous: &CounterSample) -> Option<f64> {
        if self.value < previous.value {
            return None;
        }
        let elapsed = self.at.signed_duration_since(previous.at).num_milliseconds();
        if elapsed <= 0 {
            return None;
        }
        Some((self.value - previous.value) as f64 / (elapsed as f64 / 1000.0))
    }

    /// Absolute increase since `previous`, `None` after a reset
    pub fn delta_since(&self, previous: &CounterSample) -> Option<u64> {
        self.value.checked_sub(previous.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = StateStore::open(dir.path(), "check-test", "web1").unwrap();
            store.put("https://example.org/", &CounterSample::now(5)).unwrap();
            store.put("gone", &1u32).unwrap();
            store.remove("gone").unwrap();
        }
        let store = StateStore::open(dir.path(), "check-test", "web1").unwrap();
        let sample: CounterSample = store.get("https://example.org/").unwrap().unwrap();
        assert_eq!(sample.value, 5);
        assert_eq!(store.get::<u32>("gone").unwrap(), None);
        assert_eq!(store.get::<u32>("never").unwrap(), None);
    }

    #[test]
    fn targets_open_side_by_side() {
        let dir = tempfile::tempdir().unwrap();
        let first = StateStore::open(dir.path(), "check-test", "http://web1/status").unwrap();
        let second = StateStore::open(dir.path(), "check-test", "http://web2/status").unwrap();
        first.put("k", &1u32).unwrap();
        second.put("k", &2u32).unwrap();
        assert_eq!(first.get::<u32>("k").unwrap(), Some(1));
        assert_eq!(second.get::<u32>("k").unwrap(), Some(2));
        assert_eq!(
            first.path(),
            dir.path().join("check-test").join("http___web1_status")
        );
    }

    #[test]
    fn target_names_stay_inside_the_plugin_dir() {
        assert_eq!(file_name("web1.example.org"), "web1.example.org");
        assert_eq!(file_name("../../etc"), "_.._etc");
        assert_eq!(file_name(".."), "_");
        assert_eq!(file_name("2001:db8::1"), "2001_db8__1");
    }

    #[test]
    fn corrupt_values_are_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path(), "check-test", "web1").unwrap();
        store.put("k", &"a string").unwrap();
        let err = store.get::<CounterSample>("k").unwrap_err();
        assert_eq!(err.status(), crate::Status::Unknown);
    }

    #[test]
    fn rates() {
        let earlier = CounterSample::now(100);
        let later = CounterSample {
            value: 160,
            at: earlier.at + Duration::seconds(30),
        };
        assert_eq!(later.rate_since(&earlier), Some(2.0));
        assert_eq!(later.delta_since(&earlier), Some(60));

        let restarted = CounterSample {
            value: 3,
            at: later.at + Duration::seconds(30),
        };
        assert_eq!(restarted.rate_since(&later), None);
        assert_eq!(restarted.delta_since(&later), None);
        assert_eq!(earlier.rate_since(&earlier), None);
    }
}

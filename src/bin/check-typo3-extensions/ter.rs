//! The TYPO3 Extension Repository index
//!
//! TER publishes every release of every extension in one (large) XML file:
//!
//! ```plain
//! <extensions>
//!   <extension extensionkey="news">
//!     <version version="8.5.2">
//!       <reviewstate>0</reviewstate>
//!       ...
//!     </version>
//!   </extension>
//! </extensions>
//! ```
//!
//! A `reviewstate` of -1 marks a release with a known security issue. Only the
//! attributes needed for that are extracted.

use std::collections::HashMap;
use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;
use regex::Regex;
use reqwest::blocking::Client;

use campus_plugins::http;
use campus_plugins::version::Version;
use campus_plugins::{CheckError, Result};

const INSECURE: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Release {
    pub version: Version,
    pub reviewstate: i32,
}

impl Release {
    pub fn insecure(&self) -> bool {
        self.reviewstate == INSECURE
    }
}

#[derive(Debug, Default)]
pub(crate) struct Index {
    releases: HashMap<String, Vec<Release>>,
}

impl Index {
    pub fn parse(xml: &str) -> Result<Index> {
        let extension_re =
            Regex::new(r#"(?s)<extension\s+extensionkey="([^"]+)"\s*>(.*?)</extension>"#)?;
        let version_re = Regex::new(r#"(?s)<version\s+version="([^"]+)"\s*>(.*?)</version>"#)?;
        let review_re = Regex::new(r"<reviewstate>\s*(-?\d+)\s*</reviewstate>")?;

        let mut releases = HashMap::new();
        for ext in extension_re.captures_iter(xml) {
            let versions: Vec<Release> = version_re
                .captures_iter(&ext[2])
                .filter_map(|v| {
                    let version = v[1].parse().ok()?;
                    let reviewstate = review_re
                        .captures(&v[2])
                        .and_then(|r| r[1].parse().ok())
                        .unwrap_or(0);
                    Some(Release {
                        version,
                        reviewstate,
                    })
                })
                .collect();
            releases.insert(ext[1].to_owned(), versions);
        }
        if releases.is_empty() {
            return Err(CheckError::Unexpected(
                "the extension index does not list any extensions".to_owned(),
            ));
        }
        tracing::debug!("extension index lists {} extensions", releases.len());
        Ok(Index { releases })
    }

    /// Accept plain or gzipped XML
    pub fn from_bytes(bytes: &[u8]) -> Result<Index> {
        if bytes.starts_with(&[0x1f, 0x8b]) {
            let mut xml = String::new();
            GzDecoder::new(bytes).read_to_string(&mut xml)?;
            Index::parse(&xml)
        } else {
            Index::parse(&String::from_utf8_lossy(bytes))
        }
    }

    /// Download `source` if it is a URL, read it from disk otherwise
    pub fn load(client: &Client, source: &str) -> Result<Index> {
        let bytes = if source.starts_with("http://") || source.starts_with("https://") {
            http::fetch_bytes(client.get(source))?
        } else {
            fs::read(source).map_err(|e| {
                CheckError::Precondition(format!("cannot read extension index {}: {}", source, e))
            })?
        };
        Index::from_bytes(&bytes)
    }

    pub fn release(&self, key: &str, version: &Version) -> Option<&Release> {
        self.releases
            .get(key)?
            .iter()
            .find(|r| &r.version == version)
    }

    pub fn knows(&self, key: &str) -> bool {
        self.releases.contains_key(key)
    }

    /// The highest release not marked insecure
    pub fn newest_secure(&self, key: &str) -> Option<&Version> {
        self.releases
            .get(key)?
            .iter()
            .filter(|r| !r.insecure())
            .map(|r| &r.version)
            .max()
    }
}

#[cfg(test)]
pub(crate) const SAMPLE: &str = r#"<?xml version="1.0" standalone="yes" ?>
<extensions>
  <extension extensionkey="news">
    <downloadcounter>100</downloadcounter>
    <version version="8.5.1">
      <title>News</title>
      <reviewstate>-1</reviewstate>
    </version>
    <version version="8.5.2">
      <reviewstate>0</reviewstate>
    </version>
    <version version="9.0.0">
      <reviewstate>0</reviewstate>
    </version>
  </extension>
  <extension extensionkey="powermail">
    <version version="8.0.0">
      <reviewstate>0</reviewstate>
    </version>
    <version version="8.1.0">
      <reviewstate>-1</reviewstate>
    </version>
  </extension>
</extensions>
"#;

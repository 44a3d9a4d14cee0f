//! Find the extensions installed in a TYPO3 instance

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;

use campus_plugins::version::Version;
use campus_plugins::{CheckError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Installed {
    pub key: String,
    pub version: Version,
}

/// The `'version' => '1.2.3'` entry of an `ext_emconf.php`
pub(crate) fn emconf_version(php: &str) -> Option<Version> {
    let re = Regex::new(r#"['"]version['"]\s*=>\s*['"]([^'"]+)['"]"#).unwrap();
    re.captures(php).and_then(|c| c[1].parse().ok())
}

/// Every extension below `<root>/typo3conf/ext`, sorted by key
///
/// Directories without a readable version are skipped with a log message.
pub(crate) fn scan(root: &Path) -> Result<Vec<Installed>> {
    let ext_dir = root.join("typo3conf").join("ext");
    let entries = fs::read_dir(&ext_dir).map_err(|e| {
        CheckError::Precondition(format!("cannot list {}: {}", ext_dir.display(), e))
    })?;

    let mut installed = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let key = entry.file_name().to_string_lossy().into_owned();
        let emconf = entry.path().join("ext_emconf.php");
        let php = match fs::read_to_string(&emconf) {
            Ok(php) => php,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("{} has no ext_emconf.php, skipping", key);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        match emconf_version(&php) {
            Some(version) => installed.push(Installed { key, version }),
            None => tracing::warn!("no version in {}", emconf.display()),
        }
    }
    installed.sort_by(|l, r| l.key.cmp(&r.key));
    Ok(installed)
}

//! Regenerate `src/scripts.rs` from the `--help` output of every check
//!
//! Run from the repository root after `cargo build`:
//!
//! ```plain
//! cargo run -p make-docs > src/scripts.rs
//! ```

use std::process::Command;

struct Check {
    name: &'static str,
    about: &'static str,
}

const CHECKS: &[Check] = &[
    Check {
        name: "check-webmail",
        about: "Logs into a Roundcube webmail with a test account.",
    },
    Check {
        name: "check-campusonline",
        about: "Fetches a CAMPUSonline page and looks for a marker.",
    },
    Check {
        name: "check-php-fpm",
        about: "Reads the JSON status page of a PHP-FPM pool.",
    },
    Check {
        name: "check-owncloud",
        about: "Reads `status.php` of an ownCloud or Nextcloud server.",
    },
    Check {
        name: "check-webdav",
        about: "Writes, reads back and deletes a probe file on a WebDAV share.",
    },
    Check {
        name: "check-imap-folders",
        about: "Counts the folders (or messages) of an IMAP account, IMAPS only.",
    },
    Check {
        name: "check-ldap-search",
        about: "Counts the entries an LDAP search returns.",
    },
    Check {
        name: "check-dns",
        about: "Times a DNS query and checks the answer.",
    },
    Check {
        name: "check-ups",
        about: "Asks a Network UPS Tools `upsd` about a UPS.",
    },
    Check {
        name: "check-typo3-extensions",
        about: "Audits installed TYPO3 extensions against the extension repository. \
                Needs read access to the TYPO3 installation.",
    },
    Check {
        name: "check-nginx-stats",
        about: "Reads the nginx `stub_status` page. Keeps state between runs.",
    },
    Check {
        name: "check-security-updates",
        about: "Reads the number of pending security updates from a net-snmp `extend`. \
                Keeps state between runs.",
    },
    Check {
        name: "check-ssllabs",
        about: "Grades a public TLS server through the SSL Labs API. Can take minutes.",
    },
];

fn main() {
    let preamble = "Documentation about the checks contained herein\n";

    let mut out: String = cp(preamble.split('\n'));
    out.push('\n');
    out.push_str(&cp(CHECKS.iter().map(|c| format!("- [{0}](#{0})", c.name))));
    out.push('\n');
    for check in CHECKS {
        out.push_str(&format!(
            "\
//!
//! # {0}
//!
//! {1}
//!
//! ```plain
//! $ {0} --help
",
            check.name, check.about
        ));
        let output = Command::new(&format!("target/debug/{}", check.name))
            .arg("--help")
            .output()
            .unwrap_or_else(|e| panic!("Couldn't execute {}: {}", check.name, e));
        let help = String::from_utf8(output.stdout)
            .unwrap_or_else(|e| panic!("{} --help is not utf8: {}", check.name, e));
        out.push_str(&cp(help.trim_end().split('\n')));
        out.push_str("\n//! ```\n");
    }
    print!("{}", out);
}

/// Comment each line in the iterator
fn cp<S: AsRef<str>, I: Iterator<Item = S>>(s: I) -> String {
    s.map(|s| format!("//! {}", s.as_ref()))
        .map(|s| s.trim().into())
        .collect::<Vec<String>>()
        .join("\n")
}

//! Documentation about the checks contained herein
//!
//! - [check-webmail](#check-webmail)
//! - [check-campusonline](#check-campusonline)
//! - [check-php-fpm](#check-php-fpm)
//! - [check-owncloud](#check-owncloud)
//! - [check-webdav](#check-webdav)
//! - [check-imap-folders](#check-imap-folders)
//! - [check-ldap-search](#check-ldap-search)
//! - [check-dns](#check-dns)
//! - [check-ups](#check-ups)
//! - [check-typo3-extensions](#check-typo3-extensions)
//! - [check-nginx-stats](#check-nginx-stats)
//! - [check-security-updates](#check-security-updates)
//! - [check-ssllabs](#check-ssllabs)
//!
//! # check-webmail
//!
//! Logs into a Roundcube webmail with a test account.
//!
//! ```plain
//! $ check-webmail --help
//! check-webmail (part of campus-plugins) 0.1.0
//! Log into a Roundcube webmail installation with a test account.
//!
//! Loads the login form, posts the credentials and checks that the mailbox view comes back. The warning and critical
//! ranges apply to the total time in seconds.
//!
//! USAGE:
//!     check-webmail [FLAGS] [OPTIONS] <url> --password <password> --user <user>
//!
//! FLAGS:
//!     -h, --help
//!             Prints help information
//!
//!     -k, --insecure
//!             Accept invalid TLS certificates and host names
//!
//!         --logout
//!             Log out again after a successful login
//!
//!     -V, --version
//!             Prints version information
//!
//!     -v, --verbose
//!             Log diagnostics to stderr, repeat for more detail
//!
//!
//! OPTIONS:
//!     -c, --critical <critical>
//!             Critical range, [@]start:end
//!
//!     -e, --expect <expect>
//!             Regex the page after login has to match instead of the mailbox view
//!
//!     -p, --password <password>
//!             Password of the test account [env: WEBMAIL_PASSWORD]
//!
//!     -t, --timeout <seconds>
//!             Seconds before network operations are abandoned [default: 10]
//!
//!     -u, --user <user>
//!             Login name of the test account
//!
//!         --user-agent <user-agent>
//!             User-Agent header to send [default: campus-plugins]
//!
//!     -w, --warning <warning>
//!             Warning range, [@]start:end
//!
//!
//! ARGS:
//!     <url>
//!             URL of the webmail, e.g. https://webmail.example.org/
//! ```
//!
//! # check-campusonline
//!
//! Fetches a CAMPUSonline page and looks for a marker.
//!
//! ```plain
//! $ check-campusonline --help
//! check-campusonline (part of campus-plugins) 0.1.0
//! Check that a CAMPUSonline portal page loads and contains what it should.
//!
//! The warning and critical ranges apply to the response time in seconds.
//!
//! USAGE:
//!     check-campusonline [FLAGS] [OPTIONS] <url>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!     -k, --insecure    Accept invalid TLS certificates and host names
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>        Critical range, [@]start:end
//!     -e, --expect <expect>            Regex the page body has to match [default: CAMPUSonline]
//!     -t, --timeout <seconds>          Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>    User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>          Warning range, [@]start:end
//!
//! ARGS:
//!     <url>    The portal page to load, e.g. https://online.example.org/co/
//! ```
//!
//! # check-php-fpm
//!
//! Reads the JSON status page of a PHP-FPM pool.
//!
//! ```plain
//! $ check-php-fpm --help
//! check-php-fpm (part of campus-plugins) 0.1.0
//! Check how busy a PHP-FPM pool is.
//!
//! The warning and critical ranges apply to the percentage of the pool's processes that are currently serving a request.
//!
//! USAGE:
//!     check-php-fpm [FLAGS] [OPTIONS] <url>
//!
//! FLAGS:
//!     -h, --help                   Prints help information
//!         --ignore-max-children    Do not warn when the pool has hit pm.max_children since it started
//!     -k, --insecure               Accept invalid TLS certificates and host names
//!     -V, --version                Prints version information
//!     -v, --verbose                Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>                Critical range, [@]start:end
//!         --queue-critical <queue-critical>    Critical range for the listen queue
//!         --queue-warning <queue-warning>      Warning range for the listen queue
//!     -t, --timeout <seconds>                  Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>            User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>                  Warning range, [@]start:end
//!
//! ARGS:
//!     <url>    URL of the pool's pm.status_path, e.g. http://localhost/fpm-status
//! ```
//!
//! # check-owncloud
//!
//! Reads `status.php` of an ownCloud or Nextcloud server.
//!
//! ```plain
//! $ check-owncloud --help
//! check-owncloud (part of campus-plugins) 0.1.0
//! Check that an ownCloud instance is installed, not in maintenance mode and does not need a database upgrade.
//!
//! The warning and critical ranges apply to the response time in seconds.
//!
//! USAGE:
//!     check-owncloud [FLAGS] [OPTIONS] <url>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!     -k, --insecure    Accept invalid TLS certificates and host names
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>          Critical range, [@]start:end
//!         --min-version <min-version>    Warn if the instance reports a version older than this
//!     -t, --timeout <seconds>            Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>      User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>            Warning range, [@]start:end
//!
//! ARGS:
//!     <url>    Base URL of the instance, e.g. https://cloud.example.org
//! ```
//!
//! # check-webdav
//!
//! Writes, reads back and deletes a probe file on a WebDAV share.
//!
//! ```plain
//! $ check-webdav --help
//! check-webdav (part of campus-plugins) 0.1.0
//! Check that a WebDAV collection can be written to, read from and cleaned up.
//!
//! Uploads a small probe file with PUT, downloads it with GET and compares the contents, then removes it with DELETE.
//! Every step is timed; the warning and critical ranges apply to the total time in seconds.
//!
//! USAGE:
//!     check-webdav [FLAGS] [OPTIONS] <url>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!     -k, --insecure    Accept invalid TLS certificates and host names
//!         --keep        Do not delete the probe file afterwards
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>        Critical range, [@]start:end
//!     -p, --password <password>        Password for basic authentication [env: WEBDAV_PASSWORD]
//!     -t, --timeout <seconds>          Seconds before network operations are abandoned [default: 10]
//!     -u, --user <user>                User for basic authentication
//!         --user-agent <user-agent>    User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>          Warning range, [@]start:end
//!
//! ARGS:
//!     <url>    URL of a writable collection, e.g. https://dav.example.org/probe/
//! ```
//!
//! # check-imap-folders
//!
//! Counts the folders (or messages) of an IMAP account, IMAPS only.
//!
//! ```plain
//! $ check-imap-folders --help
//! check-imap-folders (part of campus-plugins) 0.1.0
//! Log into an IMAP server over TLS and count the folders of the account.
//!
//! With --mailbox, count the messages in that mailbox instead. The warning and critical ranges apply to the count, e.g.
//! `-c 1:` to require at least one.
//!
//! USAGE:
//!     check-imap-folders [FLAGS] [OPTIONS] --host <host> --password <password> --user <user>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!     -k, --insecure    Accept invalid TLS certificates
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>    Critical range, [@]start:end
//!         --exclude <exclude>      Do not count folders matching this regex
//!     -H, --host <host>            IMAP server
//!     -m, --mailbox <mailbox>      Count messages in this mailbox instead
//!     -p, --password <password>    Password [env: IMAP_PASSWORD]
//!         --pattern <pattern>      LIST pattern selecting the folders to count [default: *]
//!     -P, --port <port>            IMAPS port [default: 993]
//!     -t, --timeout <seconds>      Seconds before network operations are abandoned [default: 10]
//!     -u, --user <user>            Login name
//!     -w, --warning <warning>      Warning range, [@]start:end
//! ```
//!
//! # check-ldap-search
//!
//! Counts the entries an LDAP search returns.
//!
//! ```plain
//! $ check-ldap-search --help
//! check-ldap-search (part of campus-plugins) 0.1.0
//! Run an LDAP search and count the entries it returns.
//!
//! The warning and critical ranges apply to the number of entries, use e.g. `-c 1:` to go critical when nothing is found.
//!
//! USAGE:
//!     check-ldap-search [FLAGS] [OPTIONS] --base <base> --uri <uri>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!         --starttls    Upgrade ldap:// connections with StartTLS
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -b, --base <base>                       Search base DN
//!     -D, --bind-dn <bind-dn>                 DN to bind as, anonymous if absent
//!     -P, --bind-password <bind-password>     Password for --bind-dn [env: LDAP_BIND_PASSWORD]
//!     -c, --critical <critical>               Critical range, [@]start:end
//!     -f, --filter <filter>                   Search filter [default: (objectClass=*)]
//!     -s, --scope <scope>                     Search scope [default: sub]  [possible values: base, one, sub]
//!     -t, --timeout <seconds>                 Seconds before network operations are abandoned [default: 10]
//!     -H, --uri <uri>                         LDAP URI, e.g. ldaps://ldap.example.org
//!     -w, --warning <warning>                 Warning range, [@]start:end
//! ```
//!
//! # check-dns
//!
//! Times a DNS query and checks the answer.
//!
//! ```plain
//! $ check-dns --help
//! check-dns (part of campus-plugins) 0.1.0
//! Query a DNS record and check the answer.
//!
//! Without --server the system resolver configuration is used. The warning and critical ranges apply to the query time in
//! seconds.
//!
//! USAGE:
//!     check-dns [FLAGS] [OPTIONS] --query <query>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>     Critical range, [@]start:end
//!     -e, --expect <expect>...      A value the answer has to contain, may be repeated
//!         --port <port>             Port of --server [default: 53]
//!     -q, --query <query>           Name to look up
//!     -T, --type <record-type>      Record type, e.g. A, AAAA, MX, TXT [default: A]
//!     -s, --server <server>         Ask this name server directly
//!     -t, --timeout <seconds>       Seconds before network operations are abandoned [default: 10]
//!     -w, --warning <warning>       Warning range, [@]start:end
//! ```
//!
//! # check-ups
//!
//! Asks a Network UPS Tools `upsd` about a UPS.
//!
//! ```plain
//! $ check-ups --help
//! check-ups (part of campus-plugins) 0.1.0
//! Ask upsd about a UPS and check its status flags.
//!
//! Running on battery is a warning, a low or worn out battery, an overload or a forced shutdown is critical. With
//! --variable the warning and critical ranges apply to that variable, e.g. `--variable battery.charge -w 50: -c 25:`.
//!
//! USAGE:
//!     check-ups [FLAGS] [OPTIONS] --ups <ups>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>    Critical range, [@]start:end
//!     -H, --host <host>            Host running upsd [default: localhost]
//!         --password <password>    Password for --user [env: NUT_PASSWORD]
//!     -P, --port <port>            upsd port [default: 3493]
//!     -t, --timeout <seconds>      Seconds before network operations are abandoned [default: 10]
//!     -u, --ups <ups>              Name of the UPS as upsd knows it
//!         --user <user>            upsd user, if the variables need a login
//!         --variable <variable>    Variable the thresholds apply to
//!     -w, --warning <warning>      Warning range, [@]start:end
//! ```
//!
//! # check-typo3-extensions
//!
//! Audits installed TYPO3 extensions against the extension repository. Needs read access to the TYPO3 installation.
//!
//! ```plain
//! $ check-typo3-extensions --help
//! check-typo3-extensions (part of campus-plugins) 0.1.0
//! Check the installed TYPO3 extensions for known security issues.
//!
//! Installed versions are looked up in the TYPO3 Extension Repository index; releases TER marks as insecure are critical.
//! Extensions TER does not know (site packages, in-house code) are ignored.
//!
//! USAGE:
//!     check-typo3-extensions [FLAGS] [OPTIONS] <root>
//!
//! FLAGS:
//!     -h, --help             Prints help information
//!     -k, --insecure         Accept invalid TLS certificates and host names
//!     -V, --version          Prints version information
//!     -v, --verbose          Log diagnostics to stderr, repeat for more detail
//!         --warn-outdated    Warn about extensions with a newer secure release
//!
//! OPTIONS:
//!     -x, --exclude <exclude>...       Extension key to skip, may be repeated
//!         --ter <ter>                  URL or path of the extension index, plain or gzipped [default:
//!                                      https://typo3.org/fileadmin/ter/extensions.xml.gz]
//!     -t, --timeout <seconds>          Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>    User-Agent header to send [default: campus-plugins]
//!
//! ARGS:
//!     <root>    TYPO3 root directory, the one containing typo3conf/
//! ```
//!
//! # check-nginx-stats
//!
//! Reads the nginx `stub_status` page. Keeps state between runs.
//!
//! ```plain
//! $ check-nginx-stats --help
//! check-nginx-stats (part of campus-plugins) 0.1.0
//! Check the connections and request rate of an nginx server.
//!
//! The warning and critical ranges apply to the number of active connections. The request rate is computed against the
//! sample taken on the previous run, so the first run only records a sample.
//!
//! USAGE:
//!     check-nginx-stats [FLAGS] [OPTIONS] <url>
//!
//! FLAGS:
//!     -h, --help        Prints help information
//!     -k, --insecure    Accept invalid TLS certificates and host names
//!     -V, --version     Prints version information
//!     -v, --verbose     Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -c, --critical <critical>              Critical range, [@]start:end
//!         --rate-critical <rate-critical>    Critical range for requests per second
//!         --rate-warning <rate-warning>      Warning range for requests per second
//!         --state-dir <state-dir>            Directory holding state kept between runs [env: CAMPUS_PLUGINS_STATE_DIR=]
//!                                            [default: /var/tmp/campus-plugins]
//!     -t, --timeout <seconds>                Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>          User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>                Warning range, [@]start:end
//!
//! ARGS:
//!     <url>    URL of the stub_status page, e.g. http://localhost/nginx_status
//! ```
//!
//! # check-security-updates
//!
//! Reads the number of pending security updates from a net-snmp `extend`. Keeps state between runs.
//!
//! ```plain
//! $ check-security-updates --help
//! check-security-updates (part of campus-plugins) 0.1.0
//! Ask a host over SNMP how many security updates are waiting.
//!
//! The host runs a net-snmp `extend` that prints the number of pending security updates, e.g. `extend security-updates
//! /usr/local/bin/count-updates`. Pending updates are a warning, and become critical once they have been pending for
//! longer than --max-age days.
//!
//! USAGE:
//!     check-security-updates [FLAGS] [OPTIONS] --host <host>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!     -v, --verbose    Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!     -C, --community <community>    SNMP v2c community [env: SNMP_COMMUNITY] [default: public]
//!     -e, --extend <extend>          Name of the net-snmp extend printing the update count [default: security-updates]
//!     -H, --host <host>              Host to query
//!         --max-age <max-age>        Days updates may be pending before going critical [default: 7]
//!         --oid <oid>                Read this OID instead of the extend output
//!     -P, --port <port>              SNMP port [default: 161]
//!         --state-dir <state-dir>    Directory holding state kept between runs [env: CAMPUS_PLUGINS_STATE_DIR=]
//!                                    [default: /var/tmp/campus-plugins]
//!     -t, --timeout <seconds>        Seconds before network operations are abandoned [default: 10]
//! ```
//!
//! # check-ssllabs
//!
//! Grades a public TLS server through the SSL Labs API. Can take minutes.
//!
//! ```plain
//! $ check-ssllabs --help
//! check-ssllabs (part of campus-plugins) 0.1.0
//! Run (or fetch a cached) SSL Labs assessment and check the grades.
//!
//! Every endpoint (IP address) of the host gets its own grade, the worst verdict wins. Grades rank A+ > A > A- > B > C > D
//! > E > F > T > M.
//!
//! USAGE:
//!     check-ssllabs [FLAGS] [OPTIONS] <host>
//!
//! FLAGS:
//!         --from-cache      Accept a cached assessment instead of starting a new one
//!     -h, --help            Prints help information
//!         --ignore-trust    Use the grade SSL Labs gives when ignoring certificate trust issues
//!     -k, --insecure        Accept invalid TLS certificates and host names
//!     -V, --version         Prints version information
//!     -v, --verbose         Log diagnostics to stderr, repeat for more detail
//!
//! OPTIONS:
//!         --api <api>                            Base URL of the SSL Labs API [default: https://api.ssllabs.com/api/v3/]
//!     -c, --critical <critical>                  Go critical for grades below this one [default: B]
//!         --max-age <max-age>                    Hours a cached assessment may be old, with --from-cache [default: 24]
//!         --max-wait <max-wait>                  Seconds to wait for the assessment to finish [default: 300]
//!         --no-grade-status <no-grade-status>
//!             Status for endpoints without a grade, e.g. unreachable ones [default: critical]  [possible values: ok,
//!             warn, warning, crit, critical, unknown]
//!         --pending-status <pending-status>
//!             Status when the assessment does not finish in time or SSL Labs is busy [default: unknown]  [possible
//!             values: ok, warn, warning, crit, critical, unknown]
//!         --poll-interval <poll-interval>        Seconds between polls of a running assessment [default: 10]
//!     -t, --timeout <seconds>                    Seconds before network operations are abandoned [default: 10]
//!         --user-agent <user-agent>              User-Agent header to send [default: campus-plugins]
//!     -w, --warning <warning>                    Warn about grades below this one [default: A]
//!
//! ARGS:
//!     <host>    Public host name to assess
//! ```

//! Destination validators.
//!
//! Pure, synchronous checks that run on raw configuration before any
//! destination is built. Each validator either accepts a typed value or
//! raises a [`Rejection`] carrying the offending field, the received value
//! (masked when the field name looks sensitive), and a human-readable
//! reason. Validators perform no I/O.
//!
//! Non-fatal findings are reported as [`Advisory`] values alongside an
//! accepted configuration, in the spirit of an error/warning severity
//! split: an advisory never prevents the destination from being built.

use crate::config::{
    CollectorConfig, CollectorProtocol, DestinationConfig, Environment, FileConfig, OutputMode,
    Settings, DEFAULT_COLLECTOR_PORT, DEFAULT_FILE_MODE,
};
use crate::parse::{parse_count, parse_size};
use regex::Regex;
use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Maximum accepted path length in characters.
const MAX_PATH_LEN: usize = 4096;

/// Maximum accepted hostname length.
const MAX_HOST_LEN: usize = 255;

/// System directories log files must never land in.
const DENY_PREFIXES: &[&str] = &[
    "/etc", "/usr", "/bin", "/sbin", "/boot", "/dev", "/proc", "/sys",
];

/// Windows system roots, matched case-insensitively.
const DENY_PREFIXES_WINDOWS: &[&str] = &["c:\\windows", "c:\\program files"];

/// Field-name fragments whose received values are masked in rejections.
const SENSITIVE_FRAGMENTS: &[&str] = &["password", "token", "secret", "key"];

/// A structured validation rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The field path that failed validation.
    pub field: String,
    /// The received value, masked if the field name is sensitive.
    pub received: String,
    /// Human-readable reason.
    pub reason: String,
}

impl Rejection {
    /// Create a rejection, masking the received value when needed.
    pub fn new(
        field: impl Into<String>,
        received: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let received = mask_received(&field, &received.into());
        Self {
            field,
            received,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {}: {} (received '{}')",
            self.field, self.reason, self.received
        )
    }
}

/// A non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    /// The field the advisory concerns.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl Advisory {
    /// Create an advisory.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A destination configuration that has passed validation.
///
/// The only constructor lives in [`validate_destination`], so a builder
/// taking this type cannot receive unvalidated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDestination {
    config: DestinationConfig,
}

impl ValidatedDestination {
    /// The validated configuration.
    pub fn config(&self) -> &DestinationConfig {
        &self.config
    }

    /// Consume the proof and take the configuration.
    pub fn into_config(self) -> DestinationConfig {
        self.config
    }

    /// The output mode of the validated destination.
    pub fn mode(&self) -> OutputMode {
        self.config.mode()
    }
}

/// Outcome of destination validation. Never partially valid.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// The destination is safe to build.
    Valid {
        /// Proof-carrying configuration for the builders.
        destination: ValidatedDestination,
        /// Non-fatal findings to report.
        advisories: Vec<Advisory>,
    },
    /// The destination was rejected outright.
    Rejected(Rejection),
}

/// A short excerpt of an over-long value, truncated on char boundaries.
fn excerpt(value: &str) -> String {
    value.chars().take(64).collect()
}

/// Mask a received value when the field name looks sensitive.
///
/// Longer values keep a short prefix and suffix; short values are fully
/// masked.
pub fn mask_received(field: &str, value: &str) -> String {
    let lowered = field.to_lowercase();
    if !SENSITIVE_FRAGMENTS.iter().any(|f| lowered.contains(f)) {
        return value.to_string();
    }

    if value.len() <= 8 {
        return "*".repeat(value.len().max(3));
    }

    let start: String = value.chars().take(2).collect();
    let end: String = value
        .chars()
        .rev()
        .take(2)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}{}{}", start, "*".repeat(value.len() - 4), end)
}

/// Validate a candidate log file path.
///
/// Rejects traversal segments, embedded NUL bytes, over-long paths, and
/// paths under a fixed deny-list of system directories. Paths that do not
/// exist yet are accepted; directories may be created later.
pub fn validate_path(raw: &str) -> Result<PathBuf, Rejection> {
    const FIELD: &str = "file.path";

    if raw.is_empty() {
        return Err(Rejection::new(FIELD, raw, "path is empty"));
    }
    if raw.contains('\0') {
        return Err(Rejection::new(
            FIELD,
            raw.replace('\0', "\\0"),
            "path contains a NUL byte",
        ));
    }
    if raw.chars().count() > MAX_PATH_LEN {
        return Err(Rejection::new(
            FIELD,
            excerpt(raw),
            format!("path exceeds {MAX_PATH_LEN} characters"),
        ));
    }

    let path = Path::new(raw);
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(Rejection::new(
            FIELD,
            raw,
            "path contains a '..' traversal segment",
        ));
    }

    // Lexical normalization only; the path may not exist yet.
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    for prefix in DENY_PREFIXES {
        if normalized.starts_with(prefix) {
            return Err(Rejection::new(
                FIELD,
                raw,
                format!("path is under the protected system directory '{prefix}'"),
            ));
        }
    }
    let lowered = normalized.to_string_lossy().to_lowercase();
    for prefix in DENY_PREFIXES_WINDOWS {
        let under_prefix = lowered.strip_prefix(prefix).is_some_and(|rest| {
            rest.is_empty() || rest.starts_with('\\') || rest.starts_with('/')
        });
        if under_prefix {
            return Err(Rejection::new(
                FIELD,
                raw,
                format!("path is under the protected system directory '{prefix}'"),
            ));
        }
    }

    Ok(normalized)
}

fn hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // RFC1123 labels: 1-63 alphanumeric-or-hyphen characters, no
        // leading or trailing hyphen, dot-separated.
        Regex::new(
            r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("hostname regex is valid")
    })
}

/// Validate a collector host.
///
/// Any syntactically valid IPv4/IPv6 literal is accepted immediately;
/// otherwise the host must satisfy the RFC1123 hostname grammar. Loopback
/// hosts in a production-like environment yield an advisory, not a
/// rejection.
pub fn validate_host(
    raw: &str,
    environment: Environment,
    advisories: &mut Vec<Advisory>,
) -> Result<String, Rejection> {
    const FIELD: &str = "collector.host";

    let host = raw.trim();
    if host.is_empty() {
        return Err(Rejection::new(FIELD, raw, "host is empty"));
    }

    // IP literal, possibly bracketed IPv6.
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(addr) = literal.parse::<IpAddr>() {
        if environment.is_production_like() && addr.is_loopback() {
            advisories.push(Advisory::new(
                FIELD,
                "collector host is a loopback address in a production-like environment",
            ));
        }
        return Ok(host.to_string());
    }

    if host.chars().count() > MAX_HOST_LEN {
        return Err(Rejection::new(
            FIELD,
            excerpt(host),
            format!("hostname exceeds {MAX_HOST_LEN} characters"),
        ));
    }
    if !hostname_regex().is_match(host) {
        return Err(Rejection::new(
            FIELD,
            host,
            "hostname is not a valid RFC1123 name",
        ));
    }

    if environment.is_production_like() && host.eq_ignore_ascii_case("localhost") {
        advisories.push(Advisory::new(
            FIELD,
            "collector host is a loopback address in a production-like environment",
        ));
    }

    Ok(host.to_string())
}

/// Validate a collector port.
///
/// A missing port is accepted and substituted with the default. Privileged
/// ports in a production-like environment yield an advisory.
pub fn validate_port(
    raw: Option<&str>,
    environment: Environment,
    advisories: &mut Vec<Advisory>,
) -> Result<u16, Rejection> {
    const FIELD: &str = "collector.port";

    let raw = match raw {
        Some(r) => r.trim(),
        None => return Ok(DEFAULT_COLLECTOR_PORT),
    };
    if raw.is_empty() {
        return Ok(DEFAULT_COLLECTOR_PORT);
    }

    let value: i64 = raw
        .parse()
        .map_err(|_| Rejection::new(FIELD, raw, "port is not an integer"))?;
    if !(1..=65535).contains(&value) {
        return Err(Rejection::new(FIELD, raw, "port must be in 1..=65535"));
    }

    let port = value as u16;
    if environment.is_production_like() && port < 1024 {
        advisories.push(Advisory::new(
            FIELD,
            format!("port {port} is privileged in a production-like environment"),
        ));
    }

    Ok(port)
}

/// Validate a file permission mask.
///
/// Never rejects: unparsable or out-of-range input is replaced with the
/// safe default (`0o640`) plus a warning advisory. Grants beyond
/// owner/group yield an advisory but are kept.
pub fn validate_file_mode(raw: Option<&str>, advisories: &mut Vec<Advisory>) -> u32 {
    const FIELD: &str = "file.mode";

    let raw = match raw {
        Some(r) => r.trim(),
        None => return DEFAULT_FILE_MODE,
    };
    if raw.is_empty() {
        return DEFAULT_FILE_MODE;
    }

    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    let mode = match u32::from_str_radix(digits, 8) {
        Ok(m) if m <= 0o7777 => m,
        _ => {
            advisories.push(Advisory::new(
                FIELD,
                format!("unparsable or out-of-range mode '{raw}', using default 0640"),
            ));
            return DEFAULT_FILE_MODE;
        }
    };

    if mode & 0o006 != 0 {
        advisories.push(Advisory::new(
            FIELD,
            format!("mode {mode:04o} grants world access"),
        ));
    }

    mode
}

/// Validate the destination the given mode selects from raw settings.
///
/// This is the single gate between untrusted [`Settings`] and the
/// destination builders: every construction path goes through here first.
/// Malformed size and count strings are treated as "not configured" rather
/// than rejected.
pub fn validate_destination(settings: &Settings, mode: OutputMode) -> ValidationOutcome {
    let environment = settings.environment;
    let mut advisories = Vec::new();

    let config = match mode {
        OutputMode::Stdout => DestinationConfig::Stdout,
        OutputMode::Stderr => DestinationConfig::Stderr,
        OutputMode::Disabled => DestinationConfig::Disabled,
        OutputMode::File => {
            let raw_path = match settings.file.path.as_deref() {
                Some(p) => p,
                None => {
                    return ValidationOutcome::Rejected(Rejection::new(
                        "file.path",
                        "",
                        "file output requires a path",
                    ));
                }
            };
            let path = match validate_path(raw_path) {
                Ok(p) => p,
                Err(rejection) => return ValidationOutcome::Rejected(rejection),
            };
            let mode = validate_file_mode(settings.file.mode.as_deref(), &mut advisories);

            DestinationConfig::File(FileConfig {
                path,
                max_size: settings.file.max_size.as_deref().and_then(parse_size),
                max_files: settings.file.max_files.as_deref().and_then(parse_count),
                mode,
            })
        }
        OutputMode::Collector => {
            let raw_host = match settings.collector.host.as_deref() {
                Some(h) => h,
                None => {
                    return ValidationOutcome::Rejected(Rejection::new(
                        "collector.host",
                        "",
                        "collector output requires a host",
                    ));
                }
            };
            let host = match validate_host(raw_host, environment, &mut advisories) {
                Ok(h) => h,
                Err(rejection) => return ValidationOutcome::Rejected(rejection),
            };
            let port = match validate_port(
                settings.collector.port.as_deref(),
                environment,
                &mut advisories,
            ) {
                Ok(p) => p,
                Err(rejection) => return ValidationOutcome::Rejected(rejection),
            };
            let protocol = match settings.collector.protocol.as_deref() {
                None => CollectorProtocol::default(),
                Some(raw) => match CollectorProtocol::parse(raw) {
                    Some(p) => p,
                    None => {
                        return ValidationOutcome::Rejected(Rejection::new(
                            "collector.protocol",
                            raw,
                            "protocol must be 'tcp' or 'udp'",
                        ));
                    }
                },
            };

            DestinationConfig::Collector(CollectorConfig {
                host,
                port,
                protocol,
            })
        }
    };

    ValidationOutcome::Valid {
        destination: ValidatedDestination { config },
        advisories,
    }
}

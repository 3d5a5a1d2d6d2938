//! Status report parsing
//!
//! Turns the loosely structured text printed by `lmutil lmstat` into an
//! ordered list of [`SessionRecord`]s. Only lines containing the `start`
//! marker are considered; headers, summary counts and blank lines are
//! ignored. Each candidate line is split on commas into an identity
//! segment, a timing segment and a count segment:
//!
//! ```text
//!     alice ws-01 ws-01 nx_design_token (v2024.12) (lic01/28000 1201), start Mon 1/15 9:30, 2 licenses
//! ```
//!
//! A record is only produced when every field can be extracted, so the
//! output never mixes fields from different lines.

use crate::session::SessionRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Substring that marks a session line in a status report
pub const SESSION_MARKER: &str = "start";

/// Seat count recorded when the server omits the count segment
pub const SINGLE_LICENSE: &str = "1 license";

/// Four whitespace separated tokens at the start of the identity segment
static IDENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(\S+)").unwrap());

/// Everything after the marker token in the timing segment
static START_TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"start (.+)").unwrap());

static LICENSE_COUNT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+ licenses?)").unwrap());

/// Result of parsing one status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// At least one session is checked out, in report order
    Sessions {
        sessions: Vec<SessionRecord>,
        /// Session lines that could not be turned into a record
        dropped_lines: usize,
    },
    /// Nobody holds the feature right now
    NoActiveSessions { dropped_lines: usize },
}

impl StatusReport {
    /// Number of sessions in the report
    pub fn len(&self) -> usize {
        match self {
            StatusReport::Sessions { sessions, .. } => sessions.len(),
            StatusReport::NoActiveSessions { .. } => 0,
        }
    }

    /// Number of marker lines dropped because a field could not be extracted
    pub fn dropped_lines(&self) -> usize {
        match self {
            StatusReport::Sessions { dropped_lines, .. }
            | StatusReport::NoActiveSessions { dropped_lines } => *dropped_lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a full status report.
///
/// Session lines whose identity or timing cannot be extracted are dropped,
/// logged and counted in [`StatusReport::dropped_lines`] instead of failing
/// the whole report. A report that yields
/// no sessions at all is [`StatusReport::NoActiveSessions`], never an empty
/// `Sessions` list.
pub fn parse_status_report(text: &str) -> StatusReport {
    let mut sessions = Vec::new();
    let mut dropped = 0usize;

    for line in text.lines().filter(|line| line.contains(SESSION_MARKER)) {
        match parse_session_line(line) {
            Some(session) => sessions.push(session),
            None => {
                dropped += 1;
                warn!(line = line.trim(), "Dropping unrecognized session line");
            }
        }
    }

    debug!(
        sessions = sessions.len(),
        dropped_lines = dropped,
        "Parsed status report"
    );

    if sessions.is_empty() {
        StatusReport::NoActiveSessions {
            dropped_lines: dropped,
        }
    } else {
        StatusReport::Sessions {
            sessions,
            dropped_lines: dropped,
        }
    }
}

/// Parse a single session line.
///
/// Returns `None` when the identity segment does not start with four tokens
/// or the timing segment has nothing after the marker. A missing count
/// segment is recorded as [`SINGLE_LICENSE`].
///
/// # Examples
/// ```
/// use lmreap_core::parse_session_line;
///
/// let line = "bob cad-07 cad-07 nx_design_token (v1) (srv/28000 301), start Tue 2/6 14:05, 2 licenses";
/// let session = parse_session_line(line).unwrap();
/// assert_eq!(session.username, "bob");
/// assert_eq!(session.start_time, "Tue 2/6 14:05");
/// assert_eq!(session.license_count, "2 licenses");
///
/// assert!(parse_session_line("Users of nx_design_token: (Total of 10 licenses issued)").is_none());
/// ```
pub fn parse_session_line(line: &str) -> Option<SessionRecord> {
    let mut segments = line.trim().split(',');

    let identity = IDENTITY_REGEX.captures(segments.next()?)?;

    let start_time = START_TIME_REGEX
        .captures(segments.next()?)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();
    if start_time.is_empty() {
        return None;
    }

    let license_count = segments
        .next()
        .and_then(|segment| LICENSE_COUNT_REGEX.captures(segment))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| SINGLE_LICENSE.to_string());

    Some(SessionRecord {
        username: identity[1].to_string(),
        hostname: identity[2].to_string(),
        displayname: identity[3].to_string(),
        featurename: identity[4].to_string(),
        start_time,
        license_count,
    })
}

#[cfg(test)]
mod tests;

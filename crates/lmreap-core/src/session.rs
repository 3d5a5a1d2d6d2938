//! Session records produced from one status report

use std::fmt;

/// One active checkout of the licensed feature.
///
/// Records are only valid within the query cycle that produced them; their
/// position in the parsed list is the selection handle and is never carried
/// over to the next status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub username: String,
    pub hostname: String,
    pub displayname: String,
    pub featurename: String,
    /// Start timestamp exactly as the server printed it
    pub start_time: String,
    /// Seat count as reported text, e.g. "1 license" or "2 licenses"
    pub license_count: String,
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.username, self.hostname, self.displayname
        )
    }
}

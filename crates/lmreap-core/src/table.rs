//! Operator-facing session table

use crate::session::SessionRecord;
use std::io::{self, Write};

const RULE_WIDTH: usize = 120;

/// Write the session list with 1-based numbers for the operator to select from.
pub fn write_session_table<W: Write>(out: &mut W, sessions: &[SessionRecord]) -> io::Result<()> {
    writeln!(
        out,
        "{:<5} {:<20} {:<20} {:<20} {:<30} {:<20} {:<15}",
        "#", "Username", "Hostname", "Displayname", "Featurename", "Start Time", "License Number"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for (number, session) in sessions.iter().enumerate().map(|(i, s)| (i + 1, s)) {
        writeln!(
            out,
            "{:<5} {:<20} {:<20} {:<20} {:<30} {:<20} {:<15}",
            number,
            session.username,
            session.hostname,
            session.displayname,
            session.featurename,
            session.start_time,
            session.license_count
        )?;
    }

    Ok(())
}

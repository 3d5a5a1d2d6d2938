//! Interactive operator loop
//!
//! Runs the query -> display -> select -> reap cycle against a
//! [`LicenseGateway`] until the operator declines to continue. Every cycle
//! re-queries the server and re-parses from scratch; session numbers shown
//! in one cycle mean nothing in the next.

use crate::{
    Error, Result,
    gateway::{LicenseContext, LicenseGateway},
    parser::{StatusReport, parse_status_report},
    reaper::{ReapCoordinator, ReapProgress, ReapStatus},
    selection::{SelectionSet, resolve_selection},
    session::SessionRecord,
    table::write_session_table,
};
use std::io::{BufRead, Write};
use tracing::{debug, error, info, warn};

const SECTION_RULE: &str = "\n------------------\n";

const SELECTION_PROMPT: &str = "Enter the numbers of the users to kick off their token licenses \
     (comma-separated, e.g., '1,2,3' or '1-3' or 'all'): ";

const CONTINUE_PROMPT: &str = "Do you want to query the license server again? (yes/no): ";

/// How an operator session ended without a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The operator declined to run another cycle
    Completed,
    /// The server reported no sessions for the feature
    NoActiveSessions,
}

enum Phase {
    Query,
    Display(Vec<SessionRecord>),
    Select(Vec<SessionRecord>),
    Reap(Vec<SessionRecord>, SelectionSet),
    Continue,
}

/// Top-level interactive session.
///
/// Generic over the operator's input and display so the loop can be driven
/// from a terminal or from scripted text.
pub struct OperatorSession<'a, G: ?Sized, R, W> {
    gateway: &'a G,
    context: &'a LicenseContext,
    input: R,
    output: W,
}

impl<'a, G, R, W> OperatorSession<'a, G, R, W>
where
    G: LicenseGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    pub fn new(gateway: &'a G, context: &'a LicenseContext, input: R, output: W) -> Self {
        Self {
            gateway,
            context,
            input,
            output,
        }
    }

    /// Run cycles until the operator stops or a fatal error occurs.
    ///
    /// Fatal errors are printed to the display before being returned.
    pub fn run(&mut self) -> Result<SessionOutcome> {
        match self.drive() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "Operator session aborted");
                let _ = writeln!(self.output, "Error: {}", e);
                let _ = self.output.flush();
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<SessionOutcome> {
        let mut phase = Phase::Query;

        loop {
            phase = match phase {
                Phase::Query => match self.query()? {
                    StatusReport::Sessions { sessions, .. } => Phase::Display(sessions),
                    StatusReport::NoActiveSessions { .. } => {
                        writeln!(
                            self.output,
                            "No users are currently pulling an {} license on {}",
                            self.context.feature, self.context.server
                        )?;
                        info!(feature = %self.context.feature, "No active sessions");
                        return Ok(SessionOutcome::NoActiveSessions);
                    }
                },
                Phase::Display(sessions) => {
                    writeln!(self.output, "{}", SECTION_RULE)?;
                    writeln!(self.output, "Listing current users")?;
                    write_session_table(&mut self.output, &sessions)?;
                    Phase::Select(sessions)
                }
                Phase::Select(sessions) => {
                    let selection = self.select(sessions.len())?;
                    Phase::Reap(sessions, selection)
                }
                Phase::Reap(sessions, selection) => {
                    self.reap(&sessions, &selection)?;
                    Phase::Continue
                }
                Phase::Continue => {
                    if self.confirm_again()? {
                        Phase::Query
                    } else {
                        writeln!(self.output, "\nExiting.")?;
                        return Ok(SessionOutcome::Completed);
                    }
                }
            };
        }
    }

    fn query(&mut self) -> Result<StatusReport> {
        writeln!(self.output, "{}", SECTION_RULE)?;
        writeln!(self.output, "Running lmutil lmstat")?;
        self.output.flush()?;

        let text = self.gateway.query_status(self.context)?;
        debug!(bytes = text.len(), "Received status report");

        let report = parse_status_report(&text);
        info!(
            sessions = report.len(),
            dropped_lines = report.dropped_lines(),
            "Queried license server"
        );
        Ok(report)
    }

    /// Prompt until the input resolves to a valid selection
    fn select(&mut self, count: usize) -> Result<SelectionSet> {
        loop {
            let line = self.prompt(SELECTION_PROMPT)?;
            match resolve_selection(&line, count) {
                Ok(selection) => {
                    debug!(selected = ?selection.to_vec(), "Selection accepted");
                    return Ok(selection);
                }
                Err(e) => {
                    warn!(input = %line, error = %e, "Rejected selection");
                    writeln!(self.output, "Error: {}\nPlease enter valid user numbers.", e)?;
                }
            }
        }
    }

    fn reap(&mut self, sessions: &[SessionRecord], selection: &SelectionSet) -> Result<()> {
        let output = &mut self.output;
        let mut written: std::io::Result<()> = Ok(());

        let summary = ReapCoordinator::new(self.gateway, self.context).reap(
            sessions,
            selection,
            |progress| {
                if written.is_err() {
                    return;
                }
                written = match progress {
                    ReapProgress::Attempting(session) => {
                        writeln!(output, "Attempting to kick user {}", session.username)
                    }
                    ReapProgress::Finished(outcome) => match &outcome.status {
                        ReapStatus::Removed => writeln!(
                            output,
                            "Token license kicked off for user {}",
                            outcome.username
                        ),
                        ReapStatus::Failed(reason) => writeln!(
                            output,
                            "Error kicking off token for user {}: {}",
                            outcome.username, reason
                        ),
                    },
                };
            },
        );
        written?;

        writeln!(
            self.output,
            "License removal complete: {} removed, {} failed",
            summary.removed(),
            summary.failed()
        )?;
        Ok(())
    }

    /// Ask whether to run another cycle, repeating on anything but yes/no
    fn confirm_again(&mut self) -> Result<bool> {
        loop {
            let answer = self.prompt(CONTINUE_PROMPT)?.to_lowercase();
            match answer.as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => writeln!(self.output, "Please enter 'yes' or 'no'.")?,
            }
        }
    }

    /// Show a prompt and read one trimmed line; closed input ends the session
    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "\n{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Interrupted);
        }
        Ok(line.trim().to_string())
    }
}

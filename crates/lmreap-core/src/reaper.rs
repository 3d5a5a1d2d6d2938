//! Reap coordination
//!
//! Terminates the selected sessions one at a time, in ascending index order.
//! Each removal is independent: a failure is recorded and the remaining
//! sessions are still attempted. Nothing is rolled back.

use crate::{
    gateway::{LicenseContext, LicenseGateway},
    selection::SelectionSet,
    session::SessionRecord,
};
use tracing::{info, warn};

/// Result of one removal attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReapStatus {
    Removed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapOutcome {
    /// Zero-based index of the session in the current list
    pub index: usize,
    pub username: String,
    pub status: ReapStatus,
}

impl ReapOutcome {
    pub fn is_removed(&self) -> bool {
        self.status == ReapStatus::Removed
    }
}

/// All outcomes of one reap phase, in the order they were attempted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapSummary {
    pub outcomes: Vec<ReapOutcome>,
}

impl ReapSummary {
    pub fn removed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_removed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.removed()
    }
}

/// Progress notification emitted while reaping
#[derive(Debug, Clone, Copy)]
pub enum ReapProgress<'s> {
    /// About to ask the gateway to remove this session
    Attempting(&'s SessionRecord),
    /// The removal attempt finished
    Finished(&'s ReapOutcome),
}

/// Drives one removal per selected session through a [`LicenseGateway`]
pub struct ReapCoordinator<'a, G: ?Sized> {
    gateway: &'a G,
    context: &'a LicenseContext,
}

impl<'a, G: LicenseGateway + ?Sized> ReapCoordinator<'a, G> {
    pub fn new(gateway: &'a G, context: &'a LicenseContext) -> Self {
        Self { gateway, context }
    }

    /// Reap every selected session.
    ///
    /// `progress` is called before and after each removal so callers can
    /// report inline while the phase runs.
    pub fn reap<F>(
        &self,
        sessions: &[SessionRecord],
        selection: &SelectionSet,
        mut progress: F,
    ) -> ReapSummary
    where
        F: FnMut(ReapProgress<'_>),
    {
        let mut summary = ReapSummary::default();

        for index in selection.iter() {
            let outcome = match sessions.get(index) {
                Some(session) => {
                    progress(ReapProgress::Attempting(session));
                    self.reap_one(index, session)
                }
                None => ReapOutcome {
                    index,
                    username: String::new(),
                    status: ReapStatus::Failed(format!("no session at position {}", index + 1)),
                },
            };
            progress(ReapProgress::Finished(&outcome));
            summary.outcomes.push(outcome);
        }

        info!(
            removed = summary.removed(),
            failed = summary.failed(),
            "Reap phase finished"
        );
        summary
    }

    fn reap_one(&self, index: usize, session: &SessionRecord) -> ReapOutcome {
        let status = match self.gateway.remove_session(self.context, session) {
            Ok(()) => {
                info!(session = %session, "Session removed");
                ReapStatus::Removed
            }
            Err(e) => {
                warn!(session = %session, error = %e, "Session removal failed");
                ReapStatus::Failed(e.to_string())
            }
        };

        ReapOutcome {
            index,
            username: session.username.clone(),
            status,
        }
    }
}

//! License server gateway abstraction

use crate::{Result, session::SessionRecord};
use std::path::PathBuf;

/// Everything a gateway needs to address the license server.
///
/// Resolved once at startup and handed to every query and removal, so no
/// loop iteration depends on ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseContext {
    /// Resolved path to the license utility executable
    pub lmutil_path: PathBuf,
    /// License server address, e.g. `28000@lic01`
    pub server: String,
    /// Feature whose sessions are listed and reaped
    pub feature: String,
}

impl LicenseContext {
    pub fn new(
        lmutil_path: impl Into<PathBuf>,
        server: impl Into<String>,
        feature: impl Into<String>,
    ) -> Self {
        Self {
            lmutil_path: lmutil_path.into(),
            server: server.into(),
            feature: feature.into(),
        }
    }
}

/// Synchronous boundary to the license server.
///
/// Both calls block until the external utility completes.
pub trait LicenseGateway {
    /// Fetch the raw status report for the context's feature
    fn query_status(&self, context: &LicenseContext) -> Result<String>;

    /// Ask the server to terminate one fully identified session
    fn remove_session(&self, context: &LicenseContext, session: &SessionRecord) -> Result<()>;
}

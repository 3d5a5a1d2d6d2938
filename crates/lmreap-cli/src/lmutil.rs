//! `lmutil`-backed license gateway
//!
//! Runs `lmutil lmstat` and `lmutil lmremove` as one-shot child processes.

use crate::archive::ReportArchive;
use lmreap_core::{Error, LicenseContext, LicenseGateway, Result, SessionRecord};
use std::process::{Command, Output};
use tracing::{debug, info, warn};

/// Gateway that shells out to the FlexNet license utility
#[derive(Debug, Default)]
pub struct LmutilGateway {
    archive: Option<ReportArchive>,
}

impl LmutilGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also save every status report to `archive`
    pub fn with_archive(mut self, archive: ReportArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    fn run(&self, context: &LicenseContext, args: &[&str]) -> Result<Output> {
        let command = describe(context, args);
        debug!(command = %command, "Running license utility");

        let output = Command::new(&context.lmutil_path)
            .args(args)
            .output()
            .map_err(|source| Error::ProcessLaunch {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ProcessFailure {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl LicenseGateway for LmutilGateway {
    fn query_status(&self, context: &LicenseContext) -> Result<String> {
        let output = self.run(
            context,
            &["lmstat", "-c", &context.server, "-f", &context.feature],
        )?;
        let report = String::from_utf8_lossy(&output.stdout).into_owned();

        if let Some(archive) = &self.archive {
            match archive.save(&report) {
                Ok(()) => info!(path = %archive.path().display(), "Status report archived"),
                Err(e) => warn!(
                    path = %archive.path().display(),
                    error = %e,
                    "Failed to archive status report"
                ),
            }
        }

        Ok(report)
    }

    fn remove_session(&self, context: &LicenseContext, session: &SessionRecord) -> Result<()> {
        self.run(
            context,
            &[
                "lmremove",
                "-c",
                &context.server,
                &context.feature,
                &session.username,
                &session.hostname,
                &session.displayname,
            ],
        )?;
        Ok(())
    }
}

fn describe(context: &LicenseContext, args: &[&str]) -> String {
    let mut command = context.lmutil_path.display().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

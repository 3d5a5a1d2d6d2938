//! lmreap Core Types and Logic
//!
//! This crate provides everything between the license utility and the operator:
//! - Status report parsing into session records
//! - Operator selection resolution (indices, ranges, `all`)
//! - The license gateway trait and the reap coordinator built on it
//! - The interactive query/select/reap operator loop

pub mod error;
pub mod gateway;
pub mod operator;
pub mod parser;
pub mod reaper;
pub mod selection;
pub mod session;
pub mod table;

pub use error::{Error, Result};
pub use gateway::{LicenseContext, LicenseGateway};
pub use operator::{OperatorSession, SessionOutcome};
pub use parser::{StatusReport, parse_session_line, parse_status_report};
pub use reaper::{ReapCoordinator, ReapOutcome, ReapProgress, ReapStatus, ReapSummary};
pub use selection::{SelectionError, SelectionSet, resolve_selection};
pub use session::SessionRecord;

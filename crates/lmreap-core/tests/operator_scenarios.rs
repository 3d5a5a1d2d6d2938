//! End-to-end operator scenarios
//!
//! Drives a full operator session against a scripted gateway and checks what
//! the operator sees and which removals reach the license server.

use lmreap_core::{
    Error, LicenseContext, LicenseGateway, OperatorSession, Result, SessionOutcome,
    SessionRecord,
};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::io::Cursor;

// Gateway that replays canned reports and records every removal request
struct ScriptedGateway {
    reports: RefCell<VecDeque<String>>,
    failing_users: HashSet<String>,
    removals: RefCell<Vec<SessionRecord>>,
}

impl ScriptedGateway {
    fn new(reports: &[&str]) -> Self {
        Self {
            reports: RefCell::new(reports.iter().map(|r| r.to_string()).collect()),
            failing_users: HashSet::new(),
            removals: RefCell::new(Vec::new()),
        }
    }

    fn failing_for(mut self, username: &str) -> Self {
        self.failing_users.insert(username.to_string());
        self
    }

    fn removed_users(&self) -> Vec<String> {
        self.removals
            .borrow()
            .iter()
            .map(|s| s.username.clone())
            .collect()
    }
}

impl LicenseGateway for ScriptedGateway {
    fn query_status(&self, _context: &LicenseContext) -> Result<String> {
        self.reports
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::ProcessFailure {
                command: "lmutil lmstat".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "no more scripted reports".to_string(),
            })
    }

    fn remove_session(&self, _context: &LicenseContext, session: &SessionRecord) -> Result<()> {
        self.removals.borrow_mut().push(session.clone());
        if self.failing_users.contains(&session.username) {
            return Err(Error::ProcessFailure {
                command: format!("lmutil lmremove {}", session.username),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

const ALICE_AND_BOB: &str = "\
lmutil - Copyright (c) 1989-2023 Flexera. All Rights Reserved.
Flexible License Manager status on Mon 1/15/2024 10:12

Users of nx_design_token:  (Total of 50 licenses issued;  Total of 2 licenses in use)

  \"nx_design_token\" v2024.1231, vendor: ugslmd, expiry: 31-dec-2024
  floating license

    alice ws-01 ws-01 nx_design_token (v2024.1231) (lic01/28000 101), start Mon 1/15 9:30, 1 license
    bob cad-07 cad-07:0 nx_design_token (v2024.1231) (lic01/28000 202), start Mon 1/15 9:41, 2 licenses

";

const THREE_USERS: &str = "\
Users of nx_design_token:  (Total of 50 licenses issued;  Total of 3 licenses in use)

    alice ws-01 ws-01 nx_design_token (v1) (lic01/28000 101), start Mon 1/15 9:30, 1 license
    bob cad-07 cad-07 nx_design_token (v1) (lic01/28000 202), start Mon 1/15 9:41, 1 license
    carol cad-3 cad-3 nx_design_token (v1) (lic01/28000 303), start Mon 1/15 9:52, 1 license
";

const NOBODY: &str = "\
Users of nx_design_token:  (Total of 50 licenses issued;  Total of 0 licenses in use)
";

fn context() -> LicenseContext {
    LicenseContext::new("/opt/flexlm/lmutil", "28000@lic01", "nx_design_token")
}

fn run(gateway: &ScriptedGateway, input: &str) -> (Result<SessionOutcome>, String) {
    let context = context();
    let mut output = Vec::new();
    let result =
        OperatorSession::new(gateway, &context, Cursor::new(input.as_bytes()), &mut output).run();
    (result, String::from_utf8(output).unwrap())
}

#[test]
fn test_select_second_user_removes_only_bob() {
    let gateway = ScriptedGateway::new(&[ALICE_AND_BOB]);

    let (result, output) = run(&gateway, "2\nno\n");

    assert_eq!(result.unwrap(), SessionOutcome::Completed);

    let rows: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("1 ") || line.starts_with("2 "))
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].contains("alice"));
    assert!(rows[1].contains("bob"));

    let removals = gateway.removals.borrow();
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].username, "bob");
    assert_eq!(removals[0].hostname, "cad-07");
    assert_eq!(removals[0].displayname, "cad-07:0");
    assert_eq!(removals[0].featurename, "nx_design_token");
}

#[test]
fn test_no_sessions_ends_without_removals() {
    let gateway = ScriptedGateway::new(&[NOBODY]);

    let (result, output) = run(&gateway, "");

    assert_eq!(result.unwrap(), SessionOutcome::NoActiveSessions);
    assert!(output.contains("No users are currently pulling"));
    assert!(gateway.removed_users().is_empty());
}

#[test]
fn test_out_of_range_selection_is_discarded_and_reprompted() {
    let gateway = ScriptedGateway::new(&[THREE_USERS]);

    let (result, output) = run(&gateway, "1-2,4\n3\nno\n");

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    assert!(output.contains("Session number 4 is out of range (valid: 1-3)"));
    assert_eq!(output.matches("Enter the numbers of the users").count(), 2);
    // Nothing from the rejected "1-2" survives into the accepted selection
    assert_eq!(gateway.removed_users(), vec!["carol"]);
}

#[test]
fn test_all_removes_everyone_despite_failure() {
    let gateway = ScriptedGateway::new(&[THREE_USERS]).failing_for("alice");

    let (result, output) = run(&gateway, "all\nno\n");

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    assert_eq!(gateway.removed_users(), vec!["alice", "bob", "carol"]);
    assert!(output.contains("2 removed, 1 failed"));
}

#[test]
fn test_each_cycle_uses_its_own_report() {
    // Between cycles alice disconnects; "1" now means bob
    let after_alice_left = "\
    bob cad-07 cad-07 nx_design_token (v1) (lic01/28000 202), start Mon 1/15 9:41, 1 license
    carol cad-3 cad-3 nx_design_token (v1) (lic01/28000 303), start Mon 1/15 9:52, 1 license
";
    let gateway = ScriptedGateway::new(&[THREE_USERS, after_alice_left]);

    let (result, _) = run(&gateway, "3\nyes\n1\nno\n");

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    assert_eq!(gateway.removed_users(), vec!["carol", "bob"]);
}

#[test]
fn test_second_query_failure_aborts_session() {
    let gateway = ScriptedGateway::new(&[THREE_USERS]);

    let (result, output) = run(&gateway, "1\nyes\n");

    assert!(matches!(result, Err(Error::ProcessFailure { .. })));
    assert!(output.contains("no more scripted reports"));
    assert_eq!(gateway.removed_users(), vec!["alice"]);
}

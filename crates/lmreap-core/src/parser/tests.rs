//! Tests for status report parsing

use super::*;

const LMSTAT_HEADER: &str = "\
lmutil - Copyright (c) 1989-2023 Flexera. All Rights Reserved.
Flexible License Manager status on Mon 1/15/2024 10:12

License server status: 28000@lic01
    License file(s) on lic01: C:\\Program Files\\Siemens\\PLMLicenseServer\\splm8.lic:

    lic01: license server UP (MASTER) v11.19.4

Vendor daemon status (on lic01):

    ugslmd: UP v11.19.4
Feature usage info:

Users of nx_design_token:  (Total of 200 licenses issued;  Total of 3 licenses in use)

  \"nx_design_token\" v2024.1231, vendor: ugslmd, expiry: 31-dec-2024
  floating license

";

fn report(lines: &[&str]) -> String {
    let mut text = LMSTAT_HEADER.to_string();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn sessions(report: StatusReport) -> Vec<SessionRecord> {
    match report {
        StatusReport::Sessions { sessions, .. } => sessions,
        StatusReport::NoActiveSessions { .. } => panic!("expected sessions"),
    }
}

#[test]
fn test_parse_full_session_line() {
    let line = "    alice ws-01 ws-01 nx_design_token (v2024.1231) (lic01/28000 1201), start Mon 1/15 9:30, 2 licenses";
    let session = parse_session_line(line).unwrap();

    assert_eq!(session.username, "alice");
    assert_eq!(session.hostname, "ws-01");
    assert_eq!(session.displayname, "ws-01");
    assert_eq!(session.featurename, "nx_design_token");
    assert_eq!(session.start_time, "Mon 1/15 9:30");
    assert_eq!(session.license_count, "2 licenses");
}

#[test]
fn test_parse_singular_license_count() {
    let line = "carol cad-3 cad-3:0 nx_design_token (v1) (lic01/28000 77), start Fri 3/1 7:45, 1 license";
    let session = parse_session_line(line).unwrap();

    assert_eq!(session.displayname, "cad-3:0");
    assert_eq!(session.license_count, "1 license");
}

#[test]
fn test_missing_count_segment_defaults_to_single_license() {
    let line = "dave host9 host9 nx_design_token (v1) (lic01/28000 12), start Wed 1/17 16:00";
    let session = parse_session_line(line).unwrap();

    assert_eq!(session.start_time, "Wed 1/17 16:00");
    assert_eq!(session.license_count, SINGLE_LICENSE);
}

#[test]
fn test_identity_mismatch_is_dropped() {
    assert!(parse_session_line("alice ws-01, start Mon 1/15 9:30, 1 license").is_none());
    assert!(parse_session_line("   , start Mon 1/15 9:30, 1 license").is_none());
}

#[test]
fn test_missing_timing_segment_is_dropped() {
    // Marker only occurs inside the identity segment
    assert!(parse_session_line("startup host1 host1 nx_design_token (v1)").is_none());
    assert!(parse_session_line("eve host1 host1 nx_design_token (v1), begun Mon 1/15").is_none());
    assert!(parse_session_line("eve host1 host1 nx_design_token (v1), start    , 1 license").is_none());
}

#[test]
fn test_report_preserves_line_order() {
    let text = report(&[
        "    alice ws-01 ws-01 nx_design_token (v2024.1231) (lic01/28000 1201), start Mon 1/15 9:30, 2 licenses",
        "    bob cad-07 cad-07 nx_design_token (v2024.1231) (lic01/28000 301), start Mon 1/15 9:41, 1 license",
        "    carol cad-3 cad-3 nx_design_token (v2024.1231) (lic01/28000 77), start Mon 1/15 10:02",
    ]);

    let parsed = sessions(parse_status_report(&text));
    let users: Vec<&str> = parsed.iter().map(|s| s.username.as_str()).collect();

    assert_eq!(users, vec!["alice", "bob", "carol"]);
}

#[test]
fn test_report_without_marker_lines_is_empty_result() {
    assert_eq!(
        parse_status_report(LMSTAT_HEADER),
        StatusReport::NoActiveSessions { dropped_lines: 0 }
    );
    assert_eq!(
        parse_status_report(""),
        StatusReport::NoActiveSessions { dropped_lines: 0 }
    );
}

#[test]
fn test_report_with_only_malformed_lines_is_empty_result() {
    let text = report(&["    garbage, start now, 1 license"]);

    let parsed = parse_status_report(&text);
    assert_eq!(parsed, StatusReport::NoActiveSessions { dropped_lines: 1 });
    assert!(parsed.is_empty());
}

#[test]
fn test_dropped_line_keeps_records_aligned() {
    let text = report(&[
        "    alice ws-01 ws-01 nx_design_token (v1) (lic01/28000 1), start Mon 1/15 9:30, 1 license",
        "    broken, start Mon 1/15 9:35, 3 licenses",
        "    bob cad-07 cad-07 nx_design_token (v1) (lic01/28000 2), start Mon 1/15 9:41, 2 licenses",
    ]);

    let report = parse_status_report(&text);
    assert_eq!(report.dropped_lines(), 1);

    let parsed = sessions(report);
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].username, "alice");
    assert_eq!(parsed[0].start_time, "Mon 1/15 9:30");
    assert_eq!(parsed[0].license_count, "1 license");
    assert_eq!(parsed[1].username, "bob");
    assert_eq!(parsed[1].start_time, "Mon 1/15 9:41");
    assert_eq!(parsed[1].license_count, "2 licenses");
}

#[test]
fn test_status_report_len() {
    let text = report(&[
        "    alice ws-01 ws-01 nx_design_token (v1) (lic01/28000 1), start Mon 1/15 9:30, 1 license",
    ]);

    assert_eq!(parse_status_report(&text).len(), 1);
    assert_eq!(StatusReport::NoActiveSessions { dropped_lines: 3 }.len(), 0);
}

#[test]
fn test_dropped_lines_are_counted() {
    let text = report(&[
        "    alice ws-01 ws-01 nx_design_token (v1) (lic01/28000 1), start Mon 1/15 9:30, 1 license",
        "    broken, start Mon 1/15 9:35, 3 licenses",
        "    startup-banner",
    ]);

    let parsed = parse_status_report(&text);

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.dropped_lines(), 2);
    assert_eq!(
        parse_status_report("    garbage, start now\n").dropped_lines(),
        1
    );
}

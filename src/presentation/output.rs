//! Command output formatting (text and JSON)

use chrono::{DateTime, Local, TimeZone, Utc};
use crossterm::style::Stylize;

use crate::application::DeployReport;
use crate::domain::entities::{Revision, RevisionLedger};

/// Human-readable revision list, oldest first, active marked with `*`
pub fn render_revisions(ledger: &RevisionLedger, color: bool) -> String {
    if ledger.is_empty() {
        return "No revisions found.\n".to_string();
    }

    let width = ledger.iter().map(|r| r.id().len()).max().unwrap_or(0);
    let mut out = String::new();
    for revision in ledger.iter() {
        let marker = if revision.is_active() { "*" } else { " " };
        let line = format!(
            "{marker} {:<width$}  {}",
            revision.id(),
            format_timestamp(revision.timestamp(), &Local)
        );
        if color && revision.is_active() {
            out.push_str(&line.green().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}

/// Milliseconds since the epoch, as `YYYY-MM-DD HH:MM:SS` in `tz`
pub fn format_timestamp<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

fn revision_json(revision: &Revision) -> serde_json::Value {
    serde_json::json!({
        "revision": revision.id(),
        "timestamp": revision.timestamp(),
        "active": revision.is_active(),
    })
}

/// `{"event":"revisions",...}` line for `list --json`
pub fn revisions_json(ledger: &RevisionLedger) -> serde_json::Value {
    serde_json::json!({
        "event": "revisions",
        "revisions": ledger.iter().map(revision_json).collect::<Vec<_>>(),
        "active": ledger.active().map(Revision::id),
    })
}

/// Final `{"event":"complete",...}` line of a deploy run
pub fn report_json(report: &DeployReport) -> serde_json::Value {
    serde_json::json!({
        "event": "complete",
        "command": "deploy",
        "revision": report.revision,
        "target_dir": report.target_dir,
        "uploaded": report.uploaded.len(),
        "purged": report.purged,
        "skipped": report.skipped,
        "activated": report.activated,
    })
}

/// Summary printed after a deploy run
pub fn render_report(report: &DeployReport) -> String {
    let mut out = match &report.revision {
        Some(id) => format!(
            "Deployed revision {id}: {} file(s) to {}\n",
            report.uploaded.len(),
            report.target_dir
        ),
        None => format!(
            "Uploaded {} file(s) to {} (untracked)\n",
            report.uploaded.len(),
            report.target_dir
        ),
    };
    if report.has_pruned() {
        out.push_str(&format!(
            "Pruned {} release(s)\n",
            report.purged.len() + report.skipped.len()
        ));
    }
    match (&report.activated, &report.revision) {
        (Some(id), _) => out.push_str(&format!("Active revision: {id}\n")),
        (None, Some(id)) => out.push_str(&format!("Activate with: slipway activate {id}\n")),
        (None, None) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ledger() -> RevisionLedger {
        vec![
            Revision::new("a1b2c3", 1_700_000_000_000),
            Revision::new("d4e5f6a", 1_700_000_060_000).with_active(true),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn timestamps_render_in_given_zone() {
        assert_eq!(format_timestamp(1_700_000_000_000, &Utc), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp(i64::MAX, &Utc), i64::MAX.to_string());
    }

    #[test]
    fn revisions_are_aligned_and_active_is_marked() {
        let text = render_revisions(&ledger(), false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  a1b2c3   "));
        assert!(lines[1].starts_with("* d4e5f6a  "));
    }

    #[test]
    fn empty_ledger_says_so() {
        assert_eq!(
            render_revisions(&RevisionLedger::new(), false),
            "No revisions found.\n"
        );
    }

    #[test]
    fn revisions_json_lists_entries() {
        let json = revisions_json(&ledger());
        assert_eq!(json["revisions"][0]["revision"], "a1b2c3");
        assert_eq!(json["active"], "d4e5f6a");
    }

    #[test]
    fn report_suggests_activation_when_not_activated() {
        let mut report = DeployReport::new("/var/www/releases/abc");
        report.revision = Some("abc".to_string());
        report.uploaded = vec![PathBuf::from("index.html")];
        report.purged = vec!["/var/www/releases/old".to_string()];

        assert_eq!(
            render_report(&report),
            "Deployed revision abc: 1 file(s) to /var/www/releases/abc\n\
             Pruned 1 release(s)\n\
             Activate with: slipway activate abc\n"
        );
        assert_eq!(report_json(&report)["purged"][0], "/var/www/releases/old");
    }
}

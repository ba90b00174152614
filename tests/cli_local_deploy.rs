//! End-to-end CLI runs against a deployment root on the local filesystem.

mod common;

use std::fs;

use common::TestEnv;

#[test]
fn test_deploy_activate_then_list() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "<h1>v1</h1>");
    env.write_artifact("assets/app.js", "console.log(1)");

    let result = env.run(&["deploy", "--revision", "r1", "--activate"]);
    assert!(result.is_success(), "{}", result.combined_output());

    assert_eq!(
        fs::read_to_string(env.site_path("releases/r1/assets/app.js")).unwrap(),
        "console.log(1)"
    );
    assert_eq!(env.current_target(), Some(env.site_path("releases/r1")));
    assert!(result.stdout.contains("Active revision: r1"));

    let list = env.run(&["list"]);
    assert!(list.is_success(), "{}", list.combined_output());
    assert!(list.stdout.lines().any(|l| l.starts_with("* r1")), "{}", list.stdout);
}

#[test]
fn test_deploy_without_activate_leaves_current_alone() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "v1");
    assert!(env.run(&["deploy", "--revision", "r1", "--activate"]).is_success());

    env.write_artifact("index.html", "v2");
    let result = env.run(&["deploy", "--revision", "r2"]);
    assert!(result.is_success(), "{}", result.combined_output());

    assert_eq!(env.current_target(), Some(env.site_path("releases/r1")));
    assert!(result.stdout.contains("slipway activate r2"));

    let result = env.run(&["activate", "r2"]);
    assert!(result.is_success(), "{}", result.combined_output());
    assert_eq!(env.current_target(), Some(env.site_path("releases/r2")));
    assert_eq!(
        fs::read_to_string(env.site_path("current/index.html")).unwrap(),
        "v2"
    );
}

#[test]
fn test_prune_keeps_active_release() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");

    assert!(env.run(&["deploy", "--revision", "r1", "--activate"]).is_success());
    assert!(env.run(&["deploy", "--revision", "r2"]).is_success());
    let result = env.run(&["deploy", "--revision", "r3", "--keep", "1"]);
    assert!(result.is_success(), "{}", result.combined_output());

    assert!(env.site_path("releases/r1").is_dir());
    assert!(!env.site_path("releases/r2").exists());
    assert!(env.site_path("releases/r3").is_dir());

    let ledger = fs::read_to_string(env.site_path("releases/revisions.json")).unwrap();
    let ledger: serde_json::Value = serde_json::from_str(&ledger).unwrap();
    let ids: Vec<&str> = ledger
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["revision"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["r1", "r3"]);
}

#[test]
fn test_activate_missing_release_fails_and_keeps_pointer() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");
    assert!(env.run(&["deploy", "--revision", "r1", "--activate"]).is_success());

    let result = env.run(&["activate", "nope"]);

    assert!(!result.is_success());
    assert!(
        result.stderr.contains("has no release directory"),
        "{}",
        result.stderr
    );
    assert_eq!(env.current_target(), Some(env.site_path("releases/r1")));
}

#[test]
fn test_untracked_deploy_uploads_into_root() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "plain");

    let result = env.run(&["deploy"]);
    assert!(result.is_success(), "{}", result.combined_output());

    assert_eq!(fs::read_to_string(env.site_path("index.html")).unwrap(), "plain");
    assert!(!env.site_path("releases/revisions.json").exists());
    assert!(result.stdout.contains("(untracked)"));
}

#[test]
fn test_invalid_revision_id_is_rejected() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");

    let result = env.run(&["deploy", "--revision", "../escape"]);

    assert!(!result.is_success());
    assert!(result.stderr.contains("invalid revision id"), "{}", result.stderr);
    assert!(!env.project_path("escape").exists());
}

#[test]
fn test_ledger_file_name_is_not_a_revision_id() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");

    for id in ["revisions.json", "revisions.json.tmp"] {
        let result = env.run(&["deploy", "--revision", id]);

        assert!(!result.is_success());
        assert!(result.stderr.contains("invalid revision id"), "{}", result.stderr);
        assert!(result.stderr.contains("reserved"), "{}", result.stderr);
        assert!(!env.site_path("releases").join(id).is_dir());
    }

    for id in ["b", "c", "d"] {
        let result = env.run(&["deploy", "--revision", id]);
        assert!(result.is_success(), "{}", result.combined_output());
    }
    assert!(env.site_path("releases/revisions.json").is_file());
    assert!(!env.site_path("releases/b").exists());

    let list = env.run(&["list"]);
    let ids: Vec<&str> = list
        .stdout
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(ids, ["c", "d"], "{}", list.stdout);
}

#[test]
fn test_relative_site_dir_activates_a_resolvable_pointer() {
    let env = TestEnv::new();
    env.write_config("[connection]\ntransport = \"local\"\n\n[deploy]\ndir = \"site\"\n");
    env.write_artifact("index.html", "relative");

    let result = env.run(&["deploy", "--revision", "a", "--activate"]);
    assert!(result.is_success(), "{}", result.combined_output());

    let target = env.current_target().unwrap();
    assert!(target.is_absolute(), "{}", target.display());
    assert_eq!(
        fs::read_to_string(env.site_path("current/index.html")).unwrap(),
        "relative"
    );

    let list = env.run(&["list"]);
    assert!(list.stdout.lines().any(|l| l.starts_with("* a")), "{}", list.stdout);
}

#[test]
fn test_activate_with_zero_keep_is_rejected_before_upload() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");

    let result = env.run(&["deploy", "--revision", "a", "--keep", "0", "--activate"]);

    assert!(!result.is_success());
    assert!(result.stderr.contains("keep 0"), "{}", result.stderr);
    assert!(!env.site_path("releases/a").exists());
    assert!(env.current_target().is_none());
}

#[test]
fn test_deploy_json_emits_ndjson_event_stream() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");

    let result = env.run(&["deploy", "--json", "--revision", "r1", "--activate"]);
    assert!(result.is_success(), "{}", result.combined_output());

    let lines = result.json_lines();
    let events: Vec<&str> = lines.iter().map(|l| l["event"].as_str().unwrap()).collect();

    assert_eq!(events.first(), Some(&"session_opened"));
    assert!(events.contains(&"upload_start"));
    assert!(events.contains(&"item_uploaded"));
    assert!(events.contains(&"activated"));
    assert!(events.contains(&"session_closed"));

    let last = lines.last().unwrap();
    assert_eq!(last["event"], "complete");
    assert_eq!(last["revision"], "r1");
    assert_eq!(last["activated"], "r1");
}

#[test]
fn test_json_error_line_on_failure() {
    let env = TestEnv::new();

    let result = env.run(&["activate", "--json", "ghost"]);

    assert!(!result.is_success());
    let lines = result.json_lines();
    assert_eq!(lines.last().unwrap()["event"], "error");
}

#[test]
fn test_ignore_patterns_exclude_files() {
    let env = TestEnv::new();
    env.write_artifact("index.html", "x");
    env.write_artifact("app.js.map", "map");
    fs::write(env.project_path("dist/.slipwayignore"), "*.map\n").unwrap();

    let result = env.run(&["deploy", "--revision", "r1"]);
    assert!(result.is_success(), "{}", result.combined_output());

    assert!(env.site_path("releases/r1/index.html").is_file());
    assert!(!env.site_path("releases/r1/app.js.map").exists());
    assert!(!env.site_path("releases/r1/.slipwayignore").exists());
}

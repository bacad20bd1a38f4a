use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PLAN: &str = "\
### Phase 1: Setup
- [x] **Scaffold** `[complete]`
- [ ] **Wire CI** `[pending]`

### Phase 2: Build
- [ ] **Parser** `[pending]`
";

const TEST_PLAN: &str = "\
## Smoke tests
- [ ] App starts
- [ ] Login works
";

/// Helper function to create a temporary directory holding one plan file
fn plan_file(name: &str, content: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write plan file");
    let path_str = path.to_str().expect("utf-8 path").to_string();
    (temp_dir, path_str)
}

/// Helper function to create a Command with --no-color flag for testing
fn pf_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pf").expect("Failed to find pf binary");
    cmd.arg("--no-color");
    cmd
}

#[test]
fn test_cli_show_plan() {
    let (_dir, path) = plan_file("PLAN.md", PLAN);

    pf_cmd()
        .args(["show", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scaffold"))
        .stdout(predicate::str::contains("1.2"))
        .stdout(predicate::str::contains("Complete"));
}

#[test]
fn test_cli_show_json_output() {
    let (_dir, path) = plan_file("PLAN.md", PLAN);

    let output = pf_cmd()
        .args(["show", &path, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value =
        serde_json::from_slice(&output).expect("valid JSON document output");
    assert_eq!(value["sections"][0]["items"][0]["id"], "1.1");
    assert_eq!(value["sections"][1]["items"][0]["status"], "pending");
}

#[test]
fn test_cli_show_missing_file_fails() {
    pf_cmd()
        .args(["show", "/nonexistent/PLAN.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_cli_set_rewrites_one_line() {
    let (_dir, path) = plan_file("PLAN.md", PLAN);

    pf_cmd()
        .args(["set", &path, "1.2", "complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2 -> complete"));

    let text = std::fs::read_to_string(&path).expect("read plan back");
    assert!(text.contains("- [x] **Wire CI** `[complete]`"));
    // The rest of the file is untouched.
    assert!(text.contains("- [x] **Scaffold** `[complete]`"));
    assert!(text.contains("- [ ] **Parser** `[pending]`"));
}

#[test]
fn test_cli_set_unknown_id_fails() {
    let (_dir, path) = plan_file("PLAN.md", PLAN);

    pf_cmd()
        .args(["set", &path, "9.9", "complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("9.9"));
}

#[test]
fn test_cli_set_invalid_status_fails() {
    let (_dir, path) = plan_file("PLAN.md", PLAN);

    pf_cmd()
        .args(["set", &path, "1.2", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid task status"));
}

#[test]
fn test_cli_set_failed_test_step_with_note() {
    let (_dir, path) = plan_file("TEST_PLAN.md", TEST_PLAN);

    pf_cmd()
        .args([
            "--test-plan",
            "set",
            &path,
            "section-0-2",
            "failed",
            "--note",
            "redirect loop",
        ])
        .assert()
        .success();

    let text = std::fs::read_to_string(&path).expect("read test plan back");
    assert!(text.contains("- [!] Login works\n  Note: redirect loop\n"));
}

#[test]
fn test_cli_diff_reports_status_changes() {
    let (_dir, old_path) = plan_file("PLAN.md", PLAN);
    let edited = PLAN.replace(
        "- [ ] **Wire CI** `[pending]`",
        "- [~] **Wire CI** `[in_progress]`",
    );
    let (_dir2, new_path) = plan_file("PLAN_NEW.md", &edited);

    pf_cmd()
        .args(["diff", &old_path, &new_path])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending -> in_progress"));
}

#[test]
fn test_cli_diff_identical_files_reports_no_changes() {
    let (_dir, old_path) = plan_file("PLAN.md", PLAN);
    let (_dir2, new_path) = plan_file("PLAN_COPY.md", PLAN);

    pf_cmd()
        .args(["diff", &old_path, &new_path])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_cli_diff_json_output() {
    let (_dir, old_path) = plan_file("PLAN.md", PLAN);
    let edited = format!("{PLAN}- [ ] **Docs** `[pending]`\n");
    let (_dir2, new_path) = plan_file("PLAN_NEW.md", &edited);

    let output = pf_cmd()
        .args(["diff", &old_path, &new_path, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value =
        serde_json::from_slice(&output).expect("valid JSON change set");
    assert_eq!(value[0]["kind"], "item_added");
    assert_eq!(value[0]["id"], "2.2");
}

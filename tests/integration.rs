use std::path::Path;
use std::process::{Command, Output};

fn mscript_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mscript"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("MSCRIPT_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn read_prints_the_framed_data_stack() {
    let output = mscript_cmd("basic").args(["read", "good.txt"]).output().unwrap();
    assert!(output.status.success(), "read failed: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\
┌ Found `@start` parameter on line 5, gathering entries:
├ #0:   apples
├ #1:   two dozen, ripe
├ #2:   pears
├ #3:   {red, green}
├ #4:   #tag
├ #5:   @root
└ Found `@stop` parameter on line 10, terminating and returning any data that has been stored.
"
    );
}

#[test]
fn read_json_reports_the_region() {
    let output = mscript_cmd("basic")
        .args(["read", "good.txt", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "read failed: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["entries"].as_array().unwrap().len(), 6);
    assert_eq!(report["entries"][1], "two dozen, ripe");
    assert_eq!(report["start_line"], 5);
    assert_eq!(report["termination"]["kind"], "stop_directive");
    assert_eq!(report["termination"]["line"], 10);
}

#[test]
fn stop_before_start_closes_without_entries() {
    let output = mscript_cmd("basic").args(["read", "stop_first.txt"]).output().unwrap();
    assert!(output.status.success(), "read failed: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("┌ Found a `@stop` parameter on line 3"));
    assert!(text.ends_with("└ Closing\n"));
}

#[test]
fn dangling_code_after_stop_exits_one() {
    let output = mscript_cmd("broken").args(["read", "dangling.txt"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());

    let err = stderr(&output);
    assert!(err.contains("# Error: Dangling Code"), "stderr: {err}");
    assert!(err.contains("In `dangling.txt:5`"), "stderr: {err}");
    assert!(err.contains("Severity: 2/5"), "stderr: {err}");
}

#[test]
fn file_rejections_exit_two() {
    let no_header = mscript_cmd("broken").args(["read", "plain.txt"]).output().unwrap();
    assert_eq!(no_header.status.code(), Some(2));
    assert!(stderr(&no_header).contains("# Error: Missing Header"));

    let wrong_ext = mscript_cmd("broken").args(["read", "notes.md"]).output().unwrap();
    assert_eq!(wrong_ext.status.code(), Some(2));
    assert!(stderr(&wrong_ext).contains("# Error: Wrong File Type"));

    let missing = mscript_cmd("broken").args(["read", "absent.txt"]).output().unwrap();
    assert_eq!(missing.status.code(), Some(2));
    assert!(stderr(&missing).contains("# Error: File Not Found"));
}

#[test]
fn config_file_changes_extension_and_header() {
    let output = mscript_cmd("configured").args(["read", "list.ms"]).output().unwrap();
    assert!(output.status.success(), "read failed: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("┌ Found `@start` parameter on line 1"));
    assert!(text.contains("├ #1:   two\n"));
    assert!(text.ends_with("└ End of file\n"));
}

#[test]
fn check_passes_a_clean_directory() {
    let output = mscript_cmd("basic").arg("check").output().unwrap();
    assert!(output.status.success(), "check failed: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("good.txt (6 entries)"), "stdout: {text}");
    assert!(text.contains("stop_first.txt (0 entries)"), "stdout: {text}");
    assert!(text.ends_with("All 2 scripts read cleanly\n"), "stdout: {text}");
}

#[test]
fn check_reports_every_failure() {
    let output = mscript_cmd("broken").arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("dangling.txt:5 (Dangling code on line 5 (found: 'b'))"), "stdout: {text}");
    assert!(text.contains("FAIL    ./plain.txt"), "stdout: {text}");
    assert!(!text.contains("notes.md"), "stdout: {text}");
    assert!(text.ends_with("2 of 2 scripts failed\n"), "stdout: {text}");
}

#[test]
fn check_json_lists_outcomes() {
    let output = mscript_cmd("broken")
        .args(["check", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let items: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["error"]["line"], 5);
    assert_eq!(items[0]["error"]["severity"], 2);
    assert!(items[1]["error"]["line"].is_null());
    assert_eq!(items[1]["error"]["severity"], 4);
}

#[test]
fn locate_prints_the_start_line() {
    let output = mscript_cmd("basic").args(["locate", "good.txt"]).output().unwrap();
    assert!(output.status.success(), "locate failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "good.txt:5  @start\n");
}

#[test]
fn log_appends_one_success_line_per_read() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("log.txt");
    std::fs::write(&script, "```mscript\n@start\na b\n@stop\n").unwrap();

    for _ in 0..2 {
        let output = Command::new(env!("CARGO_BIN_EXE_mscript"))
            .current_dir(dir.path())
            .args(["read", "log.txt", "--log"])
            .output()
            .unwrap();
        assert!(output.status.success(), "read failed: {}", stderr(&output));
        assert!(stdout(&output).contains("├ #1:   b"));
    }

    let content = std::fs::read_to_string(&script).unwrap();
    assert_eq!(content.matches("- SUCCESS").count(), 2);
    assert!(content.contains("\n\n# This file was read at "));
}

#[test]
fn log_on_a_read_only_script_fails_before_printing() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("locked.txt");
    std::fs::write(&script, "```mscript\n@start\na\n").unwrap();
    let mut permissions = std::fs::metadata(&script).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&script, permissions).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mscript"))
        .current_dir(dir.path())
        .args(["read", "locked.txt", "--log"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty(), "stdout: {}", stdout(&output));
    let err = stderr(&output);
    assert!(err.contains("# Error: Read-Only Script"), "stderr: {err}");
    assert!(err.contains("Modify the file accessibility"), "stderr: {err}");
    assert_eq!(std::fs::read_to_string(&script).unwrap(), "```mscript\n@start\na\n");

    let plain = Command::new(env!("CARGO_BIN_EXE_mscript"))
        .current_dir(dir.path())
        .args(["read", "locked.txt"])
        .output()
        .unwrap();
    assert!(plain.status.success(), "read failed: {}", stderr(&plain));
}

#[test]
fn read_without_log_leaves_the_file_alone() {
    let before = std::fs::read_to_string("tests/fixtures/basic/good.txt").unwrap();
    let output = mscript_cmd("basic").args(["read", "good.txt"]).output().unwrap();
    assert!(output.status.success());
    let after = std::fs::read_to_string("tests/fixtures/basic/good.txt").unwrap();
    assert_eq!(before, after);
}

#[test]
fn info_json_describes_syntax_and_state() {
    let output = mscript_cmd("configured").args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(info["directives"][0], "@start");
    assert_eq!(info["annotations"].as_array().unwrap().len(), 7);
    assert_eq!(info["current_state"]["config_found"], true);
    assert_eq!(info["current_state"]["extensions"][0], "ms");
    assert_eq!(info["current_state"]["header"], "");
    assert_eq!(info["exit_codes"].as_array().unwrap().len(), 4);
}

//! End-to-end tests driving the real binary: index fixtures, query the
//! index, and exercise the digest and pruning behavior.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

fn toks() -> Command {
    Command::cargo_bin("toks").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// Copy a fixture into the temp workdir so pruning tests can delete it.
fn stage(dir: &Path, name: &str) -> String {
    let dst = dir.join(name);
    fs::copy(fixture(name), &dst).unwrap();
    dst.to_string_lossy().to_string()
}

#[test]
fn usage_without_arguments() {
    let output = toks().output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "expected usage text, got: {stdout}");
}

#[test]
fn index_enum_fixture_and_query() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");

    toks().args(["-i"]).arg(&index).arg(&src).assert().success();

    // definitions of the first enum's values
    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_A", "--defs"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ENUM_VAL DEF ENUA_A"),
        "unexpected query output: {stdout}"
    );
    assert!(stdout.contains("enua"), "scope missing: {stdout}");

    // the tag has both a declaration and a definition
    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "enua", "--decls"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENUM DECL enua"), "missing proto: {stdout}");
}

#[test]
fn query_wildcards() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");

    toks().args(["-i"]).arg(&index).arg(&src).assert().success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_*", "--defs"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENUA_A"));
    assert!(stdout.contains("ENUA_B"));

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_?", "--defs"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENUA_A"));
}

#[test]
fn function_fixture_definitions_and_declarations() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "function.c");

    toks().args(["-i"]).arg(&index).arg(&src).assert().success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "functiona"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FUNCTION DEF functiona"), "{stdout}");
    assert!(stdout.contains("FUNCTION DECL functiona"), "{stdout}");
    assert!(stdout.contains("FUNCTION REF functiona"), "{stdout}");
}

#[test]
fn struct_and_union_fixtures_index_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let a = stage(dir.path(), "struct.c");
    let b = stage(dir.path(), "union.c");

    toks().args(["-i"]).arg(&index).arg(&a).arg(&b).assert().success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "strua", "--defs"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("STRUCT DEF strua"), "{stdout}");
}

#[test]
fn unchanged_file_is_not_reanalyzed() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");

    toks().args(["-i"]).arg(&index).arg(&src).assert().success();
    // the store logs at severity 50; widen the mask to observe it
    let output = toks()
        .args(["-L", "0-3,50", "-i"])
        .arg(&index)
        .arg(&src)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unchanged"),
        "expected digest skip, got: {stderr}"
    );

    // results are still there exactly once
    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_A", "--defs"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
}

#[test]
fn changed_file_replaces_old_entries() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = dir.path().join("gen.c");

    fs::write(&src, "enum first { AAA };\n").unwrap();
    toks().args(["-i"]).arg(&index).arg(&src).assert().success();

    fs::write(&src, "enum second { BBB };\n").unwrap();
    toks().args(["-i"]).arg(&index).arg(&src).assert().success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "AAA"])
        .output()
        .unwrap();
    assert!(output.stdout.is_empty(), "stale entries survived");

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "BBB", "--defs"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("BBB"));
}

#[test]
fn deleted_files_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let doomed = dir.path().join("doomed.c");
    let keeper = dir.path().join("keeper.c");

    fs::write(&doomed, "enum gone { GONE_A };\n").unwrap();
    fs::write(&keeper, "enum kept { KEPT_A };\n").unwrap();
    toks().args(["-i"]).arg(&index).arg(&doomed).arg(&keeper).assert().success();

    fs::remove_file(&doomed).unwrap();
    // any indexing run prunes first
    toks().args(["-i"]).arg(&index).arg(&keeper).assert().success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "GONE_A"])
        .output()
        .unwrap();
    assert!(output.stdout.is_empty(), "pruned file still queried");

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "KEPT_A", "--defs"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("KEPT_A"));
}

#[test]
fn corrupt_index_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    fs::write(&index, "this is not a database").unwrap();
    let src = stage(dir.path(), "enum.c");

    toks().args(["-i"]).arg(&index).arg(&src).assert().failure();
}

#[test]
fn file_list_input() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");
    let list = dir.path().join("sources.txt");
    fs::write(&list, format!("# sources\n{src}\n")).unwrap();

    toks()
        .args(["-i"])
        .arg(&index)
        .arg("-F")
        .arg(&list)
        .assert()
        .success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_A", "--defs"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("ENUA_A"));
}

#[test]
fn token_dump() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .arg("-d")
        .arg(&src)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# -=====-"), "{stdout}");
    assert!(stdout.contains("ENUM"), "{stdout}");
}

#[test]
fn output_redirect() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = stage(dir.path(), "enum.c");
    let redirected = dir.path().join("out.txt");

    toks().args(["-i"]).arg(&index).arg(&src).assert().success();
    toks()
        .args(["-i"])
        .arg(&index)
        .arg("-o")
        .arg(&redirected)
        .args(["--id", "ENUA_A", "--defs"])
        .assert()
        .success();

    let content = fs::read_to_string(&redirected).unwrap();
    assert!(content.contains("ENUA_A"));
}

#[test]
fn forced_language_override() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let src = dir.path().join("odd_extension.xyz");
    fs::write(&src, "enum forced { FORCED_A };\n").unwrap();

    toks()
        .args(["-i"])
        .arg(&index)
        .args(["-l", "C"])
        .arg(&src)
        .assert()
        .success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "FORCED_A", "--defs"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("FORCED_A"));
}

#[test]
fn missing_source_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("TOKS");
    let good = stage(dir.path(), "enum.c");

    // the bad file logs an error but the run continues and exits zero
    toks()
        .args(["-i"])
        .arg(&index)
        .arg(dir.path().join("no-such-file.c"))
        .arg(&good)
        .assert()
        .success();

    let output = toks()
        .args(["-i"])
        .arg(&index)
        .args(["--id", "ENUA_A", "--defs"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("ENUA_A"));
}

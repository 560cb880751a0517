//! End-to-end integration tests for the `cfrontc` binary: write a source file, invoke the
//! binary, and assert on its exit code and stdout/stderr.

use std::process::Command;

fn cfrontc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cfrontc"))
}

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("failed to write source file");
    path
}

#[test]
fn clean_source_exits_zero_with_no_stderr() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(&dir, "main.c", "int main() { return 0; }\n");

    let output = cfrontc().arg(&file).output().expect("failed to invoke cfrontc");

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "unexpected stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn unterminated_string_exits_nonzero_and_reports_diagnostic() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(&dir, "bad.c", "int x = \"oops;\n");

    let output = cfrontc().arg(&file).output().expect("failed to invoke cfrontc");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wasn't closed"), "stderr was: {stderr}");
}

#[test]
fn lex_only_flag_prints_tokens_and_does_not_run_the_rest_of_the_pipeline() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(&dir, "main.c", "int x = 1;\n");

    let output = cfrontc().arg("-l").arg(&file).output().expect("failed to invoke cfrontc");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Keyword"));
    assert!(stdout.contains("IntegerLiteral"));
}

#[test]
fn wall_flag_prints_the_folded_tree() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(&dir, "main.c", "int x = 1 + 2;\n");

    let output = cfrontc().arg("-Wall").arg(&file).output().expect("failed to invoke cfrontc");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Program"));
}

#[test]
fn werror_promotes_a_recorded_diagnostic_to_a_failure() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(&dir, "bad.c", "int x = 10 / (2 - 2);\n");

    let output = cfrontc().arg("-Werror").arg(&file).output().expect("failed to invoke cfrontc");

    assert!(!output.status.success());
}

#[test]
fn missing_file_is_a_clean_failure_not_a_panic() {
    let output = cfrontc().arg("/no/such/file.c").output().expect("failed to invoke cfrontc");
    assert!(!output.status.success());
}

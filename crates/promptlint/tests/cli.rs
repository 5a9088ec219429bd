use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

fn promptlint_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_promptlint"))
}

fn setup_project(dir: &Path) {
    std::fs::write(
        dir.join("promptlint.toml"),
        r#"
syntax = "jinja2"
dialect = "variable_bound"
variables = ["name", "items"]
"#,
    )
    .unwrap();

    std::fs::create_dir_all(dir.join("prompts")).unwrap();
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(promptlint_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn run_with_stdin(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(promptlint_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

#[test]
fn check_clean_prompt_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(
        dir.path().join("prompts/good.prompt"),
        "Hello {{ name | title }}!\n{% if items %}{{ items | join(', ') }}{% endif %}\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["check", "prompts/"]);

    assert!(
        output.status.success(),
        "Expected exit 0, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn check_broken_prompt_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(
        dir.path().join("prompts/broken.txt"),
        "{% if name %}\nHello {{ name }}\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["check", "prompts/"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("T101"), "Expected T101 in output:\n{stdout}");
    assert!(
        stdout.contains("Unclosed block 'if'"),
        "Expected 'Unclosed block' in output:\n{stdout}"
    );
}

#[test]
fn check_ignore_suppresses_errors() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/unknown.md"), "Hi {{ stranger }}\n").unwrap();

    let output = run_in(dir.path(), &["check", "--ignore", "T105", "prompts/"]);

    assert!(
        output.status.success(),
        "Expected exit 0 with --ignore T105, got {:?}\nstdout: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
    );
}

#[test]
fn check_variables_file_and_dialect_flags() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/extra.j2"), "{{ topic }}\n").unwrap();
    std::fs::write(dir.path().join("vars.json"), r#"[{"key": "topic", "type": "string"}]"#).unwrap();

    let declared = run_in(dir.path(), &["check", "--variables", "vars.json", "prompts/"]);
    assert!(declared.status.success());

    let normal = run_in(dir.path(), &["check", "--dialect", "normal", "prompts/"]);
    assert!(normal.status.success());

    let bound = run_in(dir.path(), &["check", "prompts/"]);
    assert_eq!(bound.status.code(), Some(1));
}

#[test]
fn check_go_template_syntax() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(
        dir.path().join("prompts/go.tmpl"),
        "{{ if .name }}Hi {{ .name }}{{ end }}\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["check", "--syntax", "go_template", "prompts/"]);
    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn check_stdin_detects_errors() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());

    let output = run_with_stdin(dir.path(), &["check"], "Say {{ name|shout }}\n");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("T103"), "Expected T103 in output:\n{stdout}");
    assert!(stdout.contains("<stdin>"), "Expected <stdin> path in output:\n{stdout}");
}

#[test]
fn check_skips_other_files_and_hidden_dirs() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/script.py"), "{{ broken").unwrap();
    std::fs::create_dir_all(dir.path().join("prompts/.cache")).unwrap();
    std::fs::write(dir.path().join("prompts/.cache/old.txt"), "{% if %}").unwrap();

    let output = run_in(dir.path(), &["check", "prompts/"]);
    assert!(output.status.success());
}

#[test]
fn check_reports_unterminated_and_stray_delimiters() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(
        dir.path().join("prompts/open.txt"),
        "Hello {{ name }} and {{ oops\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("prompts/close.txt"), "a }} b\n").unwrap();

    let output = run_in(dir.path(), &["check", "prompts/"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("T100").count(), 2, "stdout:\n{stdout}");
    assert!(stdout.contains("open.txt"), "stdout:\n{stdout}");
    assert!(stdout.contains("close.txt"), "stdout:\n{stdout}");
}

#[cfg(unix)]
#[test]
fn check_does_not_follow_directory_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/a.txt"), "Hello {{ who }}\n").unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("prompts/loop")).unwrap();

    let output = run_in(dir.path(), &["check", "prompts/"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("T105").count(), 1, "stdout:\n{stdout}");
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Found 1 error in 1 file."),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_respects_ignore_files() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/.ignore"), "drafts/\n").unwrap();
    std::fs::create_dir_all(dir.path().join("prompts/drafts")).unwrap();
    std::fs::write(dir.path().join("prompts/drafts/wip.txt"), "{% if %}").unwrap();

    let skipped = run_in(dir.path(), &["check", "prompts/"]);
    assert!(skipped.status.success());

    let walked = run_in(dir.path(), &["check", "--no-ignore", "prompts/"]);
    assert_eq!(walked.status.code(), Some(1));
}

#[test]
fn check_empty_stdin_falls_back_to_project() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/bad.txt"), "{% if name %}\n").unwrap();

    let output = run_with_stdin(dir.path(), &["check"], "");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bad.txt"), "stdout:\n{stdout}");
    assert!(!stdout.contains("<stdin>"), "stdout:\n{stdout}");
}

#[test]
fn check_dash_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    std::fs::write(dir.path().join("prompts/bad.txt"), "{% if name %}\n").unwrap();

    let output = run_with_stdin(dir.path(), &["check", "-"], "Hi {{ name }}\n");

    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn parts_split_prints_json() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_with_stdin(
        dir.path(),
        &["parts"],
        "<multimodal-variable>img1</multimodal-variable> see above",
    );

    assert!(output.status.success());
    let parts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        parts,
        serde_json::json!([
            {"type": "multi_part_variable", "text": "img1"},
            {"type": "text", "text": " see above"},
        ])
    );
}

#[test]
fn parts_join_prints_text() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_with_stdin(
        dir.path(),
        &["parts", "--join"],
        r#"[{"type": "text", "text": "look: "}, {"type": "multi_part_variable", "text": "pic"}]"#,
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "look: <multimodal-variable>pic</multimodal-variable>"
    );
}

#[test]
fn parts_join_rejects_bad_json() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_with_stdin(dir.path(), &["parts", "--join"], "not json");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("JSON array of content parts"));
}

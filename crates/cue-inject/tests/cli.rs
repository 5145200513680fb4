//! Runs the cue-inject binary

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::process::{Command, Output};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(name)
}

fn cue_inject(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cue-inject"))
        .args(args)
        .env_remove("CUE_INJECT_LOG")
        .env_remove("X_NAME")
        .env("CUE_INJECT_CLI_NAME", "aereal")
        .env("CUE_INJECT_CLI_AGE", "17")
        .output()
        .expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ok.out.cue");
    let src = testdata("ok_deprecated.cue");

    let output = cue_inject(&[
        "--output",
        out.to_str().unwrap(),
        src.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "name: string @injectenv(X_NAME)\n"
    );
}

#[test]
fn stdout_and_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("doc.cue");
    std::fs::write(
        &src,
        "name: string @inject(env,name=CUE_INJECT_CLI_NAME)\nage: string @inject(env,name=CUE_INJECT_CLI_AGE)\n",
    )
    .unwrap();

    let output = cue_inject(&["-p", "_AGE$", "-l", "error", src.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "name: string @inject(env,name=CUE_INJECT_CLI_NAME)\nage: \"17\" @inject(env,name=CUE_INJECT_CLI_AGE)\n"
    );
    assert_eq!(stderr(&output), "");
}

#[test]
fn json_and_yaml() {
    let src = testdata("ok_tfstate.cue");

    let output = cue_inject(&["-F", "json", src.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "{\n  \"name\": \"aereal\",\n  \"age\": 17\n}\n"
    );

    let output = cue_inject(&["--output-format", "yaml", src.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "name: aereal\nage: 17\n");
}

#[test]
fn incomplete_documents_cannot_be_exported() {
    let output = cue_inject(&["-F", "json", testdata("not_found.cue").to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).ends_with("incomplete value at name: string\n"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn missing_file() {
    let output = cue_inject(&["missing_file.cue"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(
        lines[..3],
        [
            "failed to inject values to file missing_file.cue",
            "cannot parse file(missing_file.cue)",
            "cannot read source",
        ]
    );
}

#[test]
fn invalid_pattern() {
    let output = cue_inject(&["-p", "(", testdata("ok.cue").to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).starts_with("cannot parse pattern\n"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn input_is_required() {
    let output = cue_inject(&[]);
    assert!(!output.status.success());
}

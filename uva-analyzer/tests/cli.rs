use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

const EXAMPLE: &str = "class Foo\nend\nlet s = \"hi\"\nlet t = 'Foo is ${Foo}'\n";

fn analyzer() -> Command {
    Command::cargo_bin("uvalang-analyzer").expect("binary exists")
}

fn documents(stdout: &[u8]) -> Vec<Value> {
    serde_json::Deserializer::from_slice(stdout)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .expect("stdout holds well-formed JSON documents")
}

fn single_document(stdout: &[u8]) -> Value {
    let mut docs = documents(stdout);
    assert_eq!(docs.len(), 1, "expected exactly one document");
    docs.remove(0)
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn one_shot_reports_findings_and_declarations() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("main.uva");
    fs::write(&input, EXAMPLE).expect("write input");

    let assert = analyzer().arg(&input).assert().success();
    let report = single_document(&assert.get_output().stdout);

    let linter = report["linter"].as_array().expect("linter array");
    assert_eq!(linter.len(), 1);
    assert_eq!(linter[0]["type"], "string-default-single-quotes");
    assert_eq!(linter[0]["location"]["file"], path_str(&input));
    assert_eq!(linter[0]["location"]["line"], 3);
    assert_eq!(linter[0]["location"]["column"], 9);
    assert_eq!(linter[0]["location"]["offset"], 22);
    assert_eq!(linter[0]["location"]["length"], 4);

    let declarations = report["declarations"].as_array().expect("declarations array");
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0]["type"], "class");
    assert_eq!(declarations[0]["name"], "Foo");
    assert_eq!(declarations[0]["references"][0]["offset"], 6);

    let elapsed = report["elapsed"].as_str().expect("elapsed string");
    assert!(elapsed.ends_with("ms"));
    assert!(elapsed.trim_end_matches("ms").parse::<u64>().is_ok());
    assert!(report.get("faults").is_none());
}

#[test]
fn one_shot_with_buffer_snapshot() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("main.uva");
    let buffer = dir.path().join("main.uva.swp");
    fs::write(&input, "class Saved\nend").expect("write input");
    fs::write(&buffer, "class Edited\nend\nEdited").expect("write buffer");

    let assert = analyzer().arg(&input).arg(&buffer).assert().success();
    let report = single_document(&assert.get_output().stdout);

    assert_eq!(report["declarations"][0]["name"], "Edited");
    assert_eq!(report["declarations"][0]["location"]["file"], path_str(&input));
    assert_eq!(
        report["declarations"][0]["references"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
}

#[test]
fn reports_findings_inside_included_files() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("main.uva");
    let shared = dir.path().join("shared.uva");
    fs::write(&shared, "let greeting = \"hello\"\nclass Shared\nend").expect("write include");
    fs::write(&input, "#include 'shared.uva'\nShared").expect("write input");

    let assert = analyzer().arg(&input).assert().success();
    let report = single_document(&assert.get_output().stdout);

    assert_eq!(report["linter"][0]["location"]["file"], path_str(&shared));
    assert_eq!(report["linter"][0]["location"]["offset"], 15);
    let references = report["declarations"][0]["references"]
        .as_array()
        .expect("references");
    assert_eq!(references.len(), 2);
    assert_eq!(references[0]["file"], path_str(&shared));
    assert_eq!(references[1]["file"], path_str(&input));
}

#[test]
fn missing_input_exits_with_status_1_and_no_stdout() {
    let dir = tempdir().expect("tempdir");

    analyzer()
        .arg(dir.path().join("missing.uva"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn directory_input_is_rejected() {
    let dir = tempdir().expect("tempdir");

    analyzer()
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("is not a regular file"));
}

#[test]
fn usage_errors_exit_with_status_1() {
    analyzer()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage"));

    analyzer()
        .args(["a.uva", "b.uva", "c.uva"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    analyzer()
        .args(["--server", "a.uva"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--server takes no arguments"));

    analyzer()
        .arg("--no-such-flag")
        .assert()
        .code(1);
}

#[test]
fn help_is_printed_to_stdout_and_exits_cleanly() {
    analyzer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--server"));
}

#[test]
fn syntax_errors_still_produce_a_report() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.uva");
    fs::write(&input, "class Early\nend\nlet a = \"x\"\nlet b = @ 'never reached'").expect("write");

    let assert = analyzer().arg(&input).assert().success();
    let report = single_document(&assert.get_output().stdout);
    assert_eq!(report["linter"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["declarations"][0]["name"], "Early");
    assert!(report.get("faults").is_none());
}

#[test]
fn report_faults_flag_surfaces_recovered_faults() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.uva");
    fs::write(&input, "class Early\nend\nlet b = @").expect("write");

    let assert = analyzer()
        .arg("--report-faults")
        .arg(&input)
        .assert()
        .success();
    let report = single_document(&assert.get_output().stdout);
    let faults = report["faults"].as_array().expect("faults array");
    assert!(!faults.is_empty());
    assert!(faults[0].as_str().is_some_and(|f| f.contains("unexpected character")));
}

#[test]
fn server_answers_each_request_independently() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("first.uva");
    let second = dir.path().join("second.uva");
    fs::write(&first, EXAMPLE).expect("write first");
    fs::write(&second, "class Other\nend").expect("write second");

    let requests = format!(
        "{0}\n{0}\n{1}\n{1}\n",
        first.display(),
        second.display()
    );
    let assert = analyzer()
        .arg("--server")
        .write_stdin(requests)
        .assert()
        .success();

    let docs = documents(&assert.get_output().stdout);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["declarations"][0]["name"], "Foo");
    assert_eq!(docs[0]["linter"].as_array().map(Vec::len), Some(1));

    let second_declarations = docs[1]["declarations"].as_array().expect("declarations");
    assert_eq!(second_declarations.len(), 1);
    assert_eq!(second_declarations[0]["name"], "Other");
    assert_eq!(docs[1]["linter"].as_array().map(Vec::len), Some(0));
}

#[test]
fn server_survives_deeply_nested_request() {
    let dir = tempdir().expect("tempdir");
    let hostile = dir.path().join("hostile.uva");
    let good = dir.path().join("good.uva");
    fs::write(&hostile, format!("class Foo end\n{}", "(".repeat(200_000))).expect("write");
    fs::write(&good, "class Good\nend").expect("write");

    let requests = format!("{0}\n{0}\n{1}\n{1}\n", hostile.display(), good.display());
    let assert = analyzer()
        .arg("--server")
        .write_stdin(requests)
        .assert()
        .success();

    let docs = documents(&assert.get_output().stdout);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["declarations"][0]["name"], "Foo");
    assert_eq!(docs[1]["declarations"][0]["name"], "Good");
}

#[test]
fn server_exits_on_fatal_request() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("good.uva");
    fs::write(&good, "class Good\nend").expect("write");
    let missing = dir.path().join("missing.uva");

    let requests = format!(
        "{0}\n{0}\n{1}\n{1}\n{0}\n{0}\n",
        good.display(),
        missing.display()
    );
    let assert = analyzer()
        .arg("--server")
        .write_stdin(requests)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));

    assert_eq!(documents(&assert.get_output().stdout).len(), 1);
}

#[test]
fn server_with_empty_input_exits_cleanly() {
    analyzer()
        .arg("--server")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

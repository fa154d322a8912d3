//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXAMPLE_BANK: &str = "../../banks/example.toml";

fn levelcheck() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("levelcheck").unwrap();
    cmd.env_remove("LEVELCHECK_TIME_LIMIT_SECS");
    cmd
}

/// Files in `dir` with the given extension.
fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

fn write_answer_sheet(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("answers.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn validate_example_bank() {
    levelcheck()
        .arg("validate")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .assert()
        .success()
        .stdout(predicate::str::contains("22 questions: 10 vocabulary, 12 grammar"))
        .stdout(predicate::str::contains("All banks valid"));
}

#[test]
fn validate_directory() {
    levelcheck()
        .arg("validate")
        .arg("--bank")
        .arg("../../banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vocabulary and Grammar Placement"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("thin.toml");
    std::fs::write(
        &path,
        r#"
[bank]
id = "thin"
name = "Thin"

[[questions]]
id = "G1"
section = "grammar"
text = "Pick one."
correct_option = "a"
[questions.options]
a = "yes"
b = "no"
"#,
    )
    .unwrap();

    levelcheck()
        .arg("validate")
        .arg("--bank")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[G1] WARNING"))
        .stdout(predicate::str::contains("Vocabulary section has no questions"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    levelcheck()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created levelcheck.toml"))
        .stdout(predicate::str::contains("Created banks/example.toml"));

    assert!(dir.path().join("levelcheck.toml").exists());
    assert!(dir.path().join("banks/example.toml").exists());

    // The scaffolded bank is valid.
    levelcheck()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--bank")
        .arg("banks/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All banks valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    levelcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    levelcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn grade_writes_all_formats() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let answers = write_answer_sheet(
        dir.path(),
        r#"{
            "student_name": "Ada Lovelace",
            "answers": {"V1": "b", "V2": "c", "G1": "a", "Z9": "a"},
            "elapsed_secs": 754
        }"#,
    );

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(&out)
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stdout(predicate::str::contains("2/10"))
        .stdout(predicate::str::contains("Time taken: 12:34"))
        .stdout(predicate::str::contains("Listen up, Ada Lovelace."))
        .stderr(predicate::str::contains("Skipping answer: unknown question: Z9"));

    let json = files_with_extension(&out, "json");
    assert_eq!(json.len(), 1);
    let name = json[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("report-Ada_Lovelace-"), "{name}");
    assert_eq!(files_with_extension(&out, "html").len(), 1);
    assert_eq!(files_with_extension(&out, "md").len(), 1);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json[0]).unwrap()).unwrap();
    assert_eq!(report["scores"]["vocabulary"]["correct"], 2);
    assert_eq!(report["scores"]["grammar"]["correct"], 0);
    assert_eq!(report["elapsed_secs"], 754);
    assert_eq!(report["vocabulary"]["level"], "A2");
}

#[test]
fn grade_rejects_blank_name() {
    let dir = TempDir::new().unwrap();
    let answers = write_answer_sheet(dir.path(), r#"{"student_name": "  ", "answers": {}}"#);

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("a student name is required"));
}

#[test]
fn grade_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let answers = write_answer_sheet(dir.path(), r#"{"student_name": "Ada"}"#);

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn show_renders_saved_report() {
    let dir = TempDir::new().unwrap();
    let answers = write_answer_sheet(
        dir.path(),
        r#"{"student_name": "Grace", "answers": {"G6": "b", "G8": "a"}}"#,
    );

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(dir.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let report = files_with_extension(dir.path(), "json")
        .into_iter()
        .find(|p| p.file_name().unwrap().to_string_lossy().starts_with("report-"))
        .unwrap();

    levelcheck()
        .arg("show")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Grammar areas (weakest first)"))
        .stdout(predicate::str::contains("Modals"))
        .stdout(predicate::str::contains("Listen up, Grace."));

    levelcheck()
        .arg("show")
        .arg("--report")
        .arg(&report)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Assessment report: Grace"))
        .stdout(predicate::str::contains("| Grammar | 2/12 |"));
}

#[test]
fn grade_keeps_report_inside_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let answers = write_answer_sheet(
        dir.path(),
        r#"{"student_name": "x/../../A/B", "answers": {"V1": "b"}}"#,
    );

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(&out)
        .arg("--format")
        .arg("html")
        .assert()
        .success();

    let entries: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_file());
    let name = entries[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("report-x_______A_B-"), "{name}");
    assert!(!dir.path().join("A").exists());
}

#[test]
fn grade_replays_large_elapsed_time_at_once() {
    let dir = TempDir::new().unwrap();
    let answers = write_answer_sheet(
        dir.path(),
        r#"{"student_name": "Ada", "elapsed_secs": 1000000000000000}"#,
    );

    levelcheck()
        .arg("grade")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--format")
        .arg("json")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Listen up, Ada."));
}

#[test]
fn show_nonexistent_report() {
    levelcheck()
        .arg("show")
        .arg("--report")
        .arg("no_such_file.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[test]
fn take_answers_and_submits() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--name")
        .arg("Ada")
        .arg("--seed")
        .arg("7")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("1\n2\np\nt\ng G12\n3\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/22] Vocabulary | V1"))
        .stdout(predicate::str::contains("[22/22] Grammar | G12"))
        .stdout(predicate::str::contains("2/22 answered"))
        .stdout(predicate::str::contains("Listen up, Ada."))
        .stderr(predicate::str::contains("Submitted: 3/22 answered"));

    assert_eq!(files_with_extension(dir.path(), "json").len(), 1);
}

#[test]
fn take_without_timer_cannot_extend() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--name")
        .arg("Ada")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("x\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("the timer is disabled"));
}

#[test]
fn take_timed_session_extends() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--name")
        .arg("Ada")
        .arg("--timer")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("x\nx\nx\nx\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 extension(s) remaining"))
        .stdout(predicate::str::contains("no time extensions left (3 of 3 used)"));
}

#[test]
fn take_quit_abandons_without_report() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--name")
        .arg("Ada")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("1\nq\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Assessment abandoned."));

    assert!(files_with_extension(dir.path(), "json").is_empty());
}

#[test]
fn take_submits_at_end_of_input() {
    let dir = TempDir::new().unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--output")
        .arg(dir.path())
        .write_stdin("Bob\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Your name: "))
        .stdout(predicate::str::contains("We have work to do."))
        .stderr(predicate::str::contains("End of input, submitting."));
}

#[test]
fn take_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("levelcheck.toml");
    std::fs::write(
        &config,
        format!(
            "time_limit_secs = 90\ndefault_format = \"markdown\"\noutput_dir = \"{}\"\n",
            dir.path().join("reports").display()
        ),
    )
    .unwrap();

    levelcheck()
        .env("HOME", dir.path())
        .arg("take")
        .arg("--bank")
        .arg(EXAMPLE_BANK)
        .arg("--name")
        .arg("Ada")
        .arg("--timer")
        .arg("--config")
        .arg(&config)
        .write_stdin("t\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("01:30 on the clock"));

    assert_eq!(files_with_extension(&dir.path().join("reports"), "md").len(), 1);
}

#[test]
fn help_output() {
    levelcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vocabulary and grammar placement assessment"));
}

#[test]
fn version_output() {
    levelcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("levelcheck"));
}

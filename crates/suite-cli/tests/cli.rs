use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

fn suite(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_suite"))
        .args(args)
        .output()
        .expect("spawn suite binary")
}

fn build_power(out: &str) {
    let plan = fixture_path("plans/small-reactor/power.yaml");
    let output = suite(&["build", "--plan", plan.to_str().unwrap(), "--out", out]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn build_then_discover_prints_every_case() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("cases");
    let out = out.to_str().unwrap();
    build_power(out);
    assert!(tmp.path().join("cases/power-0003/power-0003.yaml").is_file());
    assert!(tmp
        .path()
        .join("cases/power-0003/power-0003-blueprints.yaml")
        .is_file());

    let summary = tmp.path().join("summary.csv");
    let output = suite(&[
        "discover",
        "--root",
        out,
        "--pattern",
        "power-????.yaml",
        "--summary",
        summary.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.lines().next().unwrap().starts_with("index"));
    assert!(stdout.contains("power-0002"));
    let csv = fs::read_to_string(summary).unwrap();
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn build_with_missing_plan_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let plan = tmp.path().join("absent.yaml");
    let output = suite(&["build", "--plan", plan.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("plan-read"));
}

#[test]
fn discover_missing_root_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("nowhere");
    let output = suite(&["discover", "--root", root.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[cfg(unix)]
#[test]
fn run_invokes_program_in_each_case_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("cases");
    let out = out.to_str().unwrap();
    build_power(out);

    let output = suite(&[
        "run",
        "--root",
        out,
        "--pattern",
        "power-????.yaml",
        "--program",
        "sh",
        "--",
        "-c",
        "test -f \"$0\" && touch ran",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4);
    for index in 0..4 {
        assert!(tmp
            .path()
            .join(format!("cases/power-000{index}/ran"))
            .is_file());
    }
}

#[cfg(unix)]
#[test]
fn run_reports_failing_cases() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("cases");
    let out = out.to_str().unwrap();
    build_power(out);

    let output = suite(&[
        "run", "--root", out, "--program", "sh", "--", "-c", "exit 3",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("power-0000"));
    assert!(stderr.contains("power-0003"));
}

#[cfg(unix)]
#[test]
fn custom_layout_flows_through_discover_and_run() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("cases");
    let out = out.to_str().unwrap();
    let plan = fixture_path("plans/small-reactor/layout.yaml");
    let output = suite(&["build", "--plan", plan.to_str().unwrap(), "--out", out]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(tmp.path().join("cases/layout-0001/layout-0001-bp.yml").is_file());

    let output = suite(&[
        "discover",
        "--root",
        out,
        "--extension",
        "yml",
        "--design-suffix=-bp",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 3);

    let output = suite(&[
        "run",
        "--root",
        out,
        "--extension",
        "yml",
        "--design-suffix=-bp",
        "--program",
        "sh",
        "--",
        "-c",
        "test -f \"$0\"",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 2);
}

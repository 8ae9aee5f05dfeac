use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LOCATIONS: &str = "\
StringID,Type,x,y,demand,ReadyTime,DueDate,ServiceTime
D0,d,0,0,0,0,1000,0
C1,c,0,10,10,0,1000,0
";

// battery capacity equals the round trip, so a full-to-empty tour exists
const OTHER: &str = "\
Q,C,h,g,v
20.0,200.0,1.0,1.0,1.0
";

fn write_instance(dir: &TempDir, name: &str) {
    std::fs::write(dir.path().join(format!("{name}_locations.csv")), LOCATIONS).unwrap();
    std::fs::write(dir.path().join(format!("{name}_other.csv")), OTHER).unwrap();
}

#[test]
fn test_solve_writes_result_file() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_instance(&data, "tiny");

    Command::cargo_bin("evrptw")
        .unwrap()
        .args(["solve", "--data-dir"])
        .arg(data.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("tiny")
        .assert()
        .success();

    let result = out.path().join("tiny_result.csv");
    let body = std::fs::read_to_string(result).unwrap();
    assert!(body.starts_with("objective,"));
    // one customer out and back: distance 20
    assert!(body.lines().next().unwrap().contains("20"));
    assert!(body.lines().any(|l| l.starts_with("x,0,1,")));
}

#[test]
fn test_bd_cost_reuses_solve_output() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let priced = TempDir::new().unwrap();
    write_instance(&data, "tiny");

    Command::cargo_bin("evrptw")
        .unwrap()
        .args(["solve", "--data-dir"])
        .arg(data.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("tiny")
        .assert()
        .success();

    Command::cargo_bin("evrptw")
        .unwrap()
        .args(["bd-cost", "--data-dir"])
        .arg(data.path())
        .arg("--out-dir")
        .arg(priced.path())
        .arg("--routes-dir")
        .arg(out.path())
        .arg("--lb")
        .arg("0.0")
        .arg("--ub")
        .arg("1.0")
        .arg("tiny")
        .assert()
        .success();

    let body = std::fs::read_to_string(priced.path().join("tiny_result.csv")).unwrap();
    assert!(body.starts_with("objective,"));
}

#[test]
fn test_missing_instance_fails_batch() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    Command::cargo_bin("evrptw")
        .unwrap()
        .args(["solve", "--data-dir"])
        .arg(data.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("nope")
        .assert()
        .failure()
        .stdout(predicate::str::contains("nope"));
}

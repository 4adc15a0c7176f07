use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cli() -> Command {
    Command::cargo_bin("flagcell_cli").unwrap()
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create config file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config file");
    file
}

#[test]
fn test_scenario_command() {
    cli()
        .arg("scenario")
        .assert()
        .success()
        .stdout(predicate::str::contains("unsynced  new"))
        .stdout(predicate::str::contains("synced    flip"))
        .stdout(predicate::str::contains("scenario: ok"))
        .stdout(predicate::str::contains("MISMATCH").not());
}

#[test]
fn test_parity_command_odd_threads() {
    cli()
        .args(["parity", "--threads", "5", "--rounds", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "parity: 5 threads x 3 rounds, expected true",
        ))
        .stdout(predicate::str::contains("mismatched rounds: 0"));
}

#[test]
fn test_parity_command_json() {
    let output = cli()
        .args(["parity", "--threads", "4", "--rounds", "2", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["threads"], 4);
    assert_eq!(report["expected"], false);
    assert_eq!(report["mismatched_rounds"], 0);
    assert!(report["stats"]["acquisitions"].as_u64().unwrap() > 0);
}

#[test]
fn test_stress_command() {
    cli()
        .args([
            "stress",
            "--readers",
            "3",
            "--writers",
            "2",
            "--iterations",
            "200",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "stress: 3 readers, 2 writers x 200 iterations",
        ))
        .stdout(predicate::str::contains("0 stale"))
        .stdout(predicate::str::contains("final state: true"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let config = config_file(
        r#"
        [flag]
        name = "from-config"

        [stress]
        threads = 3
        rounds = 1
        "#,
    );

    cli()
        .arg("parity")
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("parity: 3 threads x 1 rounds"));
}

#[test]
fn test_command_line_overrides_config() {
    let config = config_file("[stress]\nthreads = 3\nrounds = 1\n");

    cli()
        .args(["parity", "--threads", "2"])
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "parity: 2 threads x 1 rounds, expected false",
        ));
}

#[test]
fn test_invalid_config_fails() {
    let config = config_file("[stress]\nthreads = 0\n");

    cli()
        .arg("parity")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("threads must be at least 1"));
}

#[test]
fn test_unused_stress_fields_are_not_checked() {
    let config = config_file("[stress]\nthreads = 0\nrounds = 0\n");

    cli()
        .arg("scenario")
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("scenario: ok"));

    cli()
        .args(["stress", "--readers", "1", "--writers", "1", "--iterations", "10"])
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 stale"));
}

#[test]
fn test_stress_rejects_zero_iterations_from_config() {
    let config = config_file("[stress]\niterations = 0\n");

    cli()
        .arg("stress")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("iterations must be at least 1"));

    cli()
        .arg("parity")
        .arg("--config")
        .arg(config.path())
        .assert()
        .success();
}

#[test]
fn test_zero_threads_flag_rejected() {
    cli()
        .args(["parity", "--threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid options"));
}

#[test]
fn test_missing_config_file_fails() {
    cli()
        .args(["scenario", "--config", "/nonexistent/flagcell.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not load"));
}

#[test]
fn test_debug_logging_goes_to_stderr() {
    cli()
        .args(["parity", "--threads", "1", "--rounds", "1"])
        .args(["--log-level", "debug", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[DEBUG]"))
        .stdout(predicate::str::starts_with("{"));
}

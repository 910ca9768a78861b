use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn commands_prints_flat_list() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netcfg"));
    cmd.arg("commands")
        .arg(fixture("fixtures/site"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "firewall group address-group external-addresses description 'External addresses'\n",
        ))
        .stdout(predicate::str::contains(
            "firewall name lan-in rule 10 state invalid enable\n",
        ))
        .stdout(predicate::str::contains(
            "interfaces ethernet eth1 firewall out name lan-out\n",
        ))
        .stdout(predicate::str::contains("# group").not());
}

#[test]
fn commands_grouped_prints_group_headers() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netcfg"));
    cmd.arg("commands")
        .arg(fixture("fixtures/site"))
        .arg("--grouped")
        .assert()
        .success()
        .stdout(predicate::str::contains("# group 0\n"))
        .stdout(predicate::str::contains("\n\n# group 1\nsystem host-name edge1\n"));
}

#[test]
fn commands_fails_for_unreadable_descriptor() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("global.yaml"), "- just\n- a list\n").expect("write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netcfg"));
    cmd.arg("commands")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a mapping"));
}

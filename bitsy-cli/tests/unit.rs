use bitsy_test_utils::FakeHost;
use predicates::prelude::*;

mod common;

#[test]
fn test_unit_renders_for_host() {
    let ctx = common::bitsy(FakeHost::new());

    ctx.new_cmd()
        .args(["unit", "--user", "pi", "--exec", "/usr/local/bin/bitsy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User=pi\n"))
        .stdout(predicate::str::contains(format!(
            "ExecStart=/usr/local/bin/bitsy --config {} start\n",
            ctx.config.display()
        )))
        .stdout(predicate::str::contains(format!(
            "PIDFile={}\n",
            ctx.host.pid_file().display()
        )))
        .stdout(predicate::str::contains("Restart=on-failure"));
}

#[test]
fn test_unit_grants_devices_as_root() {
    let ctx = common::bitsy(FakeHost::new());

    ctx.new_cmd()
        .args(["unit", "--user", "pi", "--exec", "/usr/local/bin/bitsy"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "ExecStartPre=+/usr/local/bin/bitsy --config {} grant\n",
            ctx.config.display()
        )));
}

#[test]
fn test_unit_uses_configured_unit_settings() {
    let host = FakeHost::new();
    let mut provision = host.provision_options();
    provision.exec_args = vec!["start".to_string(), "--skip-entry-check".to_string()];
    provision.grant_args = None;
    let config = host.write_config_with(&provision);
    let ctx = common::TestContext { host, config };

    ctx.new_cmd()
        .arg("unit")
        .assert()
        .success()
        .stdout(predicate::str::contains("User=pi\n"))
        .stdout(predicate::str::contains(format!(
            "ExecStart={} --config {} start --skip-entry-check\n",
            provision.exec.as_ref().unwrap().display(),
            ctx.config.display()
        )))
        .stdout(predicate::str::contains("ExecStartPre=").not());
}

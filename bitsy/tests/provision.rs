//! Integration tests for host provisioning.

use bitsy::BitsyError;
use bitsy::provision::{ProvisionStep, Provisioner, StepStatus};
use bitsy_test_utils::{FakeHost, RecordingRunner};
use std::sync::Arc;

fn provisioner(host: &FakeHost, runner: &Arc<RecordingRunner>) -> Provisioner {
    Provisioner::new(host.provision_options(), &host.options())
        .unwrap()
        .with_runner(runner.clone())
}

#[test]
fn first_run_applies_every_step() {
    let host = FakeHost::new();
    let runner = Arc::new(RecordingRunner::new());

    let report = provisioner(&host, &runner).run().unwrap();

    assert_eq!(report.status(ProvisionStep::Hardware), Some(StepStatus::Changed));
    assert_eq!(report.status(ProvisionStep::Groups), Some(StepStatus::Changed));
    assert_eq!(report.status(ProvisionStep::VirtualEnv), Some(StepStatus::Changed));
    assert_eq!(report.status(ProvisionStep::Credentials), Some(StepStatus::Unchanged));
    assert_eq!(report.status(ProvisionStep::Executable), Some(StepStatus::Unchanged));
    assert_eq!(report.status(ProvisionStep::Unit), Some(StepStatus::Changed));
    assert_eq!(report.warnings().count(), 0);

    let venv = host.work_dir().join("venv");
    assert_eq!(
        runner.commands(),
        vec![
            "usermod -aG gpio,i2c,audio pi".to_string(),
            format!("python3 -m venv {}", venv.display()),
            "systemctl daemon-reload".to_string(),
            "systemctl enable bitsy.service".to_string(),
        ]
    );
}

#[test]
fn boot_config_and_modules_are_edited() {
    let host = FakeHost::new();
    let options = host.provision_options();
    std::fs::write(&options.boot_config, "[all]\ndtparam=audio=on\n").unwrap();
    let runner = Arc::new(RecordingRunner::new());

    provisioner(&host, &runner).run().unwrap();

    let config = std::fs::read_to_string(&options.boot_config).unwrap();
    assert_eq!(config, "[all]\ndtparam=audio=on\ndtparam=i2c_arm=on\n");
    let modules = std::fs::read_to_string(&options.modules_file).unwrap();
    assert_eq!(modules, "i2c-dev\n");
}

#[test]
fn unit_file_points_at_sequencer() {
    let host = FakeHost::new();
    let runner = Arc::new(RecordingRunner::new());
    let provisioner = provisioner(&host, &runner);

    provisioner.run().unwrap();

    let unit = std::fs::read_to_string(provisioner.unit_path()).unwrap();
    let exec = host.provision_options().exec.unwrap();
    assert!(unit.contains(&format!("ExecStart={} start\n", exec.display())));
    assert!(unit.contains(&format!("PIDFile={}\n", host.pid_file().display())));
    assert!(unit.contains(&format!(
        "WorkingDirectory={}\n",
        host.work_dir().display()
    )));
    assert!(unit.contains("Restart=on-failure\n"));
    // Device grants run with full privileges ahead of the unprivileged start
    assert!(unit.contains(&format!("ExecStartPre=+{} grant\n", exec.display())));
    assert!(unit.contains("User=pi\n"));
}

#[test]
fn second_run_changes_nothing() {
    let host = FakeHost::new().with_venv();
    let runner = Arc::new(RecordingRunner::new());
    provisioner(&host, &runner).run().unwrap();

    let runner = Arc::new(RecordingRunner::new());
    let report = provisioner(&host, &runner).run().unwrap();

    assert_eq!(report.status(ProvisionStep::Hardware), Some(StepStatus::Unchanged));
    assert_eq!(report.status(ProvisionStep::VirtualEnv), Some(StepStatus::Unchanged));
    assert_eq!(report.status(ProvisionStep::Unit), Some(StepStatus::Unchanged));
    // Group membership is always re-applied; systemctl is not
    assert_eq!(runner.commands(), vec!["usermod -aG gpio,i2c,audio pi"]);
}

#[test]
fn dry_run_touches_nothing() {
    let host = FakeHost::new();
    let mut options = host.provision_options();
    options.dry_run = true;
    let runner = Arc::new(RecordingRunner::new());

    let provisioner = Provisioner::new(options.clone(), &host.options())
        .unwrap()
        .with_runner(runner.clone());
    let report = provisioner.run().unwrap();

    assert!(runner.commands().is_empty());
    assert!(!options.boot_config.exists());
    assert!(!provisioner.unit_path().exists());
    assert_eq!(report.status(ProvisionStep::Unit), Some(StepStatus::Planned));
    assert_eq!(report.status(ProvisionStep::Hardware), Some(StepStatus::Planned));
}

#[test]
fn missing_credentials_and_binary_are_warnings() {
    let host = FakeHost::new().without_credentials();
    let mut options = host.provision_options();
    options.exec = Some(host.root().join("missing/bitsy"));
    let runner = Arc::new(RecordingRunner::new());

    let report = Provisioner::new(options, &host.options())
        .unwrap()
        .with_runner(runner)
        .run()
        .unwrap();

    let warned: Vec<ProvisionStep> = report.warnings().map(|s| s.step).collect();
    assert_eq!(
        warned,
        vec![ProvisionStep::Credentials, ProvisionStep::Executable]
    );
    assert!(!host.credentials().exists());
}

#[test]
fn unreadable_boot_config_is_an_error() {
    let host = FakeHost::new();
    let mut options = host.provision_options();
    options.dry_run = true;
    // Reading a directory fails with something other than NotFound
    std::fs::create_dir_all(&options.boot_config).unwrap();
    let runner = Arc::new(RecordingRunner::new());

    let err = Provisioner::new(options, &host.options())
        .unwrap()
        .with_runner(runner.clone())
        .run()
        .unwrap_err();

    assert!(matches!(err, BitsyError::Provision(_)));
    assert!(err.to_string().contains("config.txt"));
    assert!(runner.commands().is_empty());
}

#[test]
fn missing_boot_config_is_planned() {
    let host = FakeHost::new();
    let mut options = host.provision_options();
    options.dry_run = true;

    let report = Provisioner::new(options, &host.options())
        .unwrap()
        .with_runner(Arc::new(RecordingRunner::new()))
        .run()
        .unwrap();

    assert_eq!(report.status(ProvisionStep::Hardware), Some(StepStatus::Planned));
}

#![allow(dead_code)]

use assert_cmd::Command;
use bitsy_test_utils::FakeHost;
use std::path::PathBuf;
use std::time::Duration;

pub struct TestContext {
    pub host: FakeHost,
    pub config: PathBuf,
}

impl TestContext {
    /// `bitsy --config <host options>`, isolated from the caller's environment.
    pub fn new_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_bitsy");
        let mut cmd = Command::new(bin_path);
        cmd.timeout(Duration::from_secs(30));
        cmd.env_remove("BITSY_HOME")
            .env_remove("BITSY_CONFIG")
            .env_remove("RUST_LOG");
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

pub fn bitsy(host: FakeHost) -> TestContext {
    let config = host.write_config();
    TestContext { host, config }
}

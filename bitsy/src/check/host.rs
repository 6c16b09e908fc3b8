//! The startup check list for a Bitsy host.

use super::{CheckId, Probe, ReadinessCheck};
use crate::options::SequencerOptions;
use bitsy_shared::layout::StartupLayout;

/// Build the ordered startup checks.
///
/// Order: GPIO, I2C, entry point (when required), virtual environment,
/// credentials. The virtual environment is the only optional check.
pub fn startup_checks(options: &SequencerOptions, layout: &StartupLayout) -> Vec<ReadinessCheck> {
    let mut checks = Vec::with_capacity(5);

    checks.push(
        ReadinessCheck::required(
            CheckId::Gpio,
            "GPIO interface",
            Probe::DirExists(options.gpio_dir.clone()),
            "GPIO not available",
        )
        .with_hint(format!(
            "{} does not exist. Check the kernel has GPIO sysfs support and the \
             service started after udev.",
            options.gpio_dir.display()
        )),
    );

    checks.push(
        ReadinessCheck::required(
            CheckId::I2c,
            "I2C device",
            Probe::PathExists(options.i2c_device.clone()),
            "I2C not available",
        )
        .with_hint(format!(
            "{} does not exist. Enable I2C with `bitsy provision` or \
             `sudo raspi-config nonint do_i2c 0`, then reboot.",
            options.i2c_device.display()
        )),
    );

    if options.require_entry_point {
        let entry = layout.entry_point();
        checks.push(
            ReadinessCheck::required(
                CheckId::EntryPoint,
                "Entry point",
                Probe::FileExists(entry.clone()),
                format!("{} not found", entry.display()),
            )
            .with_hint(format!(
                "Copy the application into {}",
                layout.root().display()
            )),
        );
    }

    let venv = layout.venv_dir();
    checks.push(
        ReadinessCheck::optional(
            CheckId::VirtualEnv,
            "Virtual environment",
            Probe::DirExists(venv.clone()),
            format!(
                "Virtual environment not found at {}, using system Python",
                venv.display()
            ),
        )
        .with_hint(format!("python3 -m venv {}", venv.display())),
    );

    let credentials = layout.credentials();
    checks.push(
        ReadinessCheck::required(
            CheckId::Credentials,
            "Credentials",
            Probe::FileExists(credentials.clone()),
            format!("{} file not found", credentials.display()),
        )
        .with_hint("Create it with OPENAI_API_KEY=<key>"),
    );

    checks
}

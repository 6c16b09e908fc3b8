//! Constants for Bitsy
//!
//! Centralized location for the fixed paths and names the robot image uses.
//! Every path here is only a default; options can override all of them.

/// Hardware interfaces on a Raspberry Pi.
pub mod hardware {
    /// GPIO sysfs interface directory
    pub const GPIO_DIR: &str = "/sys/class/gpio";

    /// I2C bus 1 device node (servo/motor HAT)
    pub const I2C_DEVICE: &str = "/dev/i2c-1";

    /// ALSA control node of the first sound card
    pub const AUDIO_DEVICE: &str = "/dev/snd/controlC0";

    /// Mode granted on device nodes before launch (rw for everyone)
    pub const DEVICE_MODE: u32 = 0o666;
}

/// Files inside the working directory.
pub mod files {
    /// Voice-interaction entry point
    pub const ENTRY_POINT: &str = "chatgpt.py";

    /// Credential file (OPENAI_API_KEY and friends)
    pub const CREDENTIALS: &str = ".env";

    /// Virtual environment directory
    pub const VENV_DIR: &str = "venv";

    /// Append-only startup log
    pub const LOG_FILE: &str = "bitsy.log";

    /// Single-line PID file
    pub const PID_FILE: &str = "bitsy.pid";
}

/// Interpreter selection.
pub mod interpreter {
    /// Fallback when no virtual environment is present
    pub const SYSTEM: &str = "python3";

    /// Interpreter path relative to a virtual environment root
    pub const VENV_RELATIVE: &str = "bin/python3";
}

/// Environment variables.
pub mod envs {
    /// Overrides the working directory
    pub const BITSY_HOME: &str = "BITSY_HOME";

    /// Points at a JSON options file
    pub const BITSY_CONFIG: &str = "BITSY_CONFIG";

    /// Variables exported to the application to keep JACK from auto-starting.
    pub const AUDIO_SUPPRESSION: &[(&str, &str)] = &[
        ("JACK_NO_START_SERVER", "1"),
        ("JACK_NO_AUDIO_RESERVATION", "1"),
    ];
}

/// Startup timing.
pub mod timing {
    /// Unconditional delay before hardware checks, in seconds
    pub const SETTLE_DELAY_SECS: u64 = 10;
}

/// systemd integration.
pub mod service {
    pub const UNIT_NAME: &str = "bitsy.service";

    pub const UNIT_DIR: &str = "/etc/systemd/system";

    pub const RESTART_SEC: u64 = 10;
}

/// Boot configuration used when enabling hardware interfaces.
pub mod boot {
    /// Boot config on Raspberry Pi OS bookworm and later
    pub const CONFIG_TXT: &str = "/boot/firmware/config.txt";

    pub const MODULES_FILE: &str = "/etc/modules";

    pub const I2C_DTPARAM: &str = "dtparam=i2c_arm=on";

    pub const I2C_MODULE: &str = "i2c-dev";

    /// Groups the service user must belong to
    pub const GROUPS: &[&str] = &["gpio", "i2c", "audio"];
}

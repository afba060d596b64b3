//! Global constants for crc-settings
//!
//! Centralized location for application-wide constants

/// Application subsystem identifier for macOS Unified Logging System
pub const APP_SUBSYSTEM: &str = "com.redhat.codeready.containers.settings";

/// Category used for all settings pane log events
pub const PANE_CATEGORY: &str = "preferences";

/// Directory under the user's home holding the daemon socket and our config
pub const CRC_HOME_DIR: &str = ".crc";

/// Daemon command socket file name (inside `CRC_HOME_DIR`)
pub const DAEMON_SOCKET_NAME: &str = "crc.sock";

/// Settings file name (inside `CRC_HOME_DIR`)
pub const SETTINGS_FILE_NAME: &str = "crc-settings.toml";

/// Placeholder rendered for string properties the daemon has no value for
pub const UNSET_PLACEHOLDER: &str = "Unset";

/// Lower bound of the cpu slider
pub const MINIMUM_CPUS: i64 = 4;

/// Lower bound of the memory slider, in MiB
pub const MINIMUM_MEMORY_MIB: i64 = 9216;

/// Lower bound of the disk size stepper, in GiB
pub const MINIMUM_DISK_SIZE_GIB: i64 = 31;

/// Range of the disk size stepper above its minimum, in GiB
pub const DISK_SIZE_RANGE_GIB: i64 = 30;

// src/constants.rs
//! Names and defaults shared by the binary.

/// Environment variable overriding where the log file is written.
pub const LOG_PATH_ENV: &str = "NOTION_PATCH_LOG";

/// Log file name used when `NOTION_PATCH_LOG` is not set.
pub const DEFAULT_LOG_FILE: &str = "notion_patch.log";

/// Pattern used by the file appender and by the console in verbose mode.
pub const DETAILED_LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}";

/// Pattern used by the console otherwise.
pub const PLAIN_LOG_PATTERN: &str = "{m}{n}";

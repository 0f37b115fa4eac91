//! Configuration and runtime state paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/netrounds-testgroup/`, `~/.local/share/netrounds-testgroup/`
//! - macOS: `~/Library/Application Support/netrounds-testgroup/`
//! - Windows: `%APPDATA%\netrounds-testgroup\`

use std::path::PathBuf;

/// Application directory name
const APP_NAME: &str = "netrounds-testgroup";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the settings file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the directory holding per-instance runtime state files
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("instances"))
}

/// Path of the runtime state file for an instance inside `dir`
///
/// Instance names are used verbatim except for path separators, which
/// would otherwise escape the state directory.
pub fn instance_state_file(dir: &std::path::Path, instance: &str) -> PathBuf {
    let sanitized: String = instance
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.join(format!("{}.json", sanitized))
}

//! Environment configuration and config-directory discovery.

use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const AGENT_URL: &str = "QUILL_AGENT_URL";
    pub const MODEL: &str = "QUILL_MODEL";
    pub const CONFIG_HOME: &str = "XDG_CONFIG_HOME";
}

/// Default values
pub mod defaults {
    pub const AGENT_URL: &str = "http://localhost:4096";
    pub const MODEL: &str = "gpt-4.1";
    pub const APP_DIR: &str = "quill";
    pub const TASKS_FILE: &str = "tasks.json";
    pub const NOTES_FILE: &str = "notes.json";
}

/// Get the quill config directory.
///
/// Honors `XDG_CONFIG_HOME` when set, falls back to the platform config
/// directory, and finally to the working directory.
pub fn config_dir() -> PathBuf {
    config_dir_from(env::var(env_vars::CONFIG_HOME).ok(), dirs::config_dir())
}

fn config_dir_from(xdg_config_home: Option<String>, platform_dir: Option<PathBuf>) -> PathBuf {
    let base = match xdg_config_home.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => platform_dir.unwrap_or_else(|| PathBuf::from(".")),
    };
    base.join(defaults::APP_DIR)
}

/// Base URL of the external agent runtime.
pub fn agent_url() -> String {
    env::var(env_vars::AGENT_URL).unwrap_or_else(|_| defaults::AGENT_URL.to_string())
}

/// Model the assistant session is created with.
pub fn model() -> String {
    env::var(env_vars::MODEL).unwrap_or_else(|_| defaults::MODEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_prefers_xdg_config_home() {
        let dir = config_dir_from(Some("/tmp/xdg".to_string()), Some(PathBuf::from("/ignored")));
        assert_eq!(dir, PathBuf::from("/tmp/xdg").join(defaults::APP_DIR));
    }

    #[test]
    fn config_dir_ignores_empty_xdg_value() {
        let dir = config_dir_from(Some(String::new()), Some(PathBuf::from("/platform")));
        assert_eq!(dir, PathBuf::from("/platform").join(defaults::APP_DIR));
    }

    #[test]
    fn config_dir_falls_back_to_working_directory() {
        let dir = config_dir_from(None, None);
        assert_eq!(dir, PathBuf::from(".").join(defaults::APP_DIR));
    }
}

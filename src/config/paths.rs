use std::path::PathBuf;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "dashboard.json";

/// Get the path to the dashboard.json file
/// Looks next to the install root first (parent of the bin folder), then the current directory
pub(super) fn get_config_path() -> PathBuf {
    // Executable is at: install_root/bin/kv-dashboard
    // Config should be at: install_root/dashboard.json
    if let Ok(exe_path) = std::env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(install_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = install_root.join(CONFIG_FILE_NAME);
            debug!(path = %config_path.display(), "Looking for config");
            if config_path.exists() {
                return config_path;
            }
        }
    }

    warn!("Using fallback: looking for {CONFIG_FILE_NAME} in current directory");
    PathBuf::from(CONFIG_FILE_NAME)
}

use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typing-sprint";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Directory for state written by the app (history, log)
    pub fn state_dir() -> PathBuf {
        if let Some(proj_dirs) = Self::project_dirs() {
            proj_dirs.data_local_dir().to_path_buf()
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            PathBuf::from(".")
        }
    }

    pub fn history_path() -> PathBuf {
        Self::state_dir().join("history.json")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join(format!("{APP_NAME}.log"))
    }

    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = Self::project_dirs() {
            proj_dirs.config_dir().join("config.json")
        } else {
            PathBuf::from(format!("{APP_NAME}_config.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert!(AppDirs::history_path().ends_with("history.json"));
        assert!(AppDirs::log_path().ends_with("typing-sprint.log"));
        assert!(AppDirs::config_path()
            .to_string_lossy()
            .ends_with("config.json"));
    }

    #[test]
    fn test_history_and_log_share_state_dir() {
        assert_eq!(
            AppDirs::history_path().parent(),
            AppDirs::log_path().parent()
        );
    }
}

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "wordladder";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/wordladder/state.db`, or the platform data dir.
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("state.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("state.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wordladder_config.json")
        }
    }

    /// Both files under one directory, for `--data-dir`.
    pub fn within(dir: &Path) -> (PathBuf, PathBuf) {
        (dir.join("state.db"), dir.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_keeps_files_together() {
        let (db, config) = AppDirs::within(Path::new("/tmp/ladder"));
        assert_eq!(db, PathBuf::from("/tmp/ladder/state.db"));
        assert_eq!(config, PathBuf::from("/tmp/ladder/config.json"));
    }

    #[test]
    fn test_db_path_names_the_app() {
        if let Some(path) = AppDirs::db_path() {
            assert!(path.ends_with("wordladder/state.db"));
        }
    }
}

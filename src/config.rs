use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StorageKind {
    /// JSON files in the per-user data directory
    #[default]
    File,
    /// Process-local key/value store; nothing survives exit
    Memory,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Overrides the platform data directory when set.
    pub data_dir: Option<PathBuf>,
    pub storage: StorageKind,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>, storage: StorageKind) -> Self {
        Self { data_dir, storage }
    }

    /// The directory documents live in, if one can be determined.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(default_data_dir)
    }
}

fn default_data_dir() -> Option<PathBuf> {
    // XDG data directory on Linux, Application Support on macOS, AppData on Windows
    directories::ProjectDirs::from("", "", "jobdesk").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = Config::new(Some(PathBuf::from("/srv/jobdesk")), StorageKind::File);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/srv/jobdesk")));
    }

    #[test]
    fn test_default_storage_is_file() {
        assert_eq!(Config::default().storage, StorageKind::File);
    }
}

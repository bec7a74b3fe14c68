use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
}

impl AppDirs {
    pub fn logs_dir(&self) -> PathBuf {
        self.app_data_root.join("logs")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.app_data_root.join("storage.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn app_dirs_derives_locations_from_data_root() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/merchant-console"),
        };
        assert_eq!(dirs.logs_dir(), PathBuf::from("/tmp/merchant-console/logs"));
        assert_eq!(
            dirs.storage_file(),
            PathBuf::from("/tmp/merchant-console/storage.json")
        );
    }
}

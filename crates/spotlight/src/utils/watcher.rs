//! Config hot reload.
//!
//! Polls the config file's modification time every few frames and hands back
//! a freshly parsed config when it changed.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::Config;

pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    check_counter: u32,
}

impl ConfigWatcher {
    const CHECK_INTERVAL: u32 = 30; // Check every 30 frames (~0.5s at 60fps)

    pub fn new(path: PathBuf) -> Self {
        let last_modified = Self::modified(&path);
        Self {
            path,
            last_modified,
            check_counter: 0,
        }
    }

    /// Watcher on the home config, `None` without a home directory
    pub fn for_home() -> Option<Self> {
        Config::path().map(Self::new)
    }

    fn modified(path: &Path) -> Option<SystemTime> {
        path.metadata().and_then(|m| m.modified()).ok()
    }

    /// Call once per frame. Returns the new config after a change on disk.
    pub fn check_reload(&mut self) -> Option<Config> {
        self.check_counter += 1;
        if self.check_counter < Self::CHECK_INTERVAL {
            return None;
        }
        self.check_counter = 0;

        let modified = Self::modified(&self.path)?;
        if self.last_modified.is_some_and(|last| modified <= last) {
            return None;
        }
        self.last_modified = Some(modified);

        match Config::load_from(&self.path) {
            Ok(config) => {
                log::info!("Reloaded config from {:?}", self.path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Config reload skipped: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_reload_after_change() {
        let dir = std::env::temp_dir().join("spotlight-watcher-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("spotlight.toml");
        fs::write(&path, "profile = \"ROCK\"\n").unwrap();

        let mut watcher = ConfigWatcher::new(path.clone());
        for _ in 0..ConfigWatcher::CHECK_INTERVAL {
            assert!(watcher.check_reload().is_none());
        }

        // Ensure a distinct mtime on coarse-grained filesystems
        std::thread::sleep(Duration::from_millis(1100));
        fs::write(&path, "profile = \"CLASSICAL\"\nadaptive = true\n").unwrap();

        for _ in 0..ConfigWatcher::CHECK_INTERVAL - 1 {
            assert!(watcher.check_reload().is_none());
        }
        let config = watcher.check_reload().unwrap();
        assert_eq!(config.profile_key(), "CLASSICAL");
        assert!(config.adaptive());

        // No further change, no further reload
        for _ in 0..ConfigWatcher::CHECK_INTERVAL {
            assert!(watcher.check_reload().is_none());
        }
    }
}

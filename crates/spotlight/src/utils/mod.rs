mod config;
mod watcher;

pub use config::Config;
pub use watcher::ConfigWatcher;

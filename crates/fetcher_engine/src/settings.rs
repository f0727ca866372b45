use std::path::PathBuf;
use std::time::Duration;

use crate::validate::MAX_IMAGE_BYTES;

pub const DEFAULT_STORAGE_DIR: &str = "Fetched_Images";
pub const DEFAULT_USER_AGENT: &str =
    "Ubuntu-Image-Fetcher/1.0 (Educational Purpose; Respectful Bot)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub storage_dir: PathBuf,
    pub connect_timeout: Duration,
    /// Longest wait for any single read, headers or body.
    pub read_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    /// Pause between two requests of a batch.
    pub request_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
            redirect_limit: 10,
            max_bytes: MAX_IMAGE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay: Duration::from_secs(2),
        }
    }
}

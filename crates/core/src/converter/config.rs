//! Toolchain settings: where the binaries live and how long they may run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Six hours.
const DEFAULT_TIMEOUT_SECS: u64 = 6 * 60 * 60;

/// Settings shared by every ffprobe and ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// ffmpeg executable, resolved through `PATH` when relative.
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable, resolved through `PATH` when relative.
    pub ffprobe_path: PathBuf,

    /// Wall-clock limit per invocation. The process is killed when exceeded.
    pub timeout_secs: u64,

    /// Value passed to ffmpeg's `-loglevel`.
    pub ffmpeg_log_level: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ffmpeg_log_level: "error".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Default settings pointing at specific binaries.
    pub fn with_paths(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(self, timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..self
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_path_lookup() {
        let config = ConverterConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.timeout(), Duration::from_secs(21600));
        assert_eq!(config.ffmpeg_log_level, "error");
    }

    #[test]
    fn test_custom_binaries_and_timeout() {
        let config =
            ConverterConfig::with_paths("/opt/ff/ffmpeg", "/opt/ff/ffprobe").with_timeout(60);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ff/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("/opt/ff/ffprobe"));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.ffmpeg_log_level, "error");
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: ConverterConfig = toml::from_str("timeout_secs = 30").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
    }
}

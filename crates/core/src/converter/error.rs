//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running ffprobe or ffmpeg.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The external process exited unsuccessfully.
    #[error("{program} exited with {}{}", exit_description(.code), stderr_suffix(.stderr))]
    ProcessFailed {
        program: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The external process did not finish in time and was killed.
    #[error("{program} timed out after {timeout_secs} seconds")]
    Timeout { program: String, timeout_secs: u64 },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error while talking to the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) if !text.trim().is_empty() => format!(": {}", text.trim()),
        _ => String::new(),
    }
}

impl ConverterError {
    /// Creates a process failure error.
    pub fn process_failed(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: Option<String>,
    ) -> Self {
        Self::ProcessFailed {
            program: program.into(),
            code,
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_display() {
        let err = ConverterError::process_failed("ffmpeg", Some(1), Some("Invalid data\n".into()));
        assert_eq!(err.to_string(), "ffmpeg exited with code 1: Invalid data");

        let err = ConverterError::process_failed("ffmpeg", None, None);
        assert_eq!(
            err.to_string(),
            "ffmpeg exited with no exit code (killed by signal)"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = ConverterError::Timeout {
            program: "ffprobe".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(err.to_string(), "ffprobe timed out after 5 seconds");
    }
}

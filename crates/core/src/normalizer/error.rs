//! Error types for the normalizer module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;

/// Failures recovered at file or directory granularity.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The prober produced no usable stream data.
    #[error("Probe failed for {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },

    /// A subtitle extraction invocation failed.
    #[error("Subtitle extraction of stream {stream} to {} failed: {source}", .output.display())]
    Extraction {
        output: PathBuf,
        stream: usize,
        #[source]
        source: ConverterError,
    },

    /// The main transcode invocation failed.
    #[error("Conversion to {} failed: {source}", .output.display())]
    Conversion {
        output: PathBuf,
        #[source]
        source: ConverterError,
    },

    /// A directory could not be listed.
    #[error("Cannot list directory {}: {source}", .path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The runner reported success but the output is not a usable file.
    #[error("Output {} failed verification: {reason}", .output.display())]
    Verification { output: PathBuf, reason: String },

    /// An output path is already taken, by an unrelated file or by another
    /// source converted earlier in the run.
    #[error("Output {} already exists, keeping the source", .output.display())]
    OutputExists { output: PathBuf },

    /// A verified output could not be moved into place.
    #[error("Cannot move verified output into {}: {source}", .output.display())]
    Commit {
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source could not be removed after a verified conversion.
    #[error("Cannot remove source {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NormalizeError {
    /// Short name of the failure kind, for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Probe { .. } => "probe",
            Self::Extraction { .. } => "extraction",
            Self::Conversion { .. } => "conversion",
            Self::Traversal { .. } => "traversal",
            Self::Verification { .. } => "verification",
            Self::OutputExists { .. } => "collision",
            Self::Commit { .. } => "commit",
            Self::Cleanup { .. } => "cleanup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_artifact_and_cause() {
        let err = NormalizeError::Extraction {
            output: PathBuf::from("/lib/movie_eng.vtt"),
            stream: 0,
            source: ConverterError::process_failed("ffmpeg", Some(1), Some("boom".into())),
        };
        assert_eq!(
            err.to_string(),
            "Subtitle extraction of stream 0 to /lib/movie_eng.vtt failed: ffmpeg exited with code 1: boom"
        );
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn test_probe_display() {
        let err = NormalizeError::Probe {
            path: PathBuf::from("/lib/movie.avi"),
            reason: "no streams".to_string(),
        };
        assert_eq!(err.to_string(), "Probe failed for /lib/movie.avi: no streams");
        assert_eq!(err.kind(), "probe");
    }

    #[test]
    fn test_output_exists_display() {
        let err = NormalizeError::OutputExists {
            output: PathBuf::from("/lib/movie.mp4"),
        };
        assert_eq!(
            err.to_string(),
            "Output /lib/movie.mp4 already exists, keeping the source"
        );
        assert_eq!(err.kind(), "collision");
    }
}

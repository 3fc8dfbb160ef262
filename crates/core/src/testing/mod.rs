//! Testing utilities and mock implementations.
//!
//! Mock implementations of the prober and runner traits allow whole
//! normalization runs to be exercised without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use playprep_core::testing::{fixtures, MockProber, MockRunner};
//!
//! let prober = MockProber::new();
//! prober.set_report(fixtures::probe_report(
//!     "/library/movie.avi",
//!     vec![fixtures::video_stream(0, "h264"), fixtures::audio_stream(1, "mp3")],
//! )).await;
//!
//! let runner = MockRunner::new();
//! runner.set_failing_output("/library/movie.mp4").await;
//! ```

mod mock_prober;
mod mock_runner;

pub use mock_prober::MockProber;
pub use mock_runner::{MockRunner, RecordedRun};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::converter::{ProbeReport, StreamDescriptor, StreamKind, StreamTags};

    fn stream(index: u32, kind: StreamKind, codec: &str) -> StreamDescriptor {
        StreamDescriptor {
            index,
            kind,
            codec_name: Some(codec.to_string()),
            tags: StreamTags::default(),
        }
    }

    /// A video stream without tags.
    pub fn video_stream(index: u32, codec: &str) -> StreamDescriptor {
        stream(index, StreamKind::Video, codec)
    }

    /// An audio stream without tags.
    pub fn audio_stream(index: u32, codec: &str) -> StreamDescriptor {
        stream(index, StreamKind::Audio, codec)
    }

    /// A subtitle stream with optional title and language tags.
    pub fn subtitle_stream(
        index: u32,
        codec: &str,
        title: Option<&str>,
        language: Option<&str>,
    ) -> StreamDescriptor {
        StreamDescriptor {
            tags: StreamTags {
                language: language.map(String::from),
                title: title.map(String::from),
            },
            ..stream(index, StreamKind::Subtitle, codec)
        }
    }

    /// A probe report for `path` with the given streams.
    pub fn probe_report(path: impl Into<PathBuf>, streams: Vec<StreamDescriptor>) -> ProbeReport {
        ProbeReport {
            path: path.into(),
            streams,
            duration_secs: Some(5400.0),
        }
    }
}

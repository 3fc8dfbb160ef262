//! Converter module: the external stream prober and transcoder runner.
//!
//! The rest of the crate only sees the [`StreamProber`] and
//! [`TranscodeRunner`] traits. [`FfmpegTools`] implements both on top of the
//! `ffprobe` and `ffmpeg` binaries; the `testing` module provides in-memory
//! doubles.
//!
//! # Example
//!
//! ```ignore
//! use playprep_core::converter::{FfmpegTools, StreamProber, TranscodeRunner, TranscodeJob};
//!
//! let tools = FfmpegTools::with_defaults();
//! tools.validate().await?;
//!
//! let report = tools.probe(Path::new("/library/clip.mkv")).await?;
//! println!("{} streams", report.streams.len());
//!
//! tools.run(&TranscodeJob::ConvertSubtitle {
//!     input: PathBuf::from("/library/clip.srt"),
//!     encoder: "webvtt".to_string(),
//!     output: PathBuf::from("/library/clip.vtt"),
//! }).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegTools;
pub use traits::{StreamProber, TranscodeRunner};
pub use types::{
    ProbeReport, SelectedStream, StreamDescriptor, StreamHandling, StreamKind, StreamTags,
    TranscodeJob,
};

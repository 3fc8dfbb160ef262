//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Class of a stream inside a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    /// Data, attachment and anything else ffprobe reports.
    Other,
}

impl StreamKind {
    /// Maps an ffprobe `codec_type` value.
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            _ => Self::Other,
        }
    }
}

/// Tags attached to a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One stream of a probed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Absolute index of the stream within the file.
    pub index: u32,
    pub kind: StreamKind,
    /// Codec name as reported by the prober (e.g. "h264", "subrip").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub tags: StreamTags,
}

impl StreamDescriptor {
    /// Codec name, or an empty string when the prober did not report one.
    pub fn codec(&self) -> &str {
        self.codec_name.as_deref().unwrap_or("")
    }
}

/// Everything the prober reported about a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub path: PathBuf,
    /// Streams in file order.
    pub streams: Vec<StreamDescriptor>,
    /// Container duration, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl ProbeReport {
    /// Streams of one class, in file order.
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }
}

/// How a stream class is handled in the main conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StreamHandling {
    /// Pass the stream through unmodified.
    Copy,
    /// Re-encode with the given encoder.
    Encode { encoder: String },
}

impl StreamHandling {
    /// Value for ffmpeg's `-c:<type>` option.
    pub fn ffmpeg_codec(&self) -> &str {
        match self {
            Self::Copy => "copy",
            Self::Encode { encoder } => encoder,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }
}

impl fmt::Display for StreamHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Encode { encoder } => write!(f, "encode({})", encoder),
        }
    }
}

/// A stream chosen for the main conversion and its handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedStream {
    /// Absolute stream index in the source file.
    pub index: u32,
    pub handling: StreamHandling,
}

/// A single invocation of the transcoder.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeJob {
    /// Main conversion of a video file into the delivery container.
    Convert {
        input: PathBuf,
        output: PathBuf,
        video: Option<SelectedStream>,
        audio: Option<SelectedStream>,
        /// Source duration, used for progress reporting only.
        duration_secs: Option<f64>,
    },
    /// Extraction of one subtitle stream, addressed by its position among
    /// the subtitle streams of the input.
    ExtractSubtitle {
        input: PathBuf,
        subtitle_index: usize,
        encoder: String,
        output: PathBuf,
    },
    /// Conversion of a standalone subtitle file.
    ConvertSubtitle {
        input: PathBuf,
        encoder: String,
        output: PathBuf,
    },
}

impl TranscodeJob {
    pub fn input(&self) -> &Path {
        match self {
            Self::Convert { input, .. }
            | Self::ExtractSubtitle { input, .. }
            | Self::ConvertSubtitle { input, .. } => input,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            Self::Convert { output, .. }
            | Self::ExtractSubtitle { output, .. }
            | Self::ConvertSubtitle { output, .. } => output,
        }
    }

    /// The same job writing to `output` instead.
    pub fn with_output(mut self, output: PathBuf) -> Self {
        match &mut self {
            Self::Convert { output: target, .. }
            | Self::ExtractSubtitle { output: target, .. }
            | Self::ConvertSubtitle { output: target, .. } => *target = output,
        }
        self
    }

    /// Short label for log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Convert { .. } => "convert",
            Self::ExtractSubtitle { .. } => "extract-subtitle",
            Self::ConvertSubtitle { .. } => "convert-subtitle",
        }
    }
}

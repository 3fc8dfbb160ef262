//! Plan types produced by the planners.

use std::fmt;
use std::path::PathBuf;

use crate::converter::{SelectedStream, TranscodeJob};

/// Extraction of one embedded subtitle stream into its own file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleExtractionJob {
    /// Position among the subtitle streams of the source.
    pub subtitle_index: usize,
    pub label: String,
    pub output: PathBuf,
}

/// Complete plan for one video file. Fixed before anything is executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPlan {
    pub source: PathBuf,
    /// Main output, `{base}.{container}`.
    pub output: PathBuf,
    pub container: String,
    pub video: Option<SelectedStream>,
    pub audio: Option<SelectedStream>,
    /// Extraction jobs, in source order.
    pub subtitles: Vec<SubtitleExtractionJob>,
    pub subtitle_encoder: String,
    pub duration_secs: Option<f64>,
}

impl ConversionPlan {
    /// Whether both selected streams are passed through.
    pub fn is_copy_only(&self) -> bool {
        [&self.video, &self.audio]
            .into_iter()
            .flatten()
            .all(|s| s.handling.is_copy())
    }

    /// Runner invocations in execution order: every subtitle extraction
    /// first, then the main conversion.
    pub fn transcode_jobs(&self) -> Vec<TranscodeJob> {
        let mut jobs: Vec<TranscodeJob> = self
            .subtitles
            .iter()
            .map(|sub| TranscodeJob::ExtractSubtitle {
                input: self.source.clone(),
                subtitle_index: sub.subtitle_index,
                encoder: self.subtitle_encoder.clone(),
                output: sub.output.clone(),
            })
            .collect();

        jobs.push(TranscodeJob::Convert {
            input: self.source.clone(),
            output: self.output.clone(),
            video: self.video.clone(),
            audio: self.audio.clone(),
            duration_secs: self.duration_secs,
        });

        jobs
    }
}

impl fmt::Display for ConversionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.output.display())?;
        match &self.video {
            Some(v) => write!(f, " video#{}={}", v.index, v.handling)?,
            None => write!(f, " video=none")?,
        }
        match &self.audio {
            Some(a) => write!(f, " audio#{}={}", a.index, a.handling)?,
            None => write!(f, " audio=none")?,
        }
        let labels: Vec<&str> = self.subtitles.iter().map(|s| s.label.as_str()).collect();
        write!(f, " subtitles=[{}]", labels.join(", "))
    }
}

/// Plan for one standalone subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePlan {
    pub source: PathBuf,
    pub output: PathBuf,
    pub encoder: String,
}

impl SubtitlePlan {
    pub fn transcode_job(&self) -> TranscodeJob {
        TranscodeJob::ConvertSubtitle {
            input: self.source.clone(),
            encoder: self.encoder.clone(),
            output: self.output.clone(),
        }
    }
}

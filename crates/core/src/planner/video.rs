//! Video conversion planning.

use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::converter::{ProbeReport, SelectedStream, StreamDescriptor, StreamHandling, StreamKind};
use crate::media::{output_name, subtitle_output_name, MediaFile, MediaPolicy, StreamSelection};

use super::label::{make_unique, subtitle_label};
use super::types::{ConversionPlan, SubtitleExtractionJob};

/// Reasons a probed file cannot be planned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no video or audio streams in {}", .path.display())]
    NoPlayableStreams { path: PathBuf },
}

/// Whether a video file has to be converted at all.
///
/// Files already in an accepted container are never probed.
pub fn needs_conversion(file: &MediaFile, policy: &MediaPolicy) -> bool {
    !policy.is_accepted_container(file.extension())
}

fn select_stream<'a>(
    report: &'a ProbeReport,
    kind: StreamKind,
    selection: StreamSelection,
) -> Option<&'a StreamDescriptor> {
    let count = report.streams_of(kind).count();
    if count > 1 {
        warn!(
            path = %report.path.display(),
            "{} {:?} streams found, using the {:?} one",
            count,
            kind,
            selection
        );
    }

    let mut streams = report.streams_of(kind);
    match selection {
        StreamSelection::Last => streams.last(),
        StreamSelection::First => streams.next(),
    }
}

fn handling(codec: &str, is_target: bool, encoder: &str) -> StreamHandling {
    if is_target && !codec.is_empty() {
        StreamHandling::Copy
    } else {
        StreamHandling::Encode {
            encoder: encoder.to_string(),
        }
    }
}

/// Builds the conversion plan for a probed video file.
pub fn plan_video(
    file: &MediaFile,
    report: &ProbeReport,
    policy: &MediaPolicy,
) -> Result<ConversionPlan, PlanError> {
    let video = select_stream(report, StreamKind::Video, policy.stream_selection).map(|s| {
        SelectedStream {
            index: s.index,
            handling: handling(
                s.codec(),
                policy.is_target_video_codec(s.codec()),
                &policy.video_encoder,
            ),
        }
    });

    let audio = select_stream(report, StreamKind::Audio, policy.stream_selection).map(|s| {
        SelectedStream {
            index: s.index,
            handling: handling(
                s.codec(),
                policy.is_target_audio_codec(s.codec()),
                &policy.audio_encoder,
            ),
        }
    });

    if video.is_none() && audio.is_none() {
        return Err(PlanError::NoPlayableStreams { path: file.path() });
    }

    let mut used_labels = HashSet::new();
    let mut subtitles = Vec::new();
    for (position, stream) in report.streams_of(StreamKind::Subtitle).enumerate() {
        if policy.is_bitmap_subtitle(stream.codec()) {
            debug!(
                path = %file.path().display(),
                stream = stream.index,
                codec = stream.codec(),
                "Skipping bitmap subtitle stream"
            );
            continue;
        }

        let label = make_unique(subtitle_label(stream, position), position, &mut used_labels);
        let output = file.sibling(&subtitle_output_name(
            file.base(),
            &label,
            &policy.subtitle_format,
        ));
        subtitles.push(SubtitleExtractionJob {
            subtitle_index: position,
            label,
            output,
        });
    }

    Ok(ConversionPlan {
        source: file.path(),
        output: file.sibling(&output_name(file.base(), &policy.primary_container)),
        container: policy.primary_container.clone(),
        video,
        audio,
        subtitles,
        subtitle_encoder: policy.subtitle_encoder.clone(),
        duration_secs: report.duration_secs,
    })
}

//! Standalone subtitle conversion planning.

use crate::media::{output_name, MediaFile, MediaPolicy};

use super::types::SubtitlePlan;

/// Plans the conversion of a subtitle file, or `None` when it is already in
/// the canonical format.
pub fn plan_subtitle(file: &MediaFile, policy: &MediaPolicy) -> Option<SubtitlePlan> {
    if policy.is_canonical_subtitle(file.extension()) {
        return None;
    }

    Some(SubtitlePlan {
        source: file.path(),
        output: file.sibling(&output_name(file.base(), &policy.subtitle_format)),
        encoder: policy.subtitle_encoder.clone(),
    })
}

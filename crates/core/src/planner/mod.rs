//! Conversion planning.
//!
//! Planners are pure: they turn a classified file (and, for videos, its probe
//! report) into a plan that is fully determined before anything runs.

mod label;
mod subtitle;
mod types;
mod video;

pub use label::{sanitize_label, subtitle_label};
pub use subtitle::plan_subtitle;
pub use types::{ConversionPlan, SubtitleExtractionJob, SubtitlePlan};
pub use video::{needs_conversion, plan_video, PlanError};

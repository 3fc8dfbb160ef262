//! Media file naming and classification.
//!
//! Everything here is pure: a [`MediaPolicy`] decides which extensions are
//! videos, subtitles or already-normalized containers, and the naming helpers
//! derive output file names from input names by extension substitution.

mod naming;
mod policy;

pub use naming::{
    committed_name, committed_path, output_name, split_name, staging_name, staging_path,
    subtitle_output_name, FileClass, MediaFile,
};
pub use policy::{MediaPolicy, StreamSelection};

//! File name splitting and output name derivation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    Video,
    Subtitle,
    Ignored,
}

/// Splits a file name at its last `.` into `(base, extension)`.
///
/// A name without a `.` yields an empty extension.
pub fn split_name(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos + 1..]),
        None => (filename, ""),
    }
}

/// `{base}.{extension}`
pub fn output_name(base: &str, extension: &str) -> String {
    format!("{}.{}", base, extension)
}

/// `{base}_{label}.{extension}`
pub fn subtitle_output_name(base: &str, label: &str, extension: &str) -> String {
    format!("{}_{}.{}", base, label, extension)
}

/// Marker inserted into the name of an output that is still being written.
const STAGING_MARKER: &str = ".partial";

/// Hidden name an output is written under until it is committed.
///
/// The extension is kept so the transcoder still picks the container from
/// it: `movie.mp4` is staged as `.movie.partial.mp4`.
pub fn staging_name(filename: &str) -> String {
    match split_name(filename) {
        (base, "") => format!(".{}{}", base, STAGING_MARKER),
        (base, extension) => format!(".{}{}.{}", base, STAGING_MARKER, extension),
    }
}

/// The name a staged output is committed to, or `None` when `filename` is
/// not a staging name.
pub fn committed_name(filename: &str) -> Option<String> {
    let rest = filename.strip_prefix('.')?;
    if let Some(base) = rest.strip_suffix(STAGING_MARKER).filter(|b| !b.is_empty()) {
        return Some(base.to_string());
    }
    let (base, extension) = split_name(rest);
    let base = base.strip_suffix(STAGING_MARKER).filter(|b| !b.is_empty())?;
    Some(output_name(base, extension))
}

/// Staging path next to `output`.
pub fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    output.with_file_name(staging_name(&name))
}

/// Committed path for a staging path, `None` for any other path.
pub fn committed_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(committed_name(name)?))
}

/// A file discovered in the library, identified by directory and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    dir: PathBuf,
    filename: String,
}

impl MediaFile {
    /// Creates a media file from a directory and a file name.
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
        }
    }

    /// Builds a media file from a full path.
    ///
    /// Returns `None` when the path has no file name or the name is not
    /// valid UTF-8, since output names could not be derived from it.
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        Some(Self::new(dir, filename))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// File name without its extension.
    pub fn base(&self) -> &str {
        split_name(&self.filename).0
    }

    pub fn extension(&self) -> &str {
        split_name(&self.filename).1
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// Path of a file with the given name in the same directory.
    pub fn sibling(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

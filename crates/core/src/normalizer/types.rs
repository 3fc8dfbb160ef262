//! Outcome and report types for a normalization run.

use std::fmt;
use std::path::PathBuf;

use super::error::NormalizeError;

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Probe and plan, but never invoke the transcoder or delete anything.
    pub dry_run: bool,
}

/// Why a file was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Video already in an accepted container, or subtitle already canonical.
    AlreadyNormalized,
    /// Neither a video nor a subtitle.
    Ignored,
}

/// Result of processing one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Every output was written and verified, and the source was removed.
    Converted {
        source: PathBuf,
        outputs: Vec<PathBuf>,
    },
    /// Dry run: the file would have been converted.
    Planned { source: PathBuf },
    Skipped(SkipReason),
    Failed(NormalizeError),
}

/// Tally of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub converted: usize,
    pub planned: usize,
    pub already_normalized: usize,
    pub ignored: usize,
    pub failed: usize,
    pub traversal_failures: usize,
    /// The run stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl RunReport {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Converted { .. } => self.converted += 1,
            FileOutcome::Planned { .. } => self.planned += 1,
            FileOutcome::Skipped(SkipReason::AlreadyNormalized) => self.already_normalized += 1,
            FileOutcome::Skipped(SkipReason::Ignored) => self.ignored += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} already normalized, {} ignored, {} failed, {} unreadable directories",
            self.converted,
            self.already_normalized,
            self.ignored,
            self.failed,
            self.traversal_failures
        )?;
        if self.planned > 0 {
            write!(f, ", {} planned", self.planned)?;
        }
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut report = RunReport::default();
        report.record(&FileOutcome::Converted {
            source: PathBuf::from("/a.avi"),
            outputs: vec![PathBuf::from("/a.mp4")],
        });
        report.record(&FileOutcome::Skipped(SkipReason::Ignored));
        report.record(&FileOutcome::Skipped(SkipReason::AlreadyNormalized));
        report.record(&FileOutcome::Failed(NormalizeError::Probe {
            path: PathBuf::from("/b.avi"),
            reason: "bad".to_string(),
        }));

        assert_eq!(report.converted, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.already_normalized, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.to_string(),
            "1 converted, 1 already normalized, 1 ignored, 1 failed, 0 unreadable directories"
        );
    }

    #[test]
    fn test_display_dry_run_and_cancelled() {
        let report = RunReport {
            planned: 2,
            cancelled: true,
            ..Default::default()
        };
        assert!(report.to_string().ends_with(", 2 planned (cancelled)"));
    }
}

//! Library traversal and per-file dispatch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::converter::{StreamProber, TranscodeRunner};
use crate::media::{committed_name, FileClass, MediaFile, MediaPolicy};
use crate::planner::{needs_conversion, plan_subtitle, plan_video};

use super::error::NormalizeError;
use super::executor::PlanExecutor;
use super::types::{FileOutcome, NormalizeOptions, RunReport, SkipReason};

/// One directory's entries, sorted by name.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<MediaFile>,
    dirs: Vec<PathBuf>,
}

/// Walks a library root and normalizes every file, one at a time.
pub struct TreeWalker<P: StreamProber, R: TranscodeRunner> {
    policy: MediaPolicy,
    prober: P,
    runner: R,
    options: NormalizeOptions,
    cancelled: Arc<AtomicBool>,
}

impl<P: StreamProber, R: TranscodeRunner> TreeWalker<P, R> {
    pub fn new(policy: MediaPolicy, prober: P, runner: R) -> Self {
        Self {
            policy,
            prober,
            runner,
            options: NormalizeOptions::default(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses an externally owned cancellation flag.
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Flag that stops the walk before the next file once set.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Processes every file under `root`.
    ///
    /// Each directory is listed once before any of its files is processed,
    /// so outputs written during the run are not revisited. Files come
    /// before subdirectories, both in lexical order.
    pub async fn run(&self, root: &Path) -> RunReport {
        let mut report = RunReport::default();
        let mut pending = vec![root.to_path_buf()];

        info!(root = %root.display(), dry_run = self.options.dry_run, "Starting normalization");

        'walk: while let Some(dir) = pending.pop() {
            let listing = match list_directory(&dir).await {
                Ok(listing) => listing,
                Err(e) => {
                    error!("{}", e);
                    report.traversal_failures += 1;
                    continue;
                }
            };

            for file in &listing.files {
                if self.is_cancelled() {
                    report.cancelled = true;
                    break 'walk;
                }
                let outcome = self.process_file(file).await;
                log_outcome(file, &outcome);
                report.record(&outcome);
            }

            pending.extend(listing.dirs.into_iter().rev());
        }

        if report.cancelled {
            warn!("Normalization cancelled before all files were processed");
        }
        info!("Normalization finished: {}", report);
        report
    }

    /// Classifies a single file and dispatches it to its planner.
    pub async fn process_file(&self, file: &MediaFile) -> FileOutcome {
        if committed_name(file.filename()).is_some() {
            warn!(
                path = %file.path().display(),
                "Skipping staging file left by an interrupted run"
            );
            return FileOutcome::Skipped(SkipReason::Ignored);
        }

        match self.policy.classify(file.filename()) {
            FileClass::Video => self.process_video(file).await,
            FileClass::Subtitle => self.process_subtitle(file).await,
            FileClass::Ignored => FileOutcome::Skipped(SkipReason::Ignored),
        }
    }

    async fn process_video(&self, file: &MediaFile) -> FileOutcome {
        if !needs_conversion(file, &self.policy) {
            return FileOutcome::Skipped(SkipReason::AlreadyNormalized);
        }

        let source = file.path();
        let report = match self.prober.probe(&source).await {
            Ok(report) => report,
            Err(e) => {
                return FileOutcome::Failed(NormalizeError::Probe {
                    path: source,
                    reason: e.to_string(),
                })
            }
        };

        let plan = match plan_video(file, &report, &self.policy) {
            Ok(plan) => plan,
            Err(e) => {
                return FileOutcome::Failed(NormalizeError::Probe {
                    path: source,
                    reason: e.to_string(),
                })
            }
        };
        debug!(
            plan = %plan,
            remux_only = plan.is_copy_only(),
            "Planned video conversion"
        );

        if self.options.dry_run {
            info!("Would convert {}: {}", source.display(), plan);
            return FileOutcome::Planned { source };
        }

        match PlanExecutor::new(&self.runner).execute_video(&plan).await {
            Ok(outputs) => FileOutcome::Converted { source, outputs },
            Err(e) => FileOutcome::Failed(e),
        }
    }

    async fn process_subtitle(&self, file: &MediaFile) -> FileOutcome {
        let Some(plan) = plan_subtitle(file, &self.policy) else {
            return FileOutcome::Skipped(SkipReason::AlreadyNormalized);
        };
        let source = plan.source.clone();

        if self.options.dry_run {
            info!(
                "Would convert {} -> {}",
                source.display(),
                plan.output.display()
            );
            return FileOutcome::Planned { source };
        }

        match PlanExecutor::new(&self.runner).execute_subtitle(&plan).await {
            Ok(outputs) => FileOutcome::Converted { source, outputs },
            Err(e) => FileOutcome::Failed(e),
        }
    }
}

fn log_outcome(file: &MediaFile, outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Converted { source, outputs } => {
            let outputs: Vec<String> = outputs.iter().map(|p| p.display().to_string()).collect();
            info!("Converted {} -> {}", source.display(), outputs.join(", "));
        }
        FileOutcome::Failed(e) => {
            error!(kind = e.kind(), "Failed {}: {}", file.path().display(), e);
        }
        FileOutcome::Skipped(reason) => {
            debug!(path = %file.path().display(), reason = ?reason, "Skipped");
        }
        FileOutcome::Planned { .. } => {}
    }
}

/// Lists a directory, splitting regular files from subdirectories.
///
/// Symbolic links (to files or directories) and other special files are
/// skipped.
async fn list_directory(dir: &Path) -> Result<Listing, NormalizeError> {
    let traversal = |source: std::io::Error| NormalizeError::Traversal {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(traversal)?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(traversal)? {
        found.push(entry);
    }
    found.sort_by_key(|entry| entry.file_name());

    let mut listing = Listing::default();
    for entry in found {
        let path = entry.path();
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!(path = %path.display(), "Cannot read file type: {}", e);
                continue;
            }
        };

        if file_type.is_dir() {
            listing.dirs.push(path);
        } else if file_type.is_file() {
            match MediaFile::from_path(&path) {
                Some(file) => listing.files.push(file),
                None => warn!(path = %path.display(), "Skipping file with non UTF-8 name"),
            }
        } else if file_type.is_symlink() {
            warn!(path = %path.display(), "Skipping symbolic link");
        } else {
            debug!(path = %path.display(), "Skipping non-regular file");
        }
    }

    Ok(listing)
}

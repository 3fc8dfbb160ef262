//! Plan execution with produce-then-verify-and-delete semantics.
//!
//! Jobs run strictly in plan order. Every job writes to a hidden staging
//! file next to its target, which is verified before the next job starts.
//! Staged files are renamed into place only once every job has verified,
//! and the source is removed last. A target that already exists fails the
//! file before anything runs. On any failure, every file the attempt
//! created is removed and the source is left untouched.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::converter::{TranscodeJob, TranscodeRunner};
use crate::media::staging_path;
use crate::planner::{ConversionPlan, SubtitlePlan};

use super::error::NormalizeError;

/// An output in progress: the file the runner writes, and where it goes.
#[derive(Debug)]
struct StagedOutput {
    staged: PathBuf,
    target: PathBuf,
}

/// Files touched by one attempt, used for rollback.
#[derive(Debug, Default)]
struct Attempt {
    /// Registered before their job runs so partial files are removed too.
    staged: Vec<StagedOutput>,
    /// Targets already moved into place.
    committed: Vec<PathBuf>,
}

impl Attempt {
    async fn rollback(&self) {
        let staged = self.staged.iter().map(|output| &output.staged);
        for path in self.committed.iter().chain(staged).rev() {
            match fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Removed output of failed attempt"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %path.display(),
                    "Failed to remove output of failed attempt: {}",
                    e
                ),
            }
        }
    }
}

/// Runs plans through a [`TranscodeRunner`].
pub struct PlanExecutor<'a, R: TranscodeRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: TranscodeRunner + ?Sized> PlanExecutor<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Extracts subtitles, converts the video, then removes the source.
    ///
    /// Returns every committed output path.
    pub async fn execute_video(&self, plan: &ConversionPlan) -> Result<Vec<PathBuf>, NormalizeError> {
        self.execute(&plan.source, plan.transcode_jobs()).await
    }

    /// Converts a subtitle file, then removes the source.
    pub async fn execute_subtitle(&self, plan: &SubtitlePlan) -> Result<Vec<PathBuf>, NormalizeError> {
        self.execute(&plan.source, vec![plan.transcode_job()]).await
    }

    async fn execute(
        &self,
        source: &Path,
        jobs: Vec<TranscodeJob>,
    ) -> Result<Vec<PathBuf>, NormalizeError> {
        for job in &jobs {
            ensure_vacant(job.output()).await?;
        }

        let mut attempt = Attempt::default();
        if let Err(e) = self.produce(jobs, &mut attempt).await {
            attempt.rollback().await;
            return Err(e);
        }
        if let Err(e) = commit(&mut attempt).await {
            attempt.rollback().await;
            return Err(e);
        }

        fs::remove_file(source)
            .await
            .map_err(|source_err| NormalizeError::Cleanup {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        debug!(path = %source.display(), "Removed source");

        Ok(attempt.committed)
    }

    /// Runs every job into its staging file and verifies it.
    async fn produce(
        &self,
        jobs: Vec<TranscodeJob>,
        attempt: &mut Attempt,
    ) -> Result<(), NormalizeError> {
        for job in jobs {
            let target = job.output().to_path_buf();
            let staged = staging_path(&target);
            attempt.staged.push(StagedOutput {
                staged: staged.clone(),
                target: target.clone(),
            });

            let job = job.with_output(staged.clone());
            debug!(
                job = job.kind_name(),
                input = %job.input().display(),
                output = %target.display(),
                "Running {}",
                self.runner.name()
            );

            self.runner.run(&job).await.map_err(|source| match &job {
                TranscodeJob::ExtractSubtitle { subtitle_index, .. } => {
                    NormalizeError::Extraction {
                        output: target.clone(),
                        stream: *subtitle_index,
                        source,
                    }
                }
                _ => NormalizeError::Conversion {
                    output: target.clone(),
                    source,
                },
            })?;

            verify_output(&staged, &target).await?;
        }
        Ok(())
    }
}

/// Fails when `target` is already taken. Dangling symlinks count as taken.
async fn ensure_vacant(target: &Path) -> Result<(), NormalizeError> {
    match fs::symlink_metadata(target).await {
        Ok(_) => Err(NormalizeError::OutputExists {
            output: target.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NormalizeError::Commit {
            output: target.to_path_buf(),
            source: e,
        }),
    }
}

/// Moves every verified staging file onto its target.
async fn commit(attempt: &mut Attempt) -> Result<(), NormalizeError> {
    for output in &attempt.staged {
        // The target may have appeared while the jobs ran
        ensure_vacant(&output.target).await?;
        fs::rename(&output.staged, &output.target)
            .await
            .map_err(|source| NormalizeError::Commit {
                output: output.target.clone(),
                source,
            })?;
        attempt.committed.push(output.target.clone());
    }
    Ok(())
}

/// Checks that a completed job left a non-empty regular file behind.
async fn verify_output(staged: &Path, target: &Path) -> Result<(), NormalizeError> {
    let failed = |reason: String| NormalizeError::Verification {
        output: target.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(staged)
        .await
        .map_err(|e| failed(format!("output not created: {}", e)))?;

    if !metadata.is_file() {
        return Err(failed("output is not a regular file".to_string()));
    }
    if metadata.len() == 0 {
        return Err(failed("output is empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{SelectedStream, StreamHandling};
    use crate::planner::SubtitleExtractionJob;
    use crate::testing::MockRunner;
    use tempfile::TempDir;

    fn plan_in(dir: &Path, labels: &[&str]) -> ConversionPlan {
        ConversionPlan {
            source: dir.join("movie.avi"),
            output: dir.join("movie.mp4"),
            container: "mp4".to_string(),
            video: Some(SelectedStream {
                index: 0,
                handling: StreamHandling::Copy,
            }),
            audio: Some(SelectedStream {
                index: 1,
                handling: StreamHandling::Encode {
                    encoder: "aac".to_string(),
                },
            }),
            subtitles: labels
                .iter()
                .enumerate()
                .map(|(i, label)| SubtitleExtractionJob {
                    subtitle_index: i,
                    label: label.to_string(),
                    output: dir.join(format!("movie_{}.vtt", label)),
                })
                .collect(),
            subtitle_encoder: "webvtt".to_string(),
            duration_secs: None,
        }
    }

    fn setup(labels: &[&str]) -> (TempDir, ConversionPlan) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("movie.avi"), b"source").unwrap();
        let plan = plan_in(dir.path(), labels);
        (dir, plan)
    }

    #[tokio::test]
    async fn test_success_writes_outputs_and_removes_source() {
        let (dir, plan) = setup(&["eng"]);
        let runner = MockRunner::new();

        let outputs = PlanExecutor::new(&runner).execute_video(&plan).await.unwrap();

        assert_eq!(
            outputs,
            vec![dir.path().join("movie_eng.vtt"), dir.path().join("movie.mp4")]
        );
        assert!(dir.path().join("movie_eng.vtt").exists());
        assert!(dir.path().join("movie.mp4").exists());
        assert!(!dir.path().join("movie.avi").exists());
        assert!(!dir.path().join(".movie.partial.mp4").exists());
    }

    #[tokio::test]
    async fn test_extraction_failure_stops_before_conversion() {
        let (dir, plan) = setup(&["eng", "fre"]);
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("movie_fre.vtt")).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Extraction { stream: 1, .. }));
        // Main conversion never ran
        assert_eq!(runner.run_count().await, 2);
        // First extraction rolled back, source intact
        assert!(!dir.path().join("movie_eng.vtt").exists());
        assert!(!dir.path().join("movie.mp4").exists());
        assert!(dir.path().join("movie.avi").exists());
    }

    #[tokio::test]
    async fn test_conversion_failure_removes_partial_output() {
        let (dir, plan) = setup(&[]);
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("movie.mp4")).await;
        runner.set_leave_partial_output(true).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Conversion { .. }));
        assert!(!dir.path().join("movie.mp4").exists());
        assert!(!dir.path().join(".movie.partial.mp4").exists());
        assert!(dir.path().join("movie.avi").exists());
    }

    #[tokio::test]
    async fn test_empty_output_fails_verification() {
        let (dir, plan) = setup(&[]);
        let runner = MockRunner::new();
        runner.set_empty_output(dir.path().join("movie.mp4")).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Verification { .. }));
        assert!(dir.path().join("movie.avi").exists());
        assert!(!dir.path().join("movie.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_output_fails_verification() {
        let (dir, plan) = setup(&[]);
        let runner = MockRunner::new();
        runner.set_write_outputs(false).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Verification { .. }));
        assert!(dir.path().join("movie.avi").exists());
    }

    #[tokio::test]
    async fn test_existing_target_fails_before_running() {
        let (dir, plan) = setup(&["eng"]);
        std::fs::write(dir.path().join("movie.mp4"), b"unrelated movie").unwrap();
        let runner = MockRunner::new();

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NormalizeError::OutputExists { ref output } if output == &dir.path().join("movie.mp4")
        ));
        assert_eq!(runner.run_count().await, 0);
        assert_eq!(
            std::fs::read(dir.path().join("movie.mp4")).unwrap(),
            b"unrelated movie"
        );
        assert!(!dir.path().join("movie_eng.vtt").exists());
        assert!(dir.path().join("movie.avi").exists());
    }

    #[tokio::test]
    async fn test_failed_run_never_touches_existing_target() {
        let (dir, plan) = setup(&[]);
        std::fs::write(dir.path().join("movie.mp4"), b"existing movie").unwrap();
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("movie.mp4")).await;
        runner.set_leave_partial_output(true).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::OutputExists { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("movie.mp4")).unwrap(),
            b"existing movie"
        );
        assert!(!dir.path().join(".movie.partial.mp4").exists());
    }

    #[tokio::test]
    async fn test_jobs_write_to_staging_files() {
        let (dir, plan) = setup(&["eng"]);
        let runner = MockRunner::new();

        PlanExecutor::new(&runner).execute_video(&plan).await.unwrap();

        let written: Vec<PathBuf> = runner
            .recorded_runs()
            .await
            .iter()
            .map(|run| run.job.output().to_path_buf())
            .collect();
        assert_eq!(
            written,
            vec![
                dir.path().join(".movie_eng.partial.vtt"),
                dir.path().join(".movie.partial.mp4"),
            ]
        );
        assert!(!dir.path().join(".movie_eng.partial.vtt").exists());
        assert!(!dir.path().join(".movie.partial.mp4").exists());
    }

    #[tokio::test]
    async fn test_no_target_is_written_until_all_jobs_verify() {
        let (dir, plan) = setup(&["eng"]);
        let runner = MockRunner::new();
        runner.set_empty_output(dir.path().join("movie.mp4")).await;

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Verification { .. }));
        assert!(!dir.path().join("movie_eng.vtt").exists());
        assert!(!dir.path().join(".movie_eng.partial.vtt").exists());
        assert!(!dir.path().join(".movie.partial.mp4").exists());
        assert!(dir.path().join("movie.avi").exists());
    }

    #[tokio::test]
    async fn test_subtitle_plan() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip.srt"), b"1\n").unwrap();
        let plan = SubtitlePlan {
            source: dir.path().join("clip.srt"),
            output: dir.path().join("clip.vtt"),
            encoder: "webvtt".to_string(),
        };
        let runner = MockRunner::new();

        let outputs = PlanExecutor::new(&runner)
            .execute_subtitle(&plan)
            .await
            .unwrap();

        assert_eq!(outputs, vec![dir.path().join("clip.vtt")]);
        assert!(!dir.path().join("clip.srt").exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_cleanup_failure() {
        let (dir, plan) = setup(&[]);
        std::fs::remove_file(dir.path().join("movie.avi")).unwrap();
        let runner = MockRunner::new();

        let err = PlanExecutor::new(&runner)
            .execute_video(&plan)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::Cleanup { .. }));
        // The verified output stays
        assert!(dir.path().join("movie.mp4").exists());
    }
}

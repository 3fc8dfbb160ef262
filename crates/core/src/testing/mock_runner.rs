//! Mock runner for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::converter::{ConverterError, TranscodeJob, TranscodeRunner};
use crate::media::committed_path;

/// A recorded runner invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// The job that was submitted.
    pub job: TranscodeJob,
    /// Where the job's output ends up once committed. Same as the job's
    /// output unless it writes to a staging file.
    pub target: PathBuf,
    /// Whether the invocation succeeded.
    pub success: bool,
}

#[derive(Debug)]
struct MockRunnerState {
    runs: Vec<RecordedRun>,
    failing_outputs: HashSet<PathBuf>,
    empty_outputs: HashSet<PathBuf>,
    write_outputs: bool,
    leave_partial_output: bool,
    remove_dir_on_run: Option<PathBuf>,
}

/// Mock implementation of the [`TranscodeRunner`] trait.
///
/// Provides controllable behavior for testing:
/// - Track invocations for assertions
/// - Fail jobs by target path, optionally leaving a partial file behind
/// - Write a small file at the output path on success (or an empty one)
/// - Remove a directory mid-run, as if the library changed underneath
///
/// Failure and empty-output settings are keyed by the committed target, so
/// `movie.mp4` also matches a job writing to `.movie.partial.mp4`.
#[derive(Debug, Clone)]
pub struct MockRunner {
    state: Arc<RwLock<MockRunnerState>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner that succeeds and writes every output.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockRunnerState {
                runs: Vec::new(),
                failing_outputs: HashSet::new(),
                empty_outputs: HashSet::new(),
                write_outputs: true,
                leave_partial_output: false,
                remove_dir_on_run: None,
            })),
        }
    }

    /// Remove `dir` and its contents when the next job runs.
    pub async fn set_remove_dir_on_run(&self, dir: impl AsRef<Path>) {
        self.state.write().await.remove_dir_on_run = Some(dir.as_ref().to_path_buf());
    }

    /// Make every job writing to `output` exit unsuccessfully.
    pub async fn set_failing_output(&self, output: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .failing_outputs
            .insert(output.as_ref().to_path_buf());
    }

    /// Make jobs writing to `output` succeed with an empty file.
    pub async fn set_empty_output(&self, output: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .empty_outputs
            .insert(output.as_ref().to_path_buf());
    }

    /// Whether successful jobs create their output file.
    pub async fn set_write_outputs(&self, write: bool) {
        self.state.write().await.write_outputs = write;
    }

    /// Whether failing jobs leave a truncated output behind.
    pub async fn set_leave_partial_output(&self, leave: bool) {
        self.state.write().await.leave_partial_output = leave;
    }

    /// Get all recorded invocations.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.state.read().await.runs.clone()
    }

    /// Targets of all recorded invocations, in call order.
    pub async fn recorded_outputs(&self) -> Vec<PathBuf> {
        self.state
            .read()
            .await
            .runs
            .iter()
            .map(|r| r.target.clone())
            .collect()
    }

    /// Get the number of invocations performed.
    pub async fn run_count(&self) -> usize {
        self.state.read().await.runs.len()
    }
}

#[async_trait]
impl TranscodeRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, job: &TranscodeJob) -> Result<(), ConverterError> {
        let mut state = self.state.write().await;
        let output = job.output().to_path_buf();
        let target = committed_path(&output).unwrap_or_else(|| output.clone());

        if let Some(dir) = state.remove_dir_on_run.take() {
            tokio::fs::remove_dir_all(&dir).await?;
        }

        if state.failing_outputs.contains(&target) {
            if state.leave_partial_output {
                tokio::fs::write(&output, b"partial").await?;
            }
            state.runs.push(RecordedRun {
                job: job.clone(),
                target,
                success: false,
            });
            return Err(ConverterError::process_failed(
                "mock",
                Some(1),
                Some("simulated failure".to_string()),
            ));
        }

        if state.write_outputs {
            let contents: &[u8] = if state.empty_outputs.contains(&target) {
                b""
            } else {
                b"mock output"
            };
            tokio::fs::write(&output, contents).await?;
        }

        state.runs.push(RecordedRun {
            job: job.clone(),
            target,
            success: true,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn subtitle_job(dir: &Path) -> TranscodeJob {
        TranscodeJob::ConvertSubtitle {
            input: dir.join("clip.srt"),
            encoder: "webvtt".to_string(),
            output: dir.join("clip.vtt"),
        }
    }

    #[tokio::test]
    async fn test_success_writes_output() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();

        runner.run(&subtitle_job(dir.path())).await.unwrap();

        assert!(dir.path().join("clip.vtt").exists());
        let runs = runner.recorded_runs().await;
        assert_eq!(runs.len(), 1);
        assert!(runs[0].success);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("clip.vtt")).await;

        let result = runner.run(&subtitle_job(dir.path())).await;

        assert!(matches!(result, Err(ConverterError::ProcessFailed { .. })));
        assert!(!dir.path().join("clip.vtt").exists());
        assert!(!runner.recorded_runs().await[0].success);
    }

    #[tokio::test]
    async fn test_failure_matches_staged_output_by_target() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("clip.vtt")).await;
        runner.set_leave_partial_output(true).await;

        let job = subtitle_job(dir.path()).with_output(dir.path().join(".clip.partial.vtt"));
        assert!(runner.run(&job).await.is_err());

        assert!(dir.path().join(".clip.partial.vtt").exists());
        assert_eq!(
            runner.recorded_outputs().await,
            vec![dir.path().join("clip.vtt")]
        );
    }

    #[tokio::test]
    async fn test_remove_dir_on_run() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Extras")).unwrap();
        let runner = MockRunner::new();
        runner.set_remove_dir_on_run(dir.path().join("Extras")).await;

        runner.run(&subtitle_job(dir.path())).await.unwrap();

        assert!(!dir.path().join("Extras").exists());
    }

    #[tokio::test]
    async fn test_partial_output_on_failure() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::new();
        runner.set_failing_output(dir.path().join("clip.vtt")).await;
        runner.set_leave_partial_output(true).await;

        assert!(runner.run(&subtitle_job(dir.path())).await.is_err());
        assert!(dir.path().join("clip.vtt").exists());
    }
}

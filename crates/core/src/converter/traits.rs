//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ConverterError;
use super::types::{ProbeReport, TranscodeJob};

/// Describes the streams of a media file.
#[async_trait]
pub trait StreamProber: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Probes a media file and lists all of its streams.
    async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError>;
}

/// Runs a single transcoder invocation.
///
/// `Ok(())` means the job's output path now holds a complete file. Any error
/// means no reliable output was produced.
#[async_trait]
pub trait TranscodeRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the job to completion.
    async fn run(&self, job: &TranscodeJob) -> Result<(), ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::types::StreamKind;
    use std::path::PathBuf;

    struct EmptyProber;

    #[async_trait]
    impl StreamProber for EmptyProber {
        fn name(&self) -> &str {
            "empty"
        }

        async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError> {
            Ok(ProbeReport {
                path: path.to_path_buf(),
                streams: Vec::new(),
                duration_secs: None,
            })
        }
    }

    struct FailingRunner;

    #[async_trait]
    impl TranscodeRunner for FailingRunner {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self, _job: &TranscodeJob) -> Result<(), ConverterError> {
            Err(ConverterError::process_failed("failing", Some(1), None))
        }
    }

    #[tokio::test]
    async fn test_prober_as_trait_object() {
        let prober: Box<dyn StreamProber> = Box::new(EmptyProber);
        let report = prober.probe(Path::new("/m/a.mkv")).await.unwrap();
        assert_eq!(prober.name(), "empty");
        assert_eq!(report.streams_of(StreamKind::Video).count(), 0);
    }

    #[tokio::test]
    async fn test_runner_as_trait_object() {
        let runner: Box<dyn TranscodeRunner> = Box::new(FailingRunner);
        let job = TranscodeJob::ConvertSubtitle {
            input: PathBuf::from("/m/a.srt"),
            encoder: "webvtt".to_string(),
            output: PathBuf::from("/m/a.vtt"),
        };
        assert!(matches!(
            runner.run(&job).await,
            Err(ConverterError::ProcessFailed { code: Some(1), .. })
        ));
    }
}

//! FFmpeg/FFprobe-backed prober and runner.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::{StreamProber, TranscodeRunner};
use super::types::{ProbeReport, StreamDescriptor, StreamKind, StreamTags, TranscodeJob};

/// Number of trailing stderr lines kept for error reports.
const MAX_ERROR_LINES: usize = 20;

/// Containers that benefit from moving the index to the front of the file.
const FASTSTART_CONTAINERS: &[&str] = &["mp4", "m4v", "mov"];

/// Prober and runner implemented on top of the ffprobe and ffmpeg binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    config: ConverterConfig,
}

impl FfmpegTools {
    /// Creates the toolchain with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates the toolchain with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Checks that both binaries can be executed.
    pub async fn validate(&self) -> Result<(), ConverterError> {
        for (path, is_ffmpeg) in [
            (&self.config.ffmpeg_path, true),
            (&self.config.ffprobe_path, false),
        ] {
            let result = Command::new(path)
                .arg("-version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;

            if let Err(e) = result {
                return Err(Self::spawn_error(e, path, is_ffmpeg));
            }
        }

        Ok(())
    }

    fn spawn_error(e: std::io::Error, path: &Path, is_ffmpeg: bool) -> ConverterError {
        if e.kind() != std::io::ErrorKind::NotFound {
            return ConverterError::Io(e);
        }
        let path = path.to_path_buf();
        if is_ffmpeg {
            ConverterError::FfmpegNotFound { path }
        } else {
            ConverterError::FfprobeNotFound { path }
        }
    }

    fn program_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Arguments shared by every ffmpeg invocation, up to and including the input.
    fn input_args(&self, input: &Path) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite output
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffmpeg arguments for a job.
    fn build_args(&self, job: &TranscodeJob) -> Vec<String> {
        let mut args = self.input_args(job.input());

        match job {
            TranscodeJob::Convert {
                output,
                video,
                audio,
                ..
            } => {
                if let Some(video) = video {
                    args.extend([
                        "-map".to_string(),
                        format!("0:{}", video.index),
                        "-c:v".to_string(),
                        video.handling.ffmpeg_codec().to_string(),
                    ]);
                }
                if let Some(audio) = audio {
                    args.extend([
                        "-map".to_string(),
                        format!("0:{}", audio.index),
                        "-c:a".to_string(),
                        audio.handling.ffmpeg_codec().to_string(),
                    ]);
                }

                let is_faststart = output
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| FASTSTART_CONTAINERS.iter().any(|c| c.eq_ignore_ascii_case(e)))
                    .unwrap_or(false);
                if is_faststart {
                    args.extend(["-movflags".to_string(), "+faststart".to_string()]);
                }

                // Progress output for parsing
                args.extend([
                    "-progress".to_string(),
                    "pipe:2".to_string(),
                    "-nostats".to_string(),
                ]);
            }
            TranscodeJob::ExtractSubtitle {
                subtitle_index,
                encoder,
                ..
            } => {
                args.extend([
                    "-map".to_string(),
                    format!("0:s:{}", subtitle_index),
                    "-c:s".to_string(),
                    encoder.clone(),
                ]);
            }
            TranscodeJob::ConvertSubtitle { encoder, .. } => {
                args.extend(["-c:s".to_string(), encoder.clone()]);
            }
        }

        args.push(job.output().to_string_lossy().to_string());
        args
    }

    /// Parses ffprobe JSON output into a report.
    fn parse_probe_output(path: &Path, output: &str) -> Result<ProbeReport, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            streams: Option<Vec<ProbeStream>>,
            #[serde(default)]
            format: Option<ProbeFormat>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            index: u32,
            codec_type: Option<String>,
            codec_name: Option<String>,
            #[serde(default)]
            tags: HashMap<String, String>,
        }

        fn tag(tags: &HashMap<String, String>, key: &str) -> Option<String> {
            tags.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.clone())
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            ConverterError::parse_error(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let streams = probe
            .streams
            .ok_or_else(|| ConverterError::parse_error("ffprobe output has no stream list"))?;

        let streams = streams
            .into_iter()
            .map(|s| StreamDescriptor {
                index: s.index,
                kind: StreamKind::from_codec_type(s.codec_type.as_deref().unwrap_or("")),
                codec_name: s.codec_name,
                tags: StreamTags {
                    language: tag(&s.tags, "language"),
                    title: tag(&s.tags, "title"),
                },
            })
            .collect();

        let duration_secs = probe
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok());

        Ok(ProbeReport {
            path: path.to_path_buf(),
            streams,
            duration_secs,
        })
    }

    /// Spawns ffmpeg for a job and waits for it, honouring the timeout.
    async fn run_ffmpeg(&self, job: &TranscodeJob) -> Result<(), ConverterError> {
        let args = self.build_args(job);
        let program = Self::program_name(&self.config.ffmpeg_path);
        debug!(job = job.kind_name(), args = ?args, "Running ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::spawn_error(e, &self.config.ffmpeg_path, true))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ConverterError::Io(std::io::Error::other("stderr not captured")))?;
        let mut reader = BufReader::new(stderr).lines();

        let duration_secs = match job {
            TranscodeJob::Convert { duration_secs, .. } => *duration_secs,
            _ => None,
        };
        let time_regex = Regex::new(r"^out_time_ms=(\d+)$").ok();
        let progress_line = Regex::new(r"^[a-z0-9_]+=\S*$").ok();

        let result = timeout(self.config.timeout(), async {
            let mut error_lines: VecDeque<String> = VecDeque::new();
            let mut last_reported_decile = 0u32;

            while let Some(line) = reader.next_line().await? {
                if let Some(caps) = time_regex.as_ref().and_then(|re| re.captures(&line)) {
                    let micros = caps
                        .get(1)
                        .and_then(|m| m.as_str().parse::<f64>().ok())
                        .unwrap_or(0.0);
                    if let Some(total) = duration_secs.filter(|d| *d > 0.0) {
                        let percent = (micros / 1_000_000.0 / total * 100.0).min(100.0);
                        let decile = (percent / 10.0) as u32;
                        if decile > last_reported_decile {
                            last_reported_decile = decile;
                            debug!(
                                output = %job.output().display(),
                                "Conversion {:.0}% complete",
                                percent
                            );
                        }
                    }
                    continue;
                }

                if progress_line.as_ref().is_some_and(|re| re.is_match(&line)) {
                    continue;
                }

                trace!(line = %line, "ffmpeg");
                if error_lines.len() == MAX_ERROR_LINES {
                    error_lines.pop_front();
                }
                error_lines.push_back(line);
            }

            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, error_lines))
        })
        .await;

        match result {
            Ok(Ok((status, error_lines))) => {
                if status.success() {
                    Ok(())
                } else {
                    let stderr = if error_lines.is_empty() {
                        None
                    } else {
                        Some(Vec::from(error_lines).join("\n"))
                    };
                    Err(ConverterError::process_failed(program, status.code(), stderr))
                }
            }
            Ok(Err(e)) => Err(ConverterError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                Err(ConverterError::Timeout {
                    program,
                    timeout_secs: self.config.timeout_secs,
                })
            }
        }
    }
}

#[async_trait]
impl StreamProber for FfmpegTools {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let program = Self::program_name(&self.config.ffprobe_path);
        let command = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "stream=index,codec_type,codec_name:stream_tags=language,title:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.config.timeout(), command)
            .await
            .map_err(|_| ConverterError::Timeout {
                program,
                timeout_secs: self.config.timeout_secs,
            })?
            .map_err(|e| Self::spawn_error(e, &self.config.ffprobe_path, false))?;

        if !output.status.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }
}

#[async_trait]
impl TranscodeRunner for FfmpegTools {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn run(&self, job: &TranscodeJob) -> Result<(), ConverterError> {
        self.run_ffmpeg(job).await
    }
}

//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::converter::{ConverterError, ProbeReport, StreamProber};

/// Mock implementation of the [`StreamProber`] trait.
///
/// Returns pre-configured reports by path and records every probed path.
/// Paths without a configured report fail as if ffprobe had rejected them.
#[derive(Debug, Clone, Default)]
pub struct MockProber {
    reports: Arc<RwLock<HashMap<PathBuf, ProbeReport>>>,
    probed: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockProber {
    /// Create a new mock prober.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the report returned for `report.path`.
    pub async fn set_report(&self, report: ProbeReport) {
        self.reports
            .write()
            .await
            .insert(report.path.clone(), report);
    }

    /// Every path probed so far, in call order.
    pub async fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.read().await.clone()
    }
}

#[async_trait]
impl StreamProber for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError> {
        self.probed.write().await.push(path.to_path_buf());

        self.reports
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| {
                ConverterError::parse_error(format!("no probe result for {}", path.display()))
            })
    }
}

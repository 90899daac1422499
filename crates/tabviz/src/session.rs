//! Per-session state.
//!
//! The shell owns one [`SessionContext`] per user session and passes it to
//! the core explicitly. It holds the uploaded dataset (if any) and a cached
//! copy of the sample dataset, so generating the sample happens at most once
//! per session until the cache is cleared.

use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, DatasetLoader, generate_sample_dataset};
use crate::error::Result;

/// Where the active dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Upload { filename: String },
    Sample,
}

/// Session-scoped state, owned by the shell.
#[derive(Debug, Default)]
pub struct SessionContext {
    config: DashboardConfig,
    upload: Option<(String, Dataset)>,
    sample_cache: Option<Dataset>,
}

static_assertions::assert_impl_all!(SessionContext: Send);

impl SessionContext {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            upload: None,
            sample_cache: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Decode an upload and make it the session's dataset.
    ///
    /// On failure the previous upload is kept.
    pub fn upload(&mut self, filename: &str, bytes: &[u8]) -> Result<&Dataset> {
        let dataset = DatasetLoader::new(&self.config).load(filename, bytes)?;
        Ok(self.set_upload(filename, dataset))
    }

    /// Store an already decoded dataset as the upload.
    pub fn set_upload(&mut self, filename: impl Into<String>, dataset: Dataset) -> &Dataset {
        let filename = filename.into();
        info!("Session dataset set from upload '{}'", filename);
        &self.upload.insert((filename, dataset)).1
    }

    pub fn uploaded_dataset(&self) -> Option<&Dataset> {
        self.upload.as_ref().map(|(_, dataset)| dataset)
    }

    pub fn clear_upload(&mut self) {
        self.upload = None;
    }

    /// The sample dataset, generated on first use and cached afterwards.
    pub fn sample_dataset(&mut self) -> Result<&Dataset> {
        let dataset = match self.sample_cache.take() {
            Some(dataset) => dataset,
            None => {
                debug!("Generating sample dataset for session");
                generate_sample_dataset()?
            }
        };
        Ok(self.sample_cache.insert(dataset))
    }

    pub fn has_cached_sample(&self) -> bool {
        self.sample_cache.is_some()
    }

    /// Drop the cached sample. Clearing an empty cache is a no-op.
    pub fn clear_sample_cache(&mut self) {
        if self.sample_cache.take().is_some() {
            debug!("Sample dataset cache cleared");
        }
    }

    /// The upload when there is one, otherwise the sample dataset.
    pub fn active_dataset(&mut self) -> Result<(&Dataset, DatasetSource)> {
        match self.upload {
            Some((ref filename, ref dataset)) => Ok((
                dataset,
                DatasetSource::Upload {
                    filename: filename.clone(),
                },
            )),
            None => Ok((self.sample_dataset()?, DatasetSource::Sample)),
        }
    }
}

//! Read-only pipeline configuration.

use frazil_fetch::url::BASE_URL;
use std::path::{Path, PathBuf};

/// Configuration shared read-only by every pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the remote data bucket.
    pub base_url: String,
    /// Instrument symbol as it appears in the source CSV.
    pub symbol: String,
    /// Instrument directory name in the output tree.
    pub instrument: String,
    /// Root of the output archive tree.
    pub output_root: PathBuf,
}

impl PipelineConfig {
    /// Creates a configuration for the default instrument (XBTUSD) and the
    /// public BitMEX bucket.
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            symbol: "XBTUSD".to_string(),
            instrument: "xbtusd".to_string(),
            output_root: output_root.into(),
        }
    }

    /// Overrides the target symbol; the output directory name follows as
    /// its lowercase form.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self.instrument = self.symbol.to_lowercase();
        self
    }

    /// Overrides the remote base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the output root path.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

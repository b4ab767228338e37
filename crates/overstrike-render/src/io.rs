//! JSON configuration for a complete render.

use crate::compose::ComposeOptions;
use crate::job::JobOptions;
use crate::params::{CandidatePolicy, RenderParams};
use overstrike_core::HogParams;
use overstrike_glyphs::GlyphGeometry;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything needed to go from a normalized image to printer bytes.
///
/// Every section is optional in the JSON file and falls back to its default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverstrikeConfig {
    pub hog: HogParams,
    pub geometry: GlyphGeometry,
    pub render: RenderParams,
    pub candidates: CandidatePolicy,
    pub compose: ComposeOptions,
    pub job: JobOptions,
}

impl OverstrikeConfig {
    /// Teletype defaults: two layers at factor 0.5 with the curated first-layer set.
    pub fn teletype() -> Self {
        Self {
            candidates: CandidatePolicy::teletype(),
            ..Self::default()
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

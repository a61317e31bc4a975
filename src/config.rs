//! Pipeline configuration
//!
//! Every field has a default, so a partial TOML file is valid:
//!
//! ```toml
//! color = [200, 40, 40]
//!
//! [preprocess]
//! sigma = 1.0
//!
//! [extract]
//! level = 0.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::preprocess::PreprocessParams;
use crate::surface::ExtractParams;

/// RGB display color for a structure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// "dark red"
    pub const DARK_RED: Rgb = Rgb(139, 0, 0);
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::DARK_RED
    }
}

/// Settings for load → preprocess → extract
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub color: Rgb,
    pub preprocess: PreprocessParams,
    pub extract: ExtractParams,
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        let config: PipelineConfig =
            toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.preprocess
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if !self.extract.level.is_finite() {
            return Err(PipelineError::Config(format!(
                "extract.level must be finite, got {}",
                self.extract.level
            )));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> PipelineResult<String> {
        toml::to_string(self).map_err(|e| PipelineError::Config(e.to_string()))
    }
}

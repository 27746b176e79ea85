//! Run configuration loaded from TOML.
//!
//! ```toml
//! alpha = 0.05
//! output_dir = "output"
//! use_builtin = true
//!
//! [[scenario]]
//! id = 7
//! title = "Standing desks and focus"
//! factor = "desk"
//! variable = "focus score"
//! count = 40
//! seed = 47
//! group_a = { label = "standing", mean = 62.0, std_dev = 9.0 }
//! group_b = { label = "sitting",  mean = 60.0, std_dev = 9.0 }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ContrastError, Result};
use crate::hypothesis::{validate_alpha, DEFAULT_ALPHA};
use crate::scenario::{builtin_scenarios, ScenarioSpec};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Significance threshold for every comparison.
    pub alpha: f64,
    /// Where CSV / Markdown / JSON outputs are written.
    pub output_dir: PathBuf,
    /// Include the six built-in scenarios.
    pub use_builtin: bool,
    /// Extra or overriding scenarios; an id matching a built-in replaces it.
    #[serde(rename = "scenario")]
    pub scenarios: Vec<ScenarioSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            output_dir: PathBuf::from("output"),
            use_builtin: true,
            scenarios: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&src)?;
        tracing::debug!(path = %path.display(), scenarios = cfg.scenarios.len(), "loaded config");
        Ok(cfg)
    }

    /// Check alpha, every scenario, and that scenario ids are unique.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        let mut seen = std::collections::HashSet::new();
        for s in &self.scenarios {
            s.validate()?;
            if !seen.insert(s.id) {
                return Err(ContrastError::InvalidScenario(format!(
                    "scenario id {} appears more than once",
                    s.id
                )));
            }
        }
        Ok(())
    }

    /// Scenarios to run, ordered by id.
    pub fn scenarios(&self) -> Vec<ScenarioSpec> {
        let mut merged: Vec<ScenarioSpec> = if self.use_builtin {
            builtin_scenarios()
                .into_iter()
                .filter(|b| !self.scenarios.iter().any(|s| s.id == b.id))
                .collect()
        } else {
            Vec::new()
        };
        merged.extend(self.scenarios.iter().cloned());
        merged.sort_by_key(|s| s.id);
        merged
    }
}

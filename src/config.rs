//! Runtime configuration: where the source JSON lives and where output goes.

use std::path::PathBuf;

use crate::error::{AtlasError, Result};

pub const DATA_DIR_VAR: &str = "JINGSHI_DATA_DIR";
pub const OUTPUT_DIR_VAR: &str = "JINGSHI_OUTPUT_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Root searched (recursively) for the named source files.
    pub data_dir: PathBuf,
    /// Where `dataset.json` and the preprocessed files are written.
    pub output_dir: PathBuf,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AtlasConfig {
    /// Load from `JINGSHI_DATA_DIR` / `JINGSHI_OUTPUT_DIR`, falling back to
    /// `data` / `output`. A variable set to an empty string is rejected.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dir = |var: &str, default: &str| -> Result<PathBuf> {
            match lookup(var) {
                Some(v) if v.trim().is_empty() => {
                    Err(AtlasError::Config(format!("{var} is set but empty")))
                }
                Some(v) => Ok(PathBuf::from(v)),
                None => Ok(PathBuf::from(default)),
            }
        };

        Ok(Self {
            data_dir: dir(DATA_DIR_VAR, DEFAULT_DATA_DIR)?,
            output_dir: dir(OUTPUT_DIR_VAR, DEFAULT_OUTPUT_DIR)?,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(d) = data_dir {
            self.data_dir = d;
        }
        if let Some(o) = output_dir {
            self.output_dir = o;
        }
        self
    }
}

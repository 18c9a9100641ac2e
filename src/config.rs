use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::ingest::DEFAULT_BATCH_SIZE;
use crate::season::SeasonRule;

/// Pipeline configuration. Every field has a default, so a missing config
/// file means default behavior rather than an error.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "SeasonRule::autumn_default")]
    pub autumn: SeasonRule,
    #[serde(default = "SeasonRule::winter_default")]
    pub winter: SeasonRule,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            batch_size: default_batch_size(),
            autumn: SeasonRule::autumn_default(),
            winter: SeasonRule::winter_default(),
        }
    }
}

impl PipelineConfig {
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b',')
    }
}

/// Loads the configuration from a JSON file.
pub fn load_config(path_str: &str) -> Result<PipelineConfig, ConfigError> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }

    let file = File::open(&path).map_err(|e| ConfigError::IoError {
        path: path.clone(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
        path: path.clone(),
        source: e,
    })
}

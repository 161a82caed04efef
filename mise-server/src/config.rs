use std::path::PathBuf;

use mise::upload::UploadConfig;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Config {
    /// Load the configuration from a YAML file.
    pub fn load(yml_path: &str) -> anyhow::Result<Self> {
        let yml = std::fs::read_to_string(yml_path)?;
        let config = serde_yaml::from_str(&yml)?;
        Ok(config)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_address() -> String {
    "0.0.0.0:1337".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

/// How ingredient and instruction lists go out on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListEncoding {
    /// JSON arrays, the current schema.
    #[default]
    Sequence,
    /// One comma separated string, the old schema.
    Delimited,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub list_encoding: ListEncoding,
    /// When false, every delete is answered with 403.
    #[serde(default = "default_allow_delete")]
    pub allow_delete: bool,
    /// YAML list of recipe drafts loaded at startup.
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

fn default_allow_delete() -> bool {
    true
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            list_encoding: ListEncoding::default(),
            allow_delete: default_allow_delete(),
            seed: None,
        }
    }
}

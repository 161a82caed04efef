use mise::upload::UploadConfig;
use serde::Deserialize;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:1337";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
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

    /// Apply `MISE_BACKEND_URL` and `MISE_API_TOKEN` from the environment or `.env`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = dotenvy::var("MISE_BACKEND_URL") {
            tracing::debug!("Backend URL overridden from environment: {}", url);
            self.backend.base_url = url;
        }
        if let Ok(token) = dotenvy::var("MISE_API_TOKEN") {
            self.backend.api_token = Some(token);
        }
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request, for collections that are not public.
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
        }
    }
}

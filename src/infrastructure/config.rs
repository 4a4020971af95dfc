use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub resources: ResourceSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_address")]
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationSettings {
    #[serde(default = "default_max_concurrent_tiles")]
    pub max_concurrent_tiles: usize,
    #[serde(default = "default_tile_timeout_secs")]
    pub tile_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResourceSettings {
    #[serde(default = "default_resource_directory")]
    pub directory: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSettings {
    #[serde(default = "default_secret")]
    pub default_secret: String,
}

fn default_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_tiles() -> usize {
    4
}

fn default_tile_timeout_secs() -> u64 {
    60
}

fn default_resource_directory() -> String {
    "resources".to_string()
}

fn default_secret() -> String {
    "dynatrace".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            max_concurrent_tiles: default_max_concurrent_tiles(),
            tile_timeout_secs: default_tile_timeout_secs(),
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            directory: default_resource_directory(),
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            default_secret: default_secret(),
        }
    }
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl EvaluationSettings {
    pub fn tile_timeout(&self) -> Duration {
        Duration::from_secs(self.tile_timeout_secs)
    }
}

/// `config/dashboard-sli.*` (optional) overlaid with `DASHBOARD_SLI__*` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard-sli").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD_SLI").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Per-service `dynatrace.conf.yaml` resource.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DynatraceConfigFile {
    #[serde(rename = "dtCreds", alias = "dtcreds", default = "default_secret")]
    pub dt_creds: String,
    #[serde(default)]
    pub dashboard: String,
}

impl Default for DynatraceConfigFile {
    fn default() -> Self {
        Self {
            dt_creds: default_secret(),
            dashboard: String::new(),
        }
    }
}

pub fn parse_dynatrace_config(content: &str) -> anyhow::Result<DynatraceConfigFile> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

use grandlivre::providers::anthropic::{ANTHROPIC_HOST, ANTHROPIC_MODEL};
use grandlivre::providers::configs::{
    AnthropicProviderConfig, ProviderConfig, ThesysProviderConfig, DEFAULT_MAX_TOKENS,
};
use grandlivre::providers::thesys::{THESYS_HOST, THESYS_MODEL};

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
}

/// Raw environment view, before resolution. Field names follow the variables
/// the deployment already uses.
#[derive(Debug, Deserialize)]
struct RawSettings {
    server: ServerSettings,
    thesys_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
}

#[derive(Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderConfig,
    pub supabase: SupabaseSettings,
}

impl Settings {
    /// Resolve the configuration from the environment, exactly once at
    /// startup. Missing store credentials and missing backend credentials
    /// are both startup-fatal.
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let raw: RawSettings = config.try_deserialize()?;
        Self::resolve(raw)
    }

    fn resolve(raw: RawSettings) -> Result<Self, ConfigError> {
        let url = raw.supabase_url.ok_or(ConfigError::MissingEnvVar {
            env_var: "SUPABASE_URL".to_string(),
        })?;
        let key = raw.supabase_anon_key.ok_or(ConfigError::MissingEnvVar {
            env_var: "SUPABASE_ANON_KEY".to_string(),
        })?;

        // Presence of a credential selects the backend; Thesys wins when
        // both are set.
        let provider = if let Some(api_key) = raw.thesys_api_key {
            ProviderConfig::Thesys(ThesysProviderConfig {
                host: THESYS_HOST.to_string(),
                api_key,
                model: THESYS_MODEL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            })
        } else if let Some(api_key) = raw.anthropic_api_key {
            ProviderConfig::Anthropic(AnthropicProviderConfig {
                host: ANTHROPIC_HOST.to_string(),
                api_key,
                model: ANTHROPIC_MODEL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            })
        } else {
            return Err(ConfigError::NoProviderCredential);
        };

        Ok(Settings {
            server: raw.server,
            provider,
            supabase: SupabaseSettings { url, key },
        })
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("no model backend credential found: set THESYS_API_KEY or ANTHROPIC_API_KEY")]
    NoProviderCredential,

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

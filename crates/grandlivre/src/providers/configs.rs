/// Default response budget for both backends.
pub const DEFAULT_MAX_TOKENS: i32 = 4096;

// Unified enum to wrap different provider configurations. Exactly one
// backend is resolved at startup and injected; nothing re-reads the
// environment per request.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Anthropic(AnthropicProviderConfig),
    Thesys(ThesysProviderConfig),
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: i32,
}

#[derive(Debug, Clone)]
pub struct ThesysProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: i32,
}

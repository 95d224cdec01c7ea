use anyhow::Result;

use super::{
    anthropic::AnthropicProvider, base::Provider, configs::ProviderConfig, thesys::ThesysProvider,
};

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
        ProviderConfig::Thesys(thesys_config) => Ok(Box::new(ThesysProvider::new(thesys_config)?)),
    }
}

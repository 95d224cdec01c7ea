pub mod anthropic;
pub mod base;
pub mod configs;
pub mod factory;
pub mod thesys;
pub mod utils;

#[cfg(test)]
pub mod mock;

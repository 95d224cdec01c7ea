//! These models represent the objects passed around by the agent
//!
//! There are several different related formats we need to interact with:
//! - chat endpoint messages, sent from the web client to the agent
//! - anthropic messages/tools, sent from the agent to the LLM
//! - openai-style messages/tools, sent from the agent to the Thesys C1 LLM
//! - select queries, sent from the tools to the accounting data store
//!
//! These all overlap to varying degrees. We always immediately convert those
//! data models into the internal structs using to/from helpers. Because of the
//! need for compatibility, the internal models are not an exact match to any
//! of these formats.
pub mod message;
pub mod role;
pub mod tool;

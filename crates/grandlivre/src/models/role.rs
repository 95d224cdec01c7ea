use serde::{Deserialize, Serialize};

/// Speaker of a conversation message. System and tool turns are synthesized
/// internally and never accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

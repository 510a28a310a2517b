pub mod registry;
pub mod specialist;

use crate::types::Result;
use async_trait::async_trait;

// Re-export commonly used types
pub use registry::AgentRegistry;
pub use specialist::{SpecialistAgent, SpecialistConfig};

/// Base trait for question-answering agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer one question.
    async fn answer(&self, question: &str) -> Result<String>;

    /// The system prompt sent with every request.
    fn system_prompt(&self) -> String;

    /// The resource this agent is bound to.
    fn resource_id(&self) -> u32;
}

use serde::{Deserialize, Serialize};

// ============= Coordinator Exchange Types =============

/// A question addressed to the specialist bound to one resource.
///
/// `resource_id` is kept signed because it comes straight from model output;
/// ids outside the catalog are answered with an error envelope instead of
/// being rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "lecture_number")]
    pub resource_id: i64,
    pub question: String,
}

impl Query {
    pub fn new(resource_id: i64, question: impl Into<String>) -> Self {
        Self {
            resource_id,
            question: question.into(),
        }
    }
}

/// The answer (or error) produced for one [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEnvelope {
    pub resource_id: i64,
    pub outcome: std::result::Result<String, String>,
}

impl AnswerEnvelope {
    pub fn answer(resource_id: i64, text: impl Into<String>) -> Self {
        Self {
            resource_id,
            outcome: Ok(text.into()),
        }
    }

    pub fn error(resource_id: i64, message: impl Into<String>) -> Self {
        Self {
            resource_id,
            outcome: Err(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Text as it is shown to the coordinator model.
    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(message) => format!("Error: {}", message),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

use crate::models::QnaId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("QnA Maker API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
    #[error("adapter used before initialize()")]
    NotInitialized,
    #[error("knowledge base '{0}' not found after creation")]
    KnowledgeBaseNotFound(String),
    #[error("unknown question: {0}")]
    UnknownQuestion(QnaId),
}

pub type StoreResult<T> = Result<T, StoreError>;

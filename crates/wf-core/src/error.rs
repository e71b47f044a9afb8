use thiserror::Error;

/// Errors raised by graph edits, document loading, and storage access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// An edge endpoint names a node that is not in the graph.
    #[error("node '{id}' does not exist")]
    InvalidReference { id: String },

    /// An inserted edge reuses an id already in the graph.
    #[error("id '{id}' is already in use")]
    DuplicateId { id: String },

    /// A persisted document failed structural validation.
    #[error("malformed workflow document: {0}")]
    MalformedDocument(String),

    /// Nothing has been saved under the storage key yet.
    #[error("no saved workflow under key '{key}'")]
    NotFound { key: String },

    /// The host store or download sink refused the operation.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

impl From<serde_json::Error> for WorkflowError {
    fn from(err: serde_json::Error) -> Self {
        WorkflowError::MalformedDocument(err.to_string())
    }
}

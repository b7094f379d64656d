use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error in {origin}: {message}")]
    ConfigLoad { origin: String, message: String },

    #[error("Duplicate metric key: {0}")]
    DuplicateKey(String),

    #[error("Duplicate category id '{id}' in external list '{list}'")]
    DuplicateCategoryId { list: String, id: String },

    #[error("Unknown taxonomy name: {0}")]
    UnknownTaxonomyName(String),

    #[error("Evaluation context unavailable for version {version}: {message}")]
    ContextUnavailable { version: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    pub(crate) fn config(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ContextUnavailable { .. } => 3,
            _ => 2,
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Creator already registered: {0}")]
    Duplicate(String),

    #[error("Creator not found: {0}")]
    NotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Lookup unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Errors the user caused and should see, as opposed to plumbing failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Duplicate(_) | AppError::NotFound(_) | AppError::MalformedInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

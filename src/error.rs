use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode todos: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Todo #{0} not found")]
    NotFound(u64),

    #[error("Todo #{0} not found")]
    UnknownId(i64),

    #[error("Error: {0}")]
    InvalidInput(String),

    #[error("Could not determine home directory; pass --file or set TODO_FILE")]
    HomeDirUnavailable,
}

impl AppError {
    /// Process exit status reported for this error.
    pub fn status(&self) -> u8 {
        match self {
            AppError::NotFound(_) | AppError::UnknownId(_) => 1,
            AppError::InvalidInput(_) => 2,
            AppError::Io(_) | AppError::Encode(_) | AppError::HomeDirUnavailable => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

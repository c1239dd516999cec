use std::env;
use std::path::PathBuf;

use crate::error::AppError;

pub const FILE_ENV: &str = "TODO_FILE";
pub const DEFAULT_FILE_NAME: &str = ".claude_todos.json";

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `TODO_FILE` if set and non-empty, otherwise `~/.claude_todos.json`.
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_override(env::var(FILE_ENV).ok())
    }

    /// Resolve the todo file from an explicit value, falling back to the home directory.
    pub fn from_override(value: Option<String>) -> Result<Self, AppError> {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(default_path()?)),
        }
    }
}

pub fn default_path() -> Result<PathBuf, AppError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_FILE_NAME))
        .ok_or(AppError::HomeDirUnavailable)
}

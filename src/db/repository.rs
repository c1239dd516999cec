use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::Todo;

/// Load todos from the persisted file.
///
/// A missing, unreadable or malformed file yields an empty list; the failure is
/// only logged.
pub async fn load_todos(path: &Path) -> Vec<Todo> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no todo file at {}, starting empty", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match decode_todos(&raw) {
        Ok(todos) => {
            debug!("loaded {} todos from {}", todos.len(), path.display());
            todos
        }
        Err(e) => {
            warn!("ignoring malformed todo file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Overwrite the persisted file with `todos`.
///
/// The new content is written to a sibling temp file, fsynced and renamed over
/// the target. A symlinked todo file is written through to its target, and the
/// existing file's permissions are kept.
pub async fn save_todos(path: &Path, todos: &[Todo]) -> Result<(), AppError> {
    let body = encode_todos(todos)?;
    let target = resolve_target(path).await;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(&target);
    if let Err(e) = write_synced(&tmp, body.as_bytes(), &target).await {
        fs::remove_file(&tmp).await.ok();
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, &target).await {
        fs::remove_file(&tmp).await.ok();
        return Err(e.into());
    }

    debug!("saved {} todos to {}", todos.len(), target.display());
    Ok(())
}

/// Follow symlinks so the rename replaces the real file, not the link.
async fn resolve_target(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path).await {
        return resolved;
    }

    // dangling link: write where it points
    match fs::read_link(path).await {
        Ok(link) => match path.parent() {
            Some(parent) => parent.join(link),
            None => link,
        },
        Err(_) => path.to_path_buf(),
    }
}

async fn write_synced(tmp: &Path, body: &[u8], target: &Path) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    if let Ok(meta) = fs::metadata(target).await {
        file.set_permissions(meta.permissions()).await?;
    }
    file.write_all(body).await?;
    file.sync_all().await?;
    Ok(())
}

pub fn decode_todos(raw: &str) -> Result<Vec<Todo>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_todos(todos: &[Todo]) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_string_pretty(todos)?;
    body.push('\n');
    Ok(body)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "todos.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Completion, Revision, Todo};

/// Ordered todo list backed by a single JSON file.
///
/// The file is read once in `open`; every mutating call writes the full list
/// back before the in-memory state changes.
pub struct TodoStore {
    path: PathBuf,
    todos: Vec<Todo>,
}

impl TodoStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let todos = repository::load_todos(&path).await;
        Self { path, todos }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Id for the next todo: one past the largest id currently present.
    ///
    /// Ids of deleted todos can come back if the highest one was removed.
    pub fn next_id(&self) -> Result<u64, AppError> {
        self.todos
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AppError::InvalidInput("id space exhausted".to_string()))
    }

    pub async fn add(&mut self, description: impl Into<String>) -> Result<Todo, AppError> {
        let todo = Todo::new(self.next_id()?, description);

        let mut next = self.todos.clone();
        next.push(todo.clone());
        self.commit(next).await?;

        info!("added todo #{}", todo.id);
        Ok(todo)
    }

    pub fn list(&self, include_completed: bool) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|t| include_completed || !t.completed)
            .collect()
    }

    pub async fn complete(&mut self, id: u64) -> Result<Completion, AppError> {
        let index = self.position(id)?;
        if self.todos[index].completed {
            debug!("todo #{} already completed", id);
            return Ok(Completion::AlreadyCompleted(self.todos[index].clone()));
        }

        let mut next = self.todos.clone();
        let todo = &mut next[index];
        todo.completed = true;
        todo.completed_at = Some(Utc::now());
        let completed = todo.clone();
        self.commit(next).await?;

        info!("completed todo #{}", id);
        Ok(Completion::Completed(completed))
    }

    pub async fn delete(&mut self, id: u64) -> Result<Todo, AppError> {
        let index = self.position(id)?;

        let mut next = self.todos.clone();
        let removed = next.remove(index);
        self.commit(next).await?;

        info!("deleted todo #{}", id);
        Ok(removed)
    }

    pub async fn update(
        &mut self,
        id: u64,
        description: impl Into<String>,
    ) -> Result<Revision, AppError> {
        let index = self.position(id)?;

        let mut next = self.todos.clone();
        let todo = &mut next[index];
        let previous = std::mem::replace(&mut todo.description, description.into());
        todo.updated_at = Some(Utc::now());
        let updated = todo.clone();
        self.commit(next).await?;

        info!("updated todo #{}", id);
        Ok(Revision {
            previous,
            todo: updated,
        })
    }

    /// Remove every completed todo and return how many were removed.
    ///
    /// Nothing is written when there is nothing to clear.
    pub async fn clear_completed(&mut self) -> Result<usize, AppError> {
        let count = self.todos.iter().filter(|t| t.completed).count();
        if count == 0 {
            return Ok(0);
        }

        let next = self.todos.iter().filter(|t| !t.completed).cloned().collect();
        self.commit(next).await?;

        info!("cleared {} completed todos", count);
        Ok(count)
    }

    fn position(&self, id: u64) -> Result<usize, AppError> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(AppError::NotFound(id))
    }

    async fn commit(&mut self, next: Vec<Todo>) -> Result<(), AppError> {
        repository::save_todos(&self.path, &next).await?;
        self.todos = next;
        Ok(())
    }
}

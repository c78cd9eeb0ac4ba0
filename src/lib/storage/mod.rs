pub mod sqlite;

use async_trait::async_trait;
use crate::core::{Todo, TodoChanges, TodoError};

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, title: &str, user_id: i64) -> Result<Todo, TodoError>;
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, TodoError>;
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError>;
    async fn find_by_id(&self, id: i64) -> Result<Todo, TodoError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError>;
}

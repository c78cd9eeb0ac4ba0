use async_trait::async_trait;

use crate::core::{Todo, TodoChanges, TodoError};
use crate::storage::TodoRepository;

/// What the HTTP layer needs from the application.
#[async_trait]
pub trait TodoService: Send + Sync {
    async fn create(&self, title: &str, user_id: i64) -> Result<Todo, TodoError>;
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, TodoError>;
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError>;
    async fn find_by_id(&self, id: i64) -> Result<Todo, TodoError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, title: &str, user_id: i64) -> Result<Todo, TodoError> {
        self.repo.create(title, user_id).await
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, TodoError> {
        self.repo.update(id, changes).await
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        self.repo.find_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Todo, TodoError> {
        self.repo.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError> {
        self.repo.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Call {
        Create(String, i64),
        Update(i64, TodoChanges),
        FindAll,
        FindById(i64),
        DeleteById(i64),
    }

    /// Records every call and answers with a fixed outcome.
    struct RecordingRepository {
        outcome: Result<Todo, TodoError>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingRepository {
        fn returning(outcome: Result<Todo, TodoError>) -> Self {
            Self { outcome, calls: Mutex::new(Vec::new()) }
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl TodoRepository for RecordingRepository {
        async fn create(&self, title: &str, user_id: i64) -> Result<Todo, TodoError> {
            self.record(Call::Create(title.to_string(), user_id));
            self.outcome.clone()
        }

        async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, TodoError> {
            self.record(Call::Update(id, changes));
            self.outcome.clone()
        }

        async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
            self.record(Call::FindAll);
            self.outcome.clone().map(|todo| vec![todo])
        }

        async fn find_by_id(&self, id: i64) -> Result<Todo, TodoError> {
            self.record(Call::FindById(id));
            self.outcome.clone()
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), TodoError> {
            self.record(Call::DeleteById(id));
            self.outcome.clone().map(|_| ())
        }
    }

    fn todo() -> Todo {
        Todo {
            id: 1,
            title: "Test".to_string(),
            completed: false,
            created_at: Utc::now(),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn forwards_every_operation_unchanged() {
        let service = TodoServiceImpl::new(RecordingRepository::returning(Ok(todo())));
        let changes = TodoChanges { title: "Updated".to_string(), completed: true };

        assert_eq!(service.create("Test", 1).await.unwrap().title, "Test");
        service.update(1, changes.clone()).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);
        service.find_by_id(1).await.unwrap();
        service.delete_by_id(1).await.unwrap();

        let calls = service.repo.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                Call::Create("Test".to_string(), 1),
                Call::Update(1, changes),
                Call::FindAll,
                Call::FindById(1),
                Call::DeleteById(1),
            ]
        );
    }

    #[tokio::test]
    async fn errors_pass_through_untouched() {
        let err = TodoError::Storage("disk I/O error".to_string());
        let service = TodoServiceImpl::new(RecordingRepository::returning(Err(err.clone())));

        assert_eq!(service.create("fail", 2).await, Err(err.clone()));
        assert_eq!(service.find_all().await, Err(err.clone()));
        assert_eq!(service.find_by_id(99).await, Err(err.clone()));
        assert_eq!(service.delete_by_id(99).await, Err(err));
    }

    #[tokio::test]
    async fn not_found_is_not_rewritten() {
        let service = TodoServiceImpl::new(RecordingRepository::returning(Err(TodoError::NotFound)));
        let changes = TodoChanges { title: "x".to_string(), completed: false };
        assert_eq!(service.update(404, changes).await, Err(TodoError::NotFound));
    }
}

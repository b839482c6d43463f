//! Asynchronous capability contract for the remote collection source.
//!
//! Transport and JSON encoding live behind this trait; the controller only
//! sees typed entities and opaque error messages.

mod memory;

pub use memory::InMemoryRemote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{Comment, Id, Page, Project, StatusFilter, Task, TaskStatus};

/// Errors surfaced by the remote collection source.
///
/// The controller never interprets these beyond displaying their message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{message}")]
    Transport { message: String },

    #[error("not authorized: {message}")]
    Unauthorized { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },
}

impl RemoteError {
    pub fn transport(message: impl Into<String>) -> Self {
        RemoteError::Transport {
            message: message.into(),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Page window to request. The controller always asks for page 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// The first page with the given size
    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }
}

/// Payload for creating a task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub details: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_at: Option<DateTime<Utc>>,
    pub assignee_username: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Remote collection source: given a parent key and filter, returns a page of
/// items; supports create/update/delete by id.
///
/// Implementations must be safe to share across spawned fetches
/// (`Arc<dyn RemoteSource>`). Calls are never cancelled by the controller;
/// superseded results are discarded at resolution time instead.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn list_projects(&self, page: PageRequest) -> RemoteResult<Page<Project>>;

    async fn create_project(
        &self,
        name: String,
        description: Option<String>,
    ) -> RemoteResult<Project>;

    async fn delete_project(&self, project_id: Id) -> RemoteResult<()>;

    async fn list_tasks(
        &self,
        project_id: Id,
        filter: StatusFilter,
        page: PageRequest,
    ) -> RemoteResult<Page<Task>>;

    async fn create_task(&self, project_id: Id, draft: NewTask) -> RemoteResult<Task>;

    async fn delete_task(&self, project_id: Id, task_id: Id) -> RemoteResult<()>;

    async fn update_task_status(
        &self,
        project_id: Id,
        task_id: Id,
        status: TaskStatus,
    ) -> RemoteResult<Task>;

    async fn list_comments(&self, task_id: Id, page: PageRequest) -> RemoteResult<Page<Comment>>;

    async fn create_comment(&self, task_id: Id, body: String) -> RemoteResult<Comment>;

    async fn delete_comment(&self, task_id: Id, comment_id: Id) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");

        let err = RemoteError::NotFound {
            entity: "task",
            id: 9,
        };
        assert_eq!(err.to_string(), "task 9 not found");
    }

    #[test]
    fn test_page_request_first() {
        let req = PageRequest::first(200);
        assert_eq!(req.page, 0);
        assert_eq!(req.size, 200);
    }
}

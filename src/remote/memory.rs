//! In-memory reference implementation of [`RemoteSource`].
//!
//! Mirrors the service's observable behavior closely enough for controller
//! tests and wiring demos: server-assigned ids, newest-first ordering for
//! projects and tasks (the server sorts by creation time descending),
//! status filtering, page windows, and cascading deletes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{NewTask, PageRequest, RemoteError, RemoteResult, RemoteSource};
use crate::model::{Assignee, Comment, Id, Page, Project, StatusFilter, Task, TaskStatus};

#[derive(Default)]
struct Store {
    next_id: Id,
    projects: Vec<Project>,
    /// Tasks per project, newest first
    tasks: HashMap<Id, Vec<Task>>,
    /// Comments per task, conversation order
    comments: HashMap<Id, Vec<Comment>>,
    /// When set, the next call fails once with this message
    fail_next: Option<String>,
}

impl Store {
    fn mint_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn take_fault(&mut self) -> RemoteResult<()> {
        match self.fail_next.take() {
            Some(message) => Err(RemoteError::Transport { message }),
            None => Ok(()),
        }
    }
}

/// Remote source backed by process memory
pub struct InMemoryRemote {
    store: Mutex<Store>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    /// Make the next remote call fail once with the given message
    pub fn fail_next_call(&self, message: impl Into<String>) {
        self.store.lock().unwrap().fail_next = Some(message.into());
    }

    /// Seed a project directly, bypassing the create path (test setup)
    pub fn seed_project(&self, name: &str) -> Id {
        let mut store = self.store.lock().unwrap();
        let id = store.mint_id();
        store.projects.insert(
            0,
            Project {
                id,
                name: name.to_string(),
                description: None,
            },
        );
        store.tasks.insert(id, Vec::new());
        id
    }

    /// Seed a task under a project (test setup)
    pub fn seed_task(&self, project_id: Id, title: &str, status: TaskStatus) -> Id {
        let mut store = self.store.lock().unwrap();
        let id = store.mint_id();
        let task = Task {
            id,
            title: title.to_string(),
            details: None,
            status,
            assignee: None,
            due_at: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        store.tasks.entry(project_id).or_default().insert(0, task);
        store.comments.insert(id, Vec::new());
        id
    }

    /// Seed a comment under a task (test setup)
    pub fn seed_comment(&self, task_id: Id, body: &str) -> Id {
        let mut store = self.store.lock().unwrap();
        let id = store.mint_id();
        let comment = Comment {
            id,
            body: body.to_string(),
            created_at: Some(Utc::now()),
        };
        store.comments.entry(task_id).or_default().push(comment);
        id
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut a page window out of an already-ordered collection
fn page_of<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let size = request.size.max(1) as usize;
    let start = request.page as usize * size;
    let content: Vec<T> = items.iter().skip(start).take(size).cloned().collect();
    let total_elements = items.len() as u64;
    let total_pages = items.len().div_ceil(size) as u32;
    Page {
        content,
        total_elements,
        total_pages,
        number: request.page,
        size: request.size,
    }
}

#[async_trait]
impl RemoteSource for InMemoryRemote {
    async fn list_projects(&self, page: PageRequest) -> RemoteResult<Page<Project>> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        Ok(page_of(&store.projects, page))
    }

    async fn create_project(
        &self,
        name: String,
        description: Option<String>,
    ) -> RemoteResult<Project> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let id = store.mint_id();
        let project = Project {
            id,
            name,
            description,
        };
        store.projects.insert(0, project.clone());
        store.tasks.insert(id, Vec::new());
        Ok(project)
    }

    async fn delete_project(&self, project_id: Id) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let before = store.projects.len();
        store.projects.retain(|p| p.id != project_id);
        if store.projects.len() == before {
            return Err(RemoteError::NotFound {
                entity: "project",
                id: project_id,
            });
        }
        // Cascade: the server deletes tasks and their comments with the project
        if let Some(tasks) = store.tasks.remove(&project_id) {
            for task in tasks {
                store.comments.remove(&task.id);
            }
        }
        Ok(())
    }

    async fn list_tasks(
        &self,
        project_id: Id,
        filter: StatusFilter,
        page: PageRequest,
    ) -> RemoteResult<Page<Task>> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let tasks = store.tasks.get(&project_id).ok_or(RemoteError::NotFound {
            entity: "project",
            id: project_id,
        })?;
        let filtered: Vec<Task> = tasks
            .iter()
            .filter(|t| filter.matches(t.status))
            .cloned()
            .collect();
        Ok(page_of(&filtered, page))
    }

    async fn create_task(&self, project_id: Id, draft: NewTask) -> RemoteResult<Task> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        if !store.tasks.contains_key(&project_id) {
            return Err(RemoteError::NotFound {
                entity: "project",
                id: project_id,
            });
        }
        let id = store.mint_id();
        let task = Task {
            id,
            title: draft.title,
            details: draft.details,
            status: draft.status.unwrap_or_default(),
            assignee: draft.assignee_username.map(|username| Assignee {
                id: None,
                username: Some(username),
            }),
            due_at: draft.due_at,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        store
            .tasks
            .entry(project_id)
            .or_default()
            .insert(0, task.clone());
        store.comments.insert(id, Vec::new());
        Ok(task)
    }

    async fn delete_task(&self, project_id: Id, task_id: Id) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let tasks = store.tasks.get_mut(&project_id).ok_or(RemoteError::NotFound {
            entity: "project",
            id: project_id,
        })?;
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if tasks.len() == before {
            return Err(RemoteError::NotFound {
                entity: "task",
                id: task_id,
            });
        }
        store.comments.remove(&task_id);
        Ok(())
    }

    async fn update_task_status(
        &self,
        project_id: Id,
        task_id: Id,
        status: TaskStatus,
    ) -> RemoteResult<Task> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let tasks = store.tasks.get_mut(&project_id).ok_or(RemoteError::NotFound {
            entity: "project",
            id: project_id,
        })?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(RemoteError::NotFound {
                entity: "task",
                id: task_id,
            })?;
        task.status = status;
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    async fn list_comments(&self, task_id: Id, page: PageRequest) -> RemoteResult<Page<Comment>> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let comments = store.comments.get(&task_id).ok_or(RemoteError::NotFound {
            entity: "task",
            id: task_id,
        })?;
        Ok(page_of(comments, page))
    }

    async fn create_comment(&self, task_id: Id, body: String) -> RemoteResult<Comment> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        if !store.comments.contains_key(&task_id) {
            return Err(RemoteError::NotFound {
                entity: "task",
                id: task_id,
            });
        }
        let id = store.mint_id();
        let comment = Comment {
            id,
            body,
            created_at: Some(Utc::now()),
        };
        store.comments.entry(task_id).or_default().push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, task_id: Id, comment_id: Id) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        store.take_fault()?;
        let comments = store.comments.get_mut(&task_id).ok_or(RemoteError::NotFound {
            entity: "task",
            id: task_id,
        })?;
        let before = comments.len();
        comments.retain(|c| c.id != comment_id);
        if comments.len() == before {
            return Err(RemoteError::NotFound {
                entity: "comment",
                id: comment_id,
            });
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned entity identity. Opaque to the client; never minted locally.
pub type Id = i64;

/// A project owned by the authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reference to the user a task is assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A task belonging to exactly one project for its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Maintained by the server; refreshed from server-returned tasks only
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A comment on a task, append-only except for explicit deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn all() -> [TaskStatus; 3] {
        [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done]
    }
}

/// Narrows the task collection query; `All` means no server-side filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// The status to send as a query parameter, if any
    pub fn as_status(&self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }

    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

/// A bounded window over a server-side collection, in server-defined order.
///
/// The controller only ever requests page 0 with a large size and treats the
/// result as "the first N items"; it never walks subsequent pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    /// Current page index
    pub number: u32,
    /// Requested page size
    pub size: u32,
}

/// Tally of the loaded task collection by status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl TaskCounts {
    pub fn tally(tasks: &[Task]) -> Self {
        let mut counts = TaskCounts::default();
        for task in tasks {
            counts.total += 1;
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: TaskStatus = serde_json::from_str("\"TODO\"").unwrap();
        assert_eq!(status, TaskStatus::Todo);
    }

    #[test]
    fn test_task_deserializes_server_shape() {
        // Shape returned by the task endpoints, optional fields omitted or null
        let json = r#"{
            "id": 7,
            "title": "Wire up login",
            "details": null,
            "status": "IN_PROGRESS",
            "assignee": {"id": 3, "username": "user1"},
            "createdAt": "2024-05-01T10:30:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assignee.unwrap().username.as_deref(), Some("user1"));
        assert!(task.details.is_none());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn test_page_deserializes_server_envelope() {
        let json = r#"{
            "content": [{"id": 1, "name": "Alpha", "description": null}],
            "totalElements": 1,
            "totalPages": 1,
            "number": 0,
            "size": 100
        }"#;
        let page: Page<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].name, "Alpha");
        assert_eq!(page.number, 0);
    }

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::All.matches(TaskStatus::Done));
        assert!(StatusFilter::Only(TaskStatus::Todo).matches(TaskStatus::Todo));
        assert!(!StatusFilter::Only(TaskStatus::Todo).matches(TaskStatus::Done));
        assert_eq!(StatusFilter::All.as_status(), None);
        assert_eq!(
            StatusFilter::Only(TaskStatus::Done).as_status(),
            Some(TaskStatus::Done)
        );
    }

    #[test]
    fn test_task_counts_tally() {
        let task = |id, status| Task {
            id,
            title: format!("t{id}"),
            details: None,
            status,
            assignee: None,
            due_at: None,
            created_at: None,
            updated_at: None,
        };
        let tasks = vec![
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::InProgress),
            task(4, TaskStatus::Done),
        ];
        let counts = TaskCounts::tally(&tasks);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.todo, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.done, 1);
    }
}

use crate::model::{Comment, Id, Page, Project, StatusFilter, Task, TaskStatus};
use crate::remote::{NewTask, RemoteResult};

/// Messages that can be dispatched to update controller state.
///
/// The first groups are user intents coming from the embedding UI; the
/// `*Loaded` and mutation-result variants are internal, sent back by
/// background fetches. Internal variants carry the generation of the level
/// they were issued under so superseded results can be discarded.
#[derive(Debug)]
pub enum Message {
    // Selection and filter
    SelectProject(Id),
    SelectTask(Id),
    ClearProjectSelection,
    ClearTaskSelection,
    SetStatusFilter(StatusFilter),
    /// Reload the project list (session start or explicit refresh)
    RefreshProjects,
    /// Tear down the session: supersede all in-flight work, drop all state
    Reset,

    // Mutations
    CreateProject { name: String, description: Option<String> },
    DeleteProject(Id),
    /// Create a task under the currently selected project
    CreateTask(NewTask),
    /// Delete a task from the currently selected project
    DeleteTask(Id),
    /// Change the status of a task in the currently selected project
    UpdateTaskStatus { task_id: Id, status: TaskStatus },
    /// Add a comment to the currently selected task
    CreateComment { body: String },
    /// Delete a comment from the currently selected task
    DeleteComment(Id),

    // Load results (internal, from background fetches)
    ProjectsLoaded {
        generation: u64,
        result: RemoteResult<Page<Project>>,
    },
    TasksLoaded {
        generation: u64,
        result: RemoteResult<Page<Task>>,
    },
    CommentsLoaded {
        generation: u64,
        result: RemoteResult<Page<Comment>>,
    },

    // Mutation results (internal, from background requests)
    ProjectCreated {
        generation: u64,
        result: RemoteResult<Project>,
    },
    ProjectDeleted {
        generation: u64,
        project_id: Id,
        result: RemoteResult<()>,
    },
    TaskCreated {
        generation: u64,
        result: RemoteResult<Task>,
    },
    TaskDeleted {
        generation: u64,
        task_id: Id,
        result: RemoteResult<()>,
    },
    TaskStatusUpdated {
        generation: u64,
        result: RemoteResult<Task>,
    },
    CommentCreated {
        generation: u64,
        result: RemoteResult<Comment>,
    },
    CommentDeleted {
        generation: u64,
        comment_id: Id,
        result: RemoteResult<()>,
    },
}

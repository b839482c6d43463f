//! The synchronization controller: single owner of selection, filter and the
//! three collection levels, driven by [`Message`]s.
//!
//! State transitions are synchronous inside [`Controller::update`]; the only
//! asynchronous boundary is the spawned fetch itself, which reports back as a
//! completion message carrying the generation it was issued under. Out-of-order
//! resolution is therefore handled entirely by generation comparison — the
//! underlying request is never cancelled, its result is just dropped.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::config::ControllerConfig;
use crate::loader::{Level, LevelState, LoadPhase};
use crate::message::Message;
use crate::model::{Comment, Id, Project, StatusFilter, Task, TaskCounts};
use crate::reconciler;
use crate::remote::{PageRequest, RemoteSource};
use crate::selection::Selection;

/// What went wrong with the most recent user-initiated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A remote call failed; the message comes from the transport layer
    Remote(String),
    /// The action was rejected locally, before any network call
    Validation(&'static str),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Remote(message) => f.write_str(message),
            ActionError::Validation(message) => f.write_str(message),
        }
    }
}

/// Cascading synchronization controller for one signed-in session.
///
/// Owns all client-side collection state; the embedding UI dispatches
/// [`Message`]s through [`update`](Self::update) and drives completions with
/// [`process_next`](Self::process_next) or [`settle`](Self::settle). Must be
/// driven from within a tokio runtime, since fetches are spawned tasks.
pub struct Controller {
    remote: Arc<dyn RemoteSource>,
    config: ControllerConfig,
    selection: Selection,
    filter: StatusFilter,
    projects: LevelState<Project>,
    tasks: LevelState<Task>,
    comments: LevelState<Comment>,
    action_error: Option<ActionError>,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    /// Spawned fetches that have not reported back yet (stale ones included)
    in_flight: usize,
}

impl Controller {
    pub fn new(remote: Arc<dyn RemoteSource>) -> Self {
        Self::with_config(remote, ControllerConfig::default())
    }

    pub fn with_config(remote: Arc<dyn RemoteSource>, config: ControllerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            remote,
            config,
            selection: Selection::default(),
            filter: StatusFilter::All,
            projects: LevelState::default(),
            tasks: LevelState::default(),
            comments: LevelState::default(),
            action_error: None,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Kick off the initial projects load. Call once per session start.
    pub fn start(&mut self) {
        self.update(Message::RefreshProjects);
    }

    // === Queries ===

    pub fn projects(&self) -> &[Project] {
        self.projects.items()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn comments(&self) -> &[Comment] {
        self.comments.items()
    }

    pub fn selected_project_id(&self) -> Option<Id> {
        self.selection.project_id()
    }

    pub fn selected_task_id(&self) -> Option<Id> {
        self.selection.task_id()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.selection.project_id()?;
        self.projects.items().iter().find(|p| p.id == id)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.selection.task_id()?;
        self.tasks.items().iter().find(|t| t.id == id)
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn load_phase(&self, level: Level) -> LoadPhase {
        match level {
            Level::Projects => self.projects.phase(),
            Level::Tasks => self.tasks.phase(),
            Level::Comments => self.comments.phase(),
        }
    }

    pub fn is_loading(&self, level: Level) -> bool {
        self.load_phase(level) == LoadPhase::Loading
    }

    pub fn load_error(&self, level: Level) -> Option<&str> {
        match level {
            Level::Projects => self.projects.error(),
            Level::Tasks => self.tasks.error(),
            Level::Comments => self.comments.error(),
        }
    }

    pub fn action_error(&self) -> Option<&ActionError> {
        self.action_error.as_ref()
    }

    pub fn task_counts(&self) -> TaskCounts {
        TaskCounts::tally(self.tasks.items())
    }

    /// True when no spawned request is outstanding
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    // === Driving ===

    /// Wait for the next completion message and apply it. Returns false when
    /// nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(msg) => {
                self.update(msg);
                true
            }
            None => false,
        }
    }

    /// Apply completion messages until the controller is quiescent
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    // === Update loop ===

    /// Apply a message: synchronous state transitions, plus spawning the
    /// fetches that a dependency-key change calls for.
    pub fn update(&mut self, msg: Message) {
        match msg {
            // --- Selection and filter ---
            Message::SelectProject(project_id) => {
                self.action_error = None;
                if !self.projects.contains(project_id) {
                    self.action_error =
                        Some(ActionError::Validation("project is not in the loaded project list"));
                    return;
                }
                self.selection.select_project(project_id);
                self.reload_tasks();
                self.reload_comments();
            }

            Message::SelectTask(task_id) => {
                self.action_error = None;
                if !self.tasks.contains(task_id) {
                    self.action_error =
                        Some(ActionError::Validation("task is not in the loaded task list"));
                    return;
                }
                self.selection.select_task(task_id);
                self.reload_comments();
            }

            Message::ClearProjectSelection => {
                self.action_error = None;
                self.selection.clear_project();
                self.reload_tasks();
                self.reload_comments();
            }

            Message::ClearTaskSelection => {
                self.action_error = None;
                self.selection.clear_task();
                self.reload_comments();
            }

            Message::SetStatusFilter(filter) => {
                self.action_error = None;
                self.filter = filter;
                // A filter change is a task-level key change: tasks restart,
                // and transitively comments; the project selection is kept
                self.reload_tasks();
                self.reload_comments();
            }

            Message::RefreshProjects => {
                self.action_error = None;
                self.reload_projects();
            }

            Message::Reset => {
                debug!("controller reset, superseding all in-flight work");
                // Bump every generation first so late completions land nowhere
                self.projects.reset_empty();
                self.tasks.reset_empty();
                self.comments.reset_empty();
                self.selection.clear_project();
                self.filter = StatusFilter::All;
                self.action_error = None;
            }

            // --- Mutations ---
            Message::CreateProject { name, description } => {
                self.action_error = None;
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.action_error =
                        Some(ActionError::Validation("project name is required"));
                    return;
                }
                let description = description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty());
                let generation = self.projects.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::ProjectCreated {
                        generation,
                        result: remote.create_project(name, description).await,
                    }
                });
            }

            Message::DeleteProject(project_id) => {
                self.action_error = None;
                let generation = self.projects.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::ProjectDeleted {
                        generation,
                        project_id,
                        result: remote.delete_project(project_id).await,
                    }
                });
            }

            Message::CreateTask(mut draft) => {
                self.action_error = None;
                let Some(project_id) = self.selection.project_id() else {
                    self.action_error =
                        Some(ActionError::Validation("no project selected"));
                    return;
                };
                draft.title = draft.title.trim().to_string();
                if draft.title.is_empty() {
                    self.action_error =
                        Some(ActionError::Validation("task title is required"));
                    return;
                }
                draft.details = draft.details.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
                draft.assignee_username = draft
                    .assignee_username
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty());
                let generation = self.tasks.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::TaskCreated {
                        generation,
                        result: remote.create_task(project_id, draft).await,
                    }
                });
            }

            Message::DeleteTask(task_id) => {
                self.action_error = None;
                let Some(project_id) = self.selection.project_id() else {
                    self.action_error =
                        Some(ActionError::Validation("no project selected"));
                    return;
                };
                let generation = self.tasks.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::TaskDeleted {
                        generation,
                        task_id,
                        result: remote.delete_task(project_id, task_id).await,
                    }
                });
            }

            Message::UpdateTaskStatus { task_id, status } => {
                self.action_error = None;
                let Some(project_id) = self.selection.project_id() else {
                    self.action_error =
                        Some(ActionError::Validation("no project selected"));
                    return;
                };
                let generation = self.tasks.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::TaskStatusUpdated {
                        generation,
                        result: remote.update_task_status(project_id, task_id, status).await,
                    }
                });
            }

            Message::CreateComment { body } => {
                self.action_error = None;
                let Some(task_id) = self.selection.task_id() else {
                    self.action_error = Some(ActionError::Validation("no task selected"));
                    return;
                };
                let body = body.trim().to_string();
                if body.is_empty() {
                    self.action_error =
                        Some(ActionError::Validation("comment body is required"));
                    return;
                }
                let generation = self.comments.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::CommentCreated {
                        generation,
                        result: remote.create_comment(task_id, body).await,
                    }
                });
            }

            Message::DeleteComment(comment_id) => {
                self.action_error = None;
                let Some(task_id) = self.selection.task_id() else {
                    self.action_error = Some(ActionError::Validation("no task selected"));
                    return;
                };
                let generation = self.comments.generation();
                let remote = Arc::clone(&self.remote);
                self.spawn_request(async move {
                    Message::CommentDeleted {
                        generation,
                        comment_id,
                        result: remote.delete_comment(task_id, comment_id).await,
                    }
                });
            }

            // --- Load results ---
            Message::ProjectsLoaded { generation, result } => {
                self.finish_request();
                match result {
                    Ok(page) => {
                        if self.projects.complete(generation, Ok(page.content)) {
                            self.apply_project_selection_policy();
                        } else {
                            debug!(generation, "stale projects load discarded");
                        }
                    }
                    Err(err) => {
                        if self.projects.complete(generation, Err(err.to_string())) {
                            warn!(level = "projects", error = %err, "load failed");
                        } else {
                            debug!(generation, "stale projects failure discarded");
                        }
                    }
                }
            }

            Message::TasksLoaded { generation, result } => {
                self.finish_request();
                match result {
                    Ok(page) => {
                        if self.tasks.complete(generation, Ok(page.content)) {
                            self.apply_task_selection_policy();
                        } else {
                            debug!(generation, "stale tasks load discarded");
                        }
                    }
                    Err(err) => {
                        if self.tasks.complete(generation, Err(err.to_string())) {
                            warn!(level = "tasks", error = %err, "load failed");
                        } else {
                            debug!(generation, "stale tasks failure discarded");
                        }
                    }
                }
            }

            Message::CommentsLoaded { generation, result } => {
                self.finish_request();
                match result {
                    Ok(page) => {
                        if !self.comments.complete(generation, Ok(page.content)) {
                            debug!(generation, "stale comments load discarded");
                        }
                    }
                    Err(err) => {
                        if self.comments.complete(generation, Err(err.to_string())) {
                            warn!(level = "comments", error = %err, "load failed");
                        } else {
                            debug!(generation, "stale comments failure discarded");
                        }
                    }
                }
            }

            // --- Mutation results ---
            Message::ProjectCreated { generation, result } => {
                self.finish_request();
                if generation != self.projects.generation() {
                    debug!(generation, "stale project-create result discarded");
                    return;
                }
                match result {
                    Ok(project) => {
                        reconciler::project_created(
                            self.projects.items_mut(),
                            &mut self.selection,
                            project,
                        );
                        // The new project is now selected; its (empty) task
                        // list still has to come from the server
                        self.reload_tasks();
                        self.reload_comments();
                    }
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::ProjectDeleted {
                generation,
                project_id,
                result,
            } => {
                self.finish_request();
                if generation != self.projects.generation() {
                    debug!(generation, "stale project-delete result discarded");
                    return;
                }
                match result {
                    Ok(()) => {
                        let cleared = reconciler::project_deleted(
                            self.projects.items_mut(),
                            &mut self.selection,
                            project_id,
                        );
                        if cleared {
                            self.reload_tasks();
                            self.reload_comments();
                        }
                    }
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::TaskCreated { generation, result } => {
                self.finish_request();
                if generation != self.tasks.generation() {
                    debug!(generation, "stale task-create result discarded");
                    return;
                }
                match result {
                    Ok(task) => {
                        reconciler::task_created(
                            self.tasks.items_mut(),
                            &mut self.selection,
                            task,
                        );
                        // Selection moved to the new task
                        self.reload_comments();
                    }
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::TaskDeleted {
                generation,
                task_id,
                result,
            } => {
                self.finish_request();
                if generation != self.tasks.generation() {
                    debug!(generation, "stale task-delete result discarded");
                    return;
                }
                match result {
                    Ok(()) => {
                        let cleared = reconciler::task_deleted(
                            self.tasks.items_mut(),
                            &mut self.selection,
                            task_id,
                        );
                        if cleared {
                            // Key change to null: comments empty, no fetch
                            self.reload_comments();
                        }
                    }
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::TaskStatusUpdated { generation, result } => {
                self.finish_request();
                if generation != self.tasks.generation() {
                    debug!(generation, "stale status-update result discarded");
                    return;
                }
                match result {
                    Ok(task) => reconciler::task_updated(self.tasks.items_mut(), task),
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::CommentCreated { generation, result } => {
                self.finish_request();
                if generation != self.comments.generation() {
                    debug!(generation, "stale comment-create result discarded");
                    return;
                }
                match result {
                    Ok(comment) => {
                        reconciler::comment_created(self.comments.items_mut(), comment)
                    }
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }

            Message::CommentDeleted {
                generation,
                comment_id,
                result,
            } => {
                self.finish_request();
                if generation != self.comments.generation() {
                    debug!(generation, "stale comment-delete result discarded");
                    return;
                }
                match result {
                    Ok(()) => reconciler::comment_deleted(self.comments.items_mut(), comment_id),
                    Err(err) => self.action_error = Some(ActionError::Remote(err.to_string())),
                }
            }
        }
    }

    // === Load cycles ===

    fn reload_projects(&mut self) {
        let generation = self.projects.begin_load();
        debug!(generation, "loading projects");
        let remote = Arc::clone(&self.remote);
        let page = PageRequest::first(self.config.project_page_size);
        self.spawn_request(async move {
            Message::ProjectsLoaded {
                generation,
                result: remote.list_projects(page).await,
            }
        });
    }

    fn reload_tasks(&mut self) {
        let Some(project_id) = self.selection.project_id() else {
            // Gating key is null: settle on empty without network access
            self.tasks.reset_empty();
            return;
        };
        let generation = self.tasks.begin_load();
        debug!(generation, project_id, "loading tasks");
        let remote = Arc::clone(&self.remote);
        let filter = self.filter;
        let page = PageRequest::first(self.config.task_page_size);
        self.spawn_request(async move {
            Message::TasksLoaded {
                generation,
                result: remote.list_tasks(project_id, filter, page).await,
            }
        });
    }

    fn reload_comments(&mut self) {
        let Some(task_id) = self.selection.task_id() else {
            self.comments.reset_empty();
            return;
        };
        let generation = self.comments.begin_load();
        debug!(generation, task_id, "loading comments");
        let remote = Arc::clone(&self.remote);
        let page = PageRequest::first(self.config.comment_page_size);
        self.spawn_request(async move {
            Message::CommentsLoaded {
                generation,
                result: remote.list_comments(task_id, page).await,
            }
        });
    }

    /// Default-selection policy after a fresh projects load: keep the current
    /// selection when it survived, otherwise fall back to the first project in
    /// server order (or none when empty). A change cascades downstream.
    fn apply_project_selection_policy(&mut self) {
        let current = self.selection.project_id();
        let desired = match current {
            Some(id) if self.projects.contains(id) => Some(id),
            _ => self.projects.first_id(),
        };
        if desired == current {
            return;
        }
        match desired {
            Some(id) => {
                debug!(project_id = id, "project selected after fresh load");
                self.selection.select_project(id);
            }
            None => self.selection.clear_project(),
        }
        self.reload_tasks();
        self.reload_comments();
    }

    /// Same policy one level down, applied only on fresh task loads — never
    /// as a side effect of a mutation-driven update
    fn apply_task_selection_policy(&mut self) {
        let current = self.selection.task_id();
        let desired = match current {
            Some(id) if self.tasks.contains(id) => Some(id),
            _ => self.tasks.first_id(),
        };
        if desired == current {
            return;
        }
        match desired {
            Some(id) => {
                debug!(task_id = id, "task selected after fresh load");
                self.selection.select_task(id);
            }
            None => self.selection.clear_task(),
        }
        self.reload_comments();
    }

    // === Plumbing ===

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // The receiver only closes when the controller is dropped, at
            // which point losing the completion is intended
            let _ = tx.send(request.await);
        });
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

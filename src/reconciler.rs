//! Applies confirmed write results to the in-memory collections without a
//! full reload, and keeps the selection consistent when the selected entity
//! disappears.
//!
//! All helpers are pure over `(collection, selection)`. Cascading the
//! consequences of a selection change (restarting downstream load cycles) is
//! the controller's job; helpers that can change the selection return whether
//! they did.

use tracing::debug;

use crate::model::{Comment, Id, Project, Task};
use crate::selection::Selection;

/// Prepend a newly created project (newest first) and select it
pub fn project_created(projects: &mut Vec<Project>, selection: &mut Selection, project: Project) {
    debug!(project_id = project.id, "project created");
    selection.select_project(project.id);
    projects.insert(0, project);
}

/// Remove a deleted project by id. Returns true when the selection pointed at
/// the removed project and was cleared (downstream levels must reset).
pub fn project_deleted(
    projects: &mut Vec<Project>,
    selection: &mut Selection,
    project_id: Id,
) -> bool {
    projects.retain(|p| p.id != project_id);
    if selection.project_id() == Some(project_id) {
        debug!(project_id, "deleted project was selected, clearing selection");
        selection.clear_project();
        true
    } else {
        false
    }
}

/// Prepend a newly created task (newest first) and select it.
///
/// The task is inserted even when its status does not match the active
/// filter; the next filtered reload will drop it. See DESIGN.md.
pub fn task_created(tasks: &mut Vec<Task>, selection: &mut Selection, task: Task) {
    debug!(task_id = task.id, "task created");
    selection.select_task(task.id);
    tasks.insert(0, task);
}

/// Remove a deleted task by id. Returns true when the selection pointed at
/// the removed task and was cleared.
pub fn task_deleted(tasks: &mut Vec<Task>, selection: &mut Selection, task_id: Id) -> bool {
    tasks.retain(|t| t.id != task_id);
    if selection.task_id() == Some(task_id) {
        debug!(task_id, "deleted task was selected, clearing selection");
        selection.clear_task();
        true
    } else {
        false
    }
}

/// Replace a task with the server-returned version. The server is the source
/// of truth for derived fields such as the update timestamp, so this is a
/// wholesale replacement, not a local patch. Selection is untouched: the id
/// is unchanged, only the content is refreshed.
pub fn task_updated(tasks: &mut [Task], task: Task) {
    if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
        *slot = task;
    }
}

/// Append a newly created comment (conversation order); no selection change
pub fn comment_created(comments: &mut Vec<Comment>, comment: Comment) {
    comments.push(comment);
}

/// Remove a deleted comment by id
pub fn comment_deleted(comments: &mut Vec<Comment>, comment_id: Id) {
    comments.retain(|c| c.id != comment_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    fn project(id: Id, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    fn task(id: Id, title: &str, status: TaskStatus) -> Task {
        Task {
            id,
            title: title.to_string(),
            details: None,
            status,
            assignee: None,
            due_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn comment(id: Id, body: &str) -> Comment {
        Comment {
            id,
            body: body.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_project_created_prepends_and_selects() {
        let mut projects = vec![project(1, "old")];
        let mut selection = Selection::default();
        selection.select_project(1);
        selection.select_task(10);

        project_created(&mut projects, &mut selection, project(2, "new"));

        assert_eq!(projects[0].id, 2);
        assert_eq!(selection.project_id(), Some(2));
        // Selecting the new project invalidates the old task selection
        assert_eq!(selection.task_id(), None);
    }

    #[test]
    fn test_project_deleted_clears_selection_only_when_selected() {
        let mut projects = vec![project(1, "a"), project(2, "b")];
        let mut selection = Selection::default();
        selection.select_project(2);

        assert!(!project_deleted(&mut projects, &mut selection, 1));
        assert_eq!(selection.project_id(), Some(2));
        assert_eq!(projects.len(), 1);

        assert!(project_deleted(&mut projects, &mut selection, 2));
        assert_eq!(selection.project_id(), None);
        assert!(projects.is_empty());
    }

    #[test]
    fn test_task_created_prepends_and_selects() {
        let mut tasks = vec![task(1, "old", TaskStatus::Todo)];
        let mut selection = Selection::default();
        selection.select_project(1);

        task_created(&mut tasks, &mut selection, task(2, "new", TaskStatus::Done));

        assert_eq!(tasks[0].id, 2);
        assert_eq!(selection.task_id(), Some(2));
        assert_eq!(selection.project_id(), Some(1));
    }

    #[test]
    fn test_task_deleted_keeps_unrelated_selection() {
        let mut tasks = vec![task(1, "a", TaskStatus::Todo), task(2, "b", TaskStatus::Todo)];
        let mut selection = Selection::default();
        selection.select_project(1);
        selection.select_task(1);

        assert!(!task_deleted(&mut tasks, &mut selection, 2));
        assert_eq!(selection.task_id(), Some(1));

        assert!(task_deleted(&mut tasks, &mut selection, 1));
        assert_eq!(selection.task_id(), None);
        assert_eq!(selection.project_id(), Some(1));
    }

    #[test]
    fn test_task_updated_replaces_server_version() {
        let mut tasks = vec![task(1, "a", TaskStatus::Todo)];
        let mut updated = task(1, "a", TaskStatus::Done);
        updated.updated_at = Some(chrono::Utc::now());

        task_updated(&mut tasks, updated.clone());

        assert_eq!(tasks[0], updated);
        assert!(tasks[0].updated_at.is_some());
    }

    #[test]
    fn test_task_updated_ignores_unknown_id() {
        let mut tasks = vec![task(1, "a", TaskStatus::Todo)];
        task_updated(&mut tasks, task(99, "ghost", TaskStatus::Done));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Todo);
    }

    #[test]
    fn test_comment_append_and_delete() {
        let mut comments = vec![comment(1, "first")];
        comment_created(&mut comments, comment(2, "second"));
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].id, 2);

        comment_deleted(&mut comments, 1);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, 2);
    }
}

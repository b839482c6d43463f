//! Client-side synchronization controller for a task-tracking service.
//!
//! Keeps three dependent collections (projects → tasks → comments) and their
//! selection cursors consistent while loads race against user navigation and
//! mutations. Fetches are never cancelled; each level runs generation-counted
//! load cycles and superseded results are discarded at resolution time.
//!
//! Rendering, transport and credential handling live outside this crate: the
//! embedding UI dispatches [`Message`]s into a [`Controller`] built over any
//! [`RemoteSource`] implementation and reads state back through its query
//! methods.

pub mod config;
pub mod controller;
pub mod loader;
pub mod message;
pub mod model;
pub mod reconciler;
pub mod remote;
pub mod selection;

pub use config::ControllerConfig;
pub use controller::{ActionError, Controller};
pub use loader::{Level, LoadPhase};
pub use message::Message;
pub use model::{
    Assignee, Comment, Id, Page, Project, StatusFilter, Task, TaskCounts, TaskStatus,
};
pub use remote::{
    InMemoryRemote, NewTask, PageRequest, RemoteError, RemoteResult, RemoteSource,
};
pub use selection::Selection;

//! Per-level load-cycle state.
//!
//! Each collection level runs independent load cycles identified by a
//! monotonically increasing generation. A fetch captures the generation it
//! was started under; by the time it resolves, a newer generation means the
//! cycle was superseded and the result (success or failure) is dropped.

use crate::model::Id;

/// One of the three dependent collection levels, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Projects,
    Tasks,
    Comments,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Projects => "projects",
            Level::Tasks => "tasks",
            Level::Comments => "comments",
        }
    }

    /// Levels strictly below this one in the hierarchy
    pub fn downstream(&self) -> &'static [Level] {
        match self {
            Level::Projects => &[Level::Tasks, Level::Comments],
            Level::Tasks => &[Level::Comments],
            Level::Comments => &[],
        }
    }
}

/// Load cycle phase: `Idle → Loading → {Ready, Failed}`; any key change
/// returns to `Loading` (or `Idle` when the gating key is null).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Collection contents plus load-cycle bookkeeping for one level
#[derive(Debug)]
pub struct LevelState<T> {
    items: Vec<T>,
    phase: LoadPhase,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for LevelState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: LoadPhase::default(),
            error: None,
            generation: 0,
        }
    }
}

impl<T> LevelState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access for the mutation reconciler only; load results go
    /// through [`complete`](Self::complete) so the staleness check applies.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new load cycle: supersedes any in-flight request and returns
    /// the generation token the new fetch must carry back.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.phase = LoadPhase::Loading;
        self.generation
    }

    /// Supersede any in-flight request and settle on an empty collection
    /// without network access (the gating key is null, or teardown).
    pub fn reset_empty(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.phase = LoadPhase::Idle;
        self.error = None;
    }

    /// Resolve a load cycle. Returns false when `generation` no longer
    /// matches, in which case nothing changes: the result is stale.
    ///
    /// Success replaces the items wholesale in server order and clears any
    /// error; failure keeps the previous items and records the message.
    pub fn complete(&mut self, generation: u64, result: Result<Vec<T>, String>) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.phase = LoadPhase::Ready;
                self.error = None;
            }
            Err(message) => {
                self.phase = LoadPhase::Failed;
                self.error = Some(message);
            }
        }
        true
    }
}

impl<T: HasId> LevelState<T> {
    pub fn contains(&self, id: Id) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn first_id(&self) -> Option<Id> {
        self.items.first().map(|item| item.id())
    }
}

/// Identity accessor shared by all three entity types
pub trait HasId {
    fn id(&self) -> Id;
}

impl HasId for crate::model::Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl HasId for crate::model::Task {
    fn id(&self) -> Id {
        self.id
    }
}

impl HasId for crate::model::Comment {
    fn id(&self) -> Id {
        self.id
    }
}

//! In-memory todo store
//!
//! The `Store` holds the local snapshot of the remote collection together
//! with the query status flags (`loading`, `error`). It performs no I/O;
//! only the sync engine writes to it.
//!
//! ## Consistency
//!
//! State lives behind a `tokio::sync::watch` channel. Every write is a single
//! `send_modify` (or `send_if_modified`) call, so readers always see the
//! result of a completed write and subscribers are woken once per write.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Arc::new(Store::new());
//! let mut changes = store.subscribe();
//!
//! store.upsert(todo);
//! changes.changed().await?;
//! let todos = store.get_all();
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

use crate::models::{PendingTodo, Todo, TodoId};

/// A full snapshot of the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Confirmed records, in server order
    pub todos: Vec<Todo>,
    /// Optimistic creates still waiting for a server id
    pub pending: Vec<PendingTodo>,
    /// A fetch is in flight
    pub loading: bool,
    /// Last fetch failure, cleared by the next successful fetch
    pub error: Option<String>,
    /// When the last successful fetch completed
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StoreState {
    fn position(&self, id: TodoId) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }
}

/// Authoritative local copy of the todo collection
pub struct Store {
    state: watch::Sender<StoreState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { state }
    }

    /// Subscribe to changes
    ///
    /// The receiver is notified once for every completed write.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Get a copy of the whole state
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    // ==================== Reads ====================

    /// Get all confirmed todos in server order
    pub fn get_all(&self) -> Vec<Todo> {
        self.state.borrow().todos.clone()
    }

    /// Get a todo by id
    pub fn get(&self, id: TodoId) -> Option<Todo> {
        self.state.borrow().todos.iter().find(|t| t.id == id).cloned()
    }

    /// Number of confirmed todos
    pub fn len(&self) -> usize {
        self.state.borrow().todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Optimistic creates that have not been confirmed yet
    pub fn pending(&self) -> Vec<PendingTodo> {
        self.state.borrow().pending.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().fetched_at
    }

    // ==================== Record writes ====================

    /// Replace the whole collection
    ///
    /// Duplicate ids in the input are collapsed: the record keeps the
    /// position of its first occurrence and the value of its last.
    pub fn replace_all(&self, todos: Vec<Todo>) {
        let todos = dedup_by_id(todos);
        self.state.send_modify(|state| state.todos = todos);
    }

    /// Insert a record, or replace the one with the same id in place
    ///
    /// Returns `true` if the record was inserted.
    pub fn upsert(&self, todo: Todo) -> bool {
        let mut inserted = false;
        self.state.send_modify(|state| {
            inserted = upsert_into(state, todo);
        });
        inserted
    }

    /// Replace a record only if it is still present
    ///
    /// Used to roll back an optimistic update without resurrecting a record
    /// that was removed in the meantime.
    pub fn replace_existing(&self, todo: Todo) -> bool {
        self.state.send_if_modified(|state| match state.position(todo.id) {
            Some(index) => {
                state.todos[index] = todo;
                true
            }
            None => false,
        })
    }

    /// Remove a record by id; absent ids are a no-op
    pub fn remove_by_id(&self, id: TodoId) -> Option<Todo> {
        let mut removed = None;
        self.state.send_if_modified(|state| {
            removed = state.position(id).map(|index| state.todos.remove(index));
            removed.is_some()
        });
        removed
    }

    // ==================== Status writes ====================

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.send_if_modified(|state| {
            let changed = state.error != error;
            state.error = error;
            changed
        });
    }

    /// Mark a fetch as started: clears the error and raises `loading`
    pub fn begin_fetch(&self) {
        self.state.send_modify(|state| {
            state.error = None;
            state.loading = true;
        });
    }

    /// Complete a fetch in one write
    ///
    /// On success the collection is replaced and the error cleared. On
    /// failure the collection is left as it was and the error recorded.
    pub fn finish_fetch(&self, result: Result<Vec<Todo>, String>) {
        match result {
            Ok(todos) => {
                let todos = dedup_by_id(todos);
                let now = Utc::now();
                self.state.send_modify(|state| {
                    state.todos = todos;
                    state.loading = false;
                    state.error = None;
                    state.fetched_at = Some(now);
                });
            }
            Err(message) => {
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
            }
        }
    }

    // ==================== Provisional records ====================

    /// Show an optimistic create before the server confirms it
    pub fn insert_pending(&self, pending: PendingTodo) {
        self.state.send_modify(|state| state.pending.push(pending));
    }

    /// Swap a provisional record for the confirmed server record
    pub fn confirm_pending(&self, local_id: Uuid, todo: Todo) {
        self.state.send_modify(|state| {
            state.pending.retain(|p| p.local_id != local_id);
            upsert_into(state, todo);
        });
    }

    /// Drop a provisional record after a failed create
    pub fn discard_pending(&self, local_id: Uuid) -> bool {
        self.state.send_if_modified(|state| {
            let before = state.pending.len();
            state.pending.retain(|p| p.local_id != local_id);
            state.pending.len() != before
        })
    }
}

fn upsert_into(state: &mut StoreState, todo: Todo) -> bool {
    match state.position(todo.id) {
        Some(index) => {
            state.todos[index] = todo;
            false
        }
        None => {
            state.todos.push(todo);
            true
        }
    }
}

fn dedup_by_id(todos: Vec<Todo>) -> Vec<Todo> {
    let mut seen: HashMap<TodoId, usize> = HashMap::with_capacity(todos.len());
    let mut unique: Vec<Todo> = Vec::with_capacity(todos.len());

    for todo in todos {
        match seen.get(&todo.id) {
            Some(&index) => {
                warn!(id = todo.id, "Duplicate todo id in server response");
                unique[index] = todo;
            }
            None => {
                seen.insert(todo.id, unique.len());
                unique.push(todo);
            }
        }
    }

    unique
}

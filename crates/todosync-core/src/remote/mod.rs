//! Remote collection
//!
//! The REST resource the store is kept in sync with. The engine only talks
//! to it through the `RemoteCollection` trait; `HttpRemote` is the
//! reqwest-backed implementation used in production.
//!
//! ## Endpoints
//!
//! - `GET /todos` - ordered list of todos
//! - `POST /todos` - create, server assigns the id
//! - `PUT /todos/{id}` - update, returns the updated record
//! - `DELETE /todos/{id}` - remove
//! - `GET /categories` - read-only category list

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteResult;
use crate::models::{Category, Todo, TodoDraft, TodoId};

pub use http::{HttpRemote, DEFAULT_TIMEOUT_SECS};

/// Operations the sync engine needs from the server
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Fetch every todo in server order
    async fn list_todos(&self) -> RemoteResult<Vec<Todo>>;

    /// Create a todo and return it with its server-assigned id
    async fn create_todo(&self, draft: &TodoDraft) -> RemoteResult<Todo>;

    /// Update a todo
    ///
    /// Returns `None` when the server acknowledged the update without
    /// sending back a complete record.
    async fn update_todo(&self, id: TodoId, body: &Value) -> RemoteResult<Option<Todo>>;

    /// Delete a todo
    async fn delete_todo(&self, id: TodoId) -> RemoteResult<()>;

    /// Fetch the category reference list
    async fn list_categories(&self) -> RemoteResult<Vec<Category>>;
}

//! todosync Core Library
//!
//! This crate keeps a client-side list of todos consistent with a remote
//! REST collection.
//!
//! # Architecture
//!
//! - **Store**: the local snapshot plus `loading`/`error` query status
//! - **SyncEngine**: fetch-all, create, update and remove against the remote
//! - **RemoteCollection**: the REST resource (`HttpRemote` in production)
//! - **views**: filtering, pagination and stats over a snapshot
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let remote = Arc::new(HttpRemote::with_timeout(&config.base_url, config.request_timeout())?);
//! let store = Arc::new(Store::new());
//! let engine = SyncEngine::new(remote, store.clone()).with_options(config.sync_options());
//!
//! engine.fetch_all().await?;
//! engine.create(TodoDraft::new("buy milk", "home")).await?;
//!
//! let todos = store.get_all();
//! ```
//!
//! # Modules
//!
//! - `store`: in-memory snapshot (main read interface)
//! - `engine`: sync operations (main write interface)
//! - `remote`: remote collection trait and HTTP client
//! - `models`: todo, draft, patch and category types
//! - `cache`: tag-based invalidation of the snapshot
//! - `views`: derived views for display
//! - `config`: application configuration

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod remote;
pub mod store;
pub mod views;

pub use cache::CacheTag;
pub use config::Config;
pub use engine::{RemoveOutcome, SyncEngine, SyncOptions, WritePolicy};
pub use error::{CommandError, RemoteError, ValidationError};
pub use models::{Category, PendingTodo, RecordKey, Todo, TodoDraft, TodoId, TodoPatch};
pub use remote::{HttpRemote, RemoteCollection};
pub use store::{Store, StoreState};

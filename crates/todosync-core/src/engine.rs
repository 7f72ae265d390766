//! Sync engine
//!
//! Moves data between the `Store` and a `RemoteCollection`. Every operation
//! follows the same shape: optional local effect, one remote call, then
//! reconcile the response into the store.
//!
//! - `fetch_all` is a query: its failure is recorded in the store's error
//!   slot and the previous collection stays visible.
//! - `create`, `update` and `remove` are commands: their failures are only
//!   returned to the caller and never touch the store's error slot.
//!
//! Operations are not queued. Two updates to the same id race and the
//! response that arrives last wins; a fetch issued while a command is in
//! flight may overwrite the command's effect with an older snapshot.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheTag, TagCache};
use crate::error::{CommandResult, RemoteResult};
use crate::models::{Category, PendingTodo, Todo, TodoDraft, TodoId, TodoPatch};
use crate::remote::RemoteCollection;
use crate::store::Store;

/// When local state changes relative to the network call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Apply the server's response only (default)
    #[default]
    Pessimistic,
    /// Show creates and updates immediately, roll back on failure
    Optimistic,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pessimistic" => Ok(WritePolicy::Pessimistic),
            "optimistic" => Ok(WritePolicy::Optimistic),
            other => Err(format!(
                "Unknown write policy '{}'. Use 'pessimistic' or 'optimistic'.",
                other
            )),
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WritePolicy::Pessimistic => "pessimistic",
            WritePolicy::Optimistic => "optimistic",
        })
    }
}

/// Engine behaviour switches
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub write_policy: WritePolicy,
    /// Refetch the list after every successful mutation
    pub refetch_on_invalidate: bool,
    /// Snapshots older than this count as stale
    pub max_age: Option<Duration>,
}

/// Result of a successful `remove`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The server deleted the record
    Removed,
    /// The server no longer had the record (404); the local copy was dropped
    AlreadyGone,
}

/// Reconciles the store with the remote collection
pub struct SyncEngine {
    remote: Arc<dyn RemoteCollection>,
    store: Arc<Store>,
    tags: Mutex<TagCache>,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteCollection>, store: Arc<Store>) -> Self {
        Self {
            remote,
            store,
            tags: Mutex::new(TagCache::new()),
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    fn tags(&self) -> MutexGuard<'_, TagCache> {
        self.tags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Query ====================

    /// Replace the store's collection with the server's
    ///
    /// Returns the number of records fetched. On failure the error is also
    /// recorded in the store and the previous collection is kept.
    pub async fn fetch_all(&self) -> RemoteResult<usize> {
        debug!("Fetching todos");
        self.store.begin_fetch();

        match self.remote.list_todos().await {
            Ok(todos) => {
                let count = todos.len();
                self.tags().provide(&todos);
                self.store.finish_fetch(Ok(todos));
                info!(count, "Fetched todos");
                Ok(count)
            }
            Err(e) => {
                warn!("Fetch failed: {}", e);
                self.store.finish_fetch(Err(e.to_string()));
                Err(e)
            }
        }
    }

    /// Fetch the category reference list
    ///
    /// Categories are not held by the store; the caller keeps them.
    pub async fn fetch_categories(&self) -> RemoteResult<Vec<Category>> {
        let categories = self.remote.list_categories().await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    /// Whether the snapshot should be refetched
    ///
    /// True before the first successful fetch, after a mutation invalidated
    /// part of the snapshot, or once it is older than `max_age`.
    pub fn is_stale(&self) -> bool {
        let Some(fetched_at) = self.store.fetched_at() else {
            return true;
        };

        if self.tags().has_invalidated() {
            return true;
        }

        match self.options.max_age {
            Some(max_age) => (Utc::now() - fetched_at)
                .to_std()
                .map(|age| age > max_age)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Run `fetch_all` only if the snapshot is stale
    ///
    /// Returns `true` if a fetch was performed.
    pub async fn refresh_if_stale(&self) -> RemoteResult<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.fetch_all().await?;
        Ok(true)
    }

    /// Mark part of the snapshot as out of date
    pub fn invalidate(&self, tag: CacheTag) {
        self.tags().invalidate(tag);
    }

    // ==================== Commands ====================

    /// Create a todo
    ///
    /// The draft is validated first; an invalid draft never reaches the
    /// network. The stored record always carries the server-assigned id.
    pub async fn create(&self, draft: TodoDraft) -> CommandResult<Todo> {
        draft.validate()?;

        let provisional = match self.options.write_policy {
            WritePolicy::Optimistic => {
                let pending = PendingTodo::new(draft.clone());
                let local_id = pending.local_id;
                self.store.insert_pending(pending);
                Some(local_id)
            }
            WritePolicy::Pessimistic => None,
        };

        debug!(text = %draft.text, "Creating todo");
        match self.remote.create_todo(&draft).await {
            Ok(todo) => {
                match provisional {
                    Some(local_id) => self.store.confirm_pending(local_id, todo.clone()),
                    None => {
                        self.store.upsert(todo.clone());
                    }
                }
                info!(id = todo.id, "Created todo");
                self.after_mutation(CacheTag::List).await;
                Ok(todo)
            }
            Err(e) => {
                if let Some(local_id) = provisional {
                    self.store.discard_pending(local_id);
                }
                warn!("Create failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Update some fields of a todo
    ///
    /// The request carries the locally merged record when the id is known,
    /// otherwise just the patched fields. The stored result is the server's
    /// record, or the merged record if the server did not send one back.
    ///
    /// Returns `None` when the update succeeded but neither the server nor
    /// the store had a complete record to show; the list is invalidated so
    /// the next refresh picks it up.
    pub async fn update(&self, patch: TodoPatch) -> CommandResult<Option<Todo>> {
        patch.validate()?;

        let id = patch.id;
        let previous = self.store.get(id);
        let merged = previous.as_ref().map(|todo| patch.apply_to(todo));
        let body = match previous {
            Some(ref todo) => patch.merged_body(todo),
            None => patch.to_body(),
        };

        let optimistic = self.options.write_policy == WritePolicy::Optimistic;
        if optimistic {
            if let Some(ref record) = merged {
                self.store.upsert(record.clone());
            }
        }

        debug!(id, "Updating todo");
        match self.remote.update_todo(id, &body).await {
            Ok(returned) => {
                let Some(record) = returned.or(merged) else {
                    warn!(id, "Update acknowledged without a record for an unknown todo");
                    self.after_mutation(CacheTag::List).await;
                    return Ok(None);
                };
                self.store.upsert(record.clone());
                info!(id, "Updated todo");
                self.after_mutation(CacheTag::Todo(id)).await;
                Ok(Some(record))
            }
            Err(e) => {
                if optimistic {
                    if let Some(previous) = previous {
                        self.store.replace_existing(previous);
                    }
                }
                warn!(id, "Update failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Delete a todo
    ///
    /// The remote call is made even if the id is not in the store. A 404
    /// from the server means the record is already gone, which is reported
    /// as `RemoveOutcome::AlreadyGone` rather than an error.
    pub async fn remove(&self, id: TodoId) -> CommandResult<RemoveOutcome> {
        debug!(id, "Removing todo");
        let outcome = match self.remote.delete_todo(id).await {
            Ok(()) => RemoveOutcome::Removed,
            Err(e) if e.is_not_found() => {
                info!(id, "Todo already removed on server");
                RemoveOutcome::AlreadyGone
            }
            Err(e) => {
                warn!(id, "Remove failed: {}", e);
                return Err(e.into());
            }
        };

        self.store.remove_by_id(id);
        if outcome == RemoveOutcome::Removed {
            info!(id, "Removed todo");
        }
        self.after_mutation(CacheTag::Todo(id)).await;
        Ok(outcome)
    }

    async fn after_mutation(&self, tag: CacheTag) {
        self.tags().invalidate(tag);

        if self.options.refetch_on_invalidate {
            // A failed refetch lands in the store's error slot; the command
            // itself already succeeded.
            if let Err(e) = self.fetch_all().await {
                debug!("Refetch after mutation failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CommandError, RemoteError, ValidationError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-process stand-in for the REST collection
    struct FakeRemote {
        todos: Mutex<Vec<Todo>>,
        next_id: AtomicI64,
        calls: AtomicUsize,
        list_calls: AtomicUsize,
        failure: Mutex<Option<RemoteError>>,
        bare_update_responses: bool,
    }

    impl FakeRemote {
        fn with(todos: Vec<Todo>) -> Self {
            Self {
                todos: Mutex::new(todos),
                next_id: AtomicI64::new(100),
                calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
                failure: Mutex::new(None),
                bare_update_responses: false,
            }
        }

        fn fail_with(&self, error: RemoteError) {
            *self.failure.lock().unwrap() = Some(error);
        }

        fn recover(&self) {
            *self.failure.lock().unwrap() = None;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn server_todos(&self) -> Vec<Todo> {
            self.todos.lock().unwrap().clone()
        }

        fn begin_call(&self) -> RemoteResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failure.lock().unwrap().clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    fn not_found() -> RemoteError {
        RemoteError::Status {
            status: 404,
            body: "Not Found".to_string(),
        }
    }

    #[async_trait]
    impl RemoteCollection for FakeRemote {
        async fn list_todos(&self) -> RemoteResult<Vec<Todo>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.begin_call()?;
            Ok(self.server_todos())
        }

        async fn create_todo(&self, draft: &TodoDraft) -> RemoteResult<Todo> {
            self.begin_call()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let todo = draft.clone().into_todo(id);
            self.todos.lock().unwrap().push(todo.clone());
            Ok(todo)
        }

        async fn update_todo(&self, id: TodoId, body: &Value) -> RemoteResult<Option<Todo>> {
            self.begin_call()?;
            let mut todos = self.todos.lock().unwrap();
            let existing = todos.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;

            let mut merged = serde_json::to_value(&*existing).unwrap();
            for (key, value) in body.as_object().unwrap() {
                merged[key] = value.clone();
            }
            *existing = serde_json::from_value(merged).unwrap();

            if self.bare_update_responses {
                Ok(None)
            } else {
                Ok(Some(existing.clone()))
            }
        }

        async fn delete_todo(&self, id: TodoId) -> RemoteResult<()> {
            self.begin_call()?;
            let mut todos = self.todos.lock().unwrap();
            let index = todos.iter().position(|t| t.id == id).ok_or_else(not_found)?;
            todos.remove(index);
            Ok(())
        }

        async fn list_categories(&self) -> RemoteResult<Vec<Category>> {
            self.begin_call()?;
            Ok(vec![Category::new("c1", "Home"), Category::new("c2", "Work")])
        }
    }

    fn milk() -> Todo {
        Todo::new(1, "buy milk", "c1")
    }

    fn setup(todos: Vec<Todo>) -> (Arc<FakeRemote>, SyncEngine) {
        setup_with(FakeRemote::with(todos), SyncOptions::default())
    }

    fn setup_with(remote: FakeRemote, options: SyncOptions) -> (Arc<FakeRemote>, SyncEngine) {
        let remote = Arc::new(remote);
        let engine = SyncEngine::new(remote.clone(), Arc::new(Store::new())).with_options(options);
        (remote, engine)
    }

    fn optimistic() -> SyncOptions {
        SyncOptions {
            write_policy: WritePolicy::Optimistic,
            ..SyncOptions::default()
        }
    }

    #[test]
    fn test_write_policy_from_str() {
        assert_eq!(
            "optimistic".parse::<WritePolicy>().unwrap(),
            WritePolicy::Optimistic
        );
        assert_eq!(
            "Pessimistic".parse::<WritePolicy>().unwrap(),
            WritePolicy::Pessimistic
        );
        assert!("eager".parse::<WritePolicy>().is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_populates_store() {
        let (_, engine) = setup(vec![milk()]);

        let count = engine.fetch_all().await.unwrap();
        assert_eq!(count, 1);

        let store = engine.store();
        assert!(!store.is_loading());
        assert!(store.error().is_none());
        assert_eq!(store.get_all(), vec![milk()]);
    }

    /// Holds `list_todos` open until the test releases it
    struct GatedRemote {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RemoteCollection for GatedRemote {
        async fn list_todos(&self) -> RemoteResult<Vec<Todo>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![milk()])
        }

        async fn create_todo(&self, _draft: &TodoDraft) -> RemoteResult<Todo> {
            Err(RemoteError::Request("not used".to_string()))
        }

        async fn update_todo(&self, _id: TodoId, _body: &Value) -> RemoteResult<Option<Todo>> {
            Err(RemoteError::Request("not used".to_string()))
        }

        async fn delete_todo(&self, _id: TodoId) -> RemoteResult<()> {
            Err(RemoteError::Request("not used".to_string()))
        }

        async fn list_categories(&self) -> RemoteResult<Vec<Category>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_fetch_all_is_loading_while_in_flight() {
        let remote = Arc::new(GatedRemote {
            started: Notify::new(),
            release: Notify::new(),
        });
        let engine = SyncEngine::new(remote.clone(), Arc::new(Store::new()));
        assert!(!engine.store().is_loading());

        let (fetched, ()) = tokio::join!(engine.fetch_all(), async {
            remote.started.notified().await;
            assert!(engine.store().is_loading());
            assert!(engine.store().is_empty());
            remote.release.notify_one();
        });

        assert_eq!(fetched.unwrap(), 1);
        assert!(!engine.store().is_loading());
        assert_eq!(engine.store().get_all(), vec![milk()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error_and_keeps_data() {
        let (remote, engine) = setup(vec![milk()]);
        engine.fetch_all().await.unwrap();

        remote.fail_with(RemoteError::Request("network down".to_string()));
        assert!(engine.fetch_all().await.is_err());

        let store = engine.store();
        assert!(!store.is_loading());
        assert_eq!(store.error().as_deref(), Some("Request failed: network down"));
        assert_eq!(store.get_all(), vec![milk()]);

        remote.recover();
        engine.fetch_all().await.unwrap();
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn test_first_fetch_failure_leaves_store_empty() {
        let (remote, engine) = setup(vec![milk()]);
        remote.fail_with(RemoteError::Request("offline".to_string()));

        assert!(engine.fetch_all().await.is_err());
        assert!(engine.store().is_empty());
        assert!(engine.store().error().is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_text_without_network() {
        let (remote, engine) = setup(vec![]);

        let err = engine.create(TodoDraft::new("", "c1")).await.unwrap_err();
        assert_eq!(err, CommandError::Validation(ValidationError::EmptyText));

        let err = engine.create(TodoDraft::new("x", " ")).await.unwrap_err();
        assert_eq!(err, CommandError::Validation(ValidationError::MissingCategory));

        assert_eq!(remote.calls(), 0);
        assert!(engine.store().is_empty());
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn test_create_uses_server_ids() {
        let (_, engine) = setup(vec![]);

        for text in ["one", "two", "three"] {
            engine.create(TodoDraft::new(text, "c1")).await.unwrap();
        }

        let ids: Vec<_> = engine.store().get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![100, 101, 102]);
    }

    #[tokio::test]
    async fn test_optimistic_create_replaces_provisional_record() {
        let (_, engine) = setup_with(FakeRemote::with(vec![]), optimistic());

        let todo = engine
            .create(TodoDraft::new("buy bread", "c1"))
            .await
            .unwrap();

        assert_eq!(todo.id, 100);
        assert!(engine.store().pending().is_empty());
        assert_eq!(engine.store().get_all(), vec![todo]);
    }

    #[tokio::test]
    async fn test_optimistic_create_rolls_back_on_failure() {
        let (remote, engine) = setup_with(FakeRemote::with(vec![]), optimistic());
        remote.fail_with(RemoteError::Status {
            status: 500,
            body: String::new(),
        });

        let err = engine
            .create(TodoDraft::new("buy bread", "c1"))
            .await
            .unwrap_err();
        assert!(!err.is_validation());
        assert!(engine.store().pending().is_empty());
        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_command_error_only() {
        let (remote, engine) = setup(vec![milk()]);
        engine.fetch_all().await.unwrap();
        remote.fail_with(RemoteError::Request("timeout".to_string()));

        assert!(engine.create(TodoDraft::new("x", "c1")).await.is_err());
        assert!(engine.store().error().is_none());
        assert!(!engine.store().is_loading());
        assert_eq!(engine.store().get_all(), vec![milk()]);
    }

    #[tokio::test]
    async fn test_update_marks_completed() {
        let (_, engine) = setup(vec![milk()]);
        engine.fetch_all().await.unwrap();

        engine
            .update(TodoPatch::new(1).completed(true))
            .await
            .unwrap();

        assert_eq!(
            engine.store().get_all(),
            vec![Todo::new(1, "buy milk", "c1").with_completed(true)]
        );
    }

    #[tokio::test]
    async fn test_update_changes_only_patched_fields() {
        let original = milk().with_description("2 litres");
        let patches = [
            TodoPatch::new(1).text("buy oat milk"),
            TodoPatch::new(1).category("c2"),
            TodoPatch::new(1).completed(true),
            TodoPatch::new(1).description(Some("1 litre".to_string())),
            TodoPatch::new(1).text("t").category("c3").completed(true),
        ];

        for patch in patches {
            let (_, engine) = setup(vec![original.clone()]);
            engine.fetch_all().await.unwrap();

            engine.update(patch.clone()).await.unwrap();
            let stored = engine.store().get(1).unwrap();
            assert_eq!(stored, patch.apply_to(&original));
        }
    }

    #[tokio::test]
    async fn test_update_keeps_merged_record_when_server_sends_none() {
        let remote = FakeRemote {
            bare_update_responses: true,
            ..FakeRemote::with(vec![milk()])
        };
        let (_, engine) = setup_with(remote, SyncOptions::default());
        engine.fetch_all().await.unwrap();

        let updated = engine
            .update(TodoPatch::new(1).text("buy cream"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.text, "buy cream");
        assert_eq!(engine.store().get(1).unwrap().text, "buy cream");
    }

    #[tokio::test]
    async fn test_update_failure_leaves_store_unchanged() {
        let (remote, engine) = setup(vec![milk()]);
        engine.fetch_all().await.unwrap();
        remote.fail_with(RemoteError::Status {
            status: 500,
            body: "boom".to_string(),
        });

        let err = engine
            .update(TodoPatch::new(1).completed(true))
            .await
            .unwrap_err();
        assert_eq!(err.remote().and_then(|e| e.status()), Some(500));
        assert_eq!(engine.store().get_all(), vec![milk()]);
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn test_optimistic_update_rolls_back() {
        let (remote, engine) = setup_with(FakeRemote::with(vec![milk()]), optimistic());
        engine.fetch_all().await.unwrap();
        remote.fail_with(RemoteError::Request("reset".to_string()));

        assert!(engine
            .update(TodoPatch::new(1).completed(true))
            .await
            .is_err());
        assert_eq!(engine.store().get(1).unwrap(), milk());
    }

    #[tokio::test]
    async fn test_update_unknown_id_still_calls_remote() {
        let (remote, engine) = setup(vec![]);

        let err = engine
            .update(TodoPatch::new(5).completed(true))
            .await
            .unwrap_err();
        assert!(err.remote().unwrap().is_not_found());
        assert_eq!(remote.calls(), 1);
        assert!(!engine.store().is_loading());
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch() {
        let (remote, engine) = setup(vec![milk()]);

        let err = engine.update(TodoPatch::new(1)).await.unwrap_err();
        assert_eq!(err, CommandError::Validation(ValidationError::EmptyPatch));
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_remove_then_remove_again() {
        let (remote, engine) = setup(vec![milk(), Todo::new(2, "walk dog", "c2")]);
        engine.fetch_all().await.unwrap();

        let outcome = engine.remove(1).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert!(engine.store().get(1).is_none());
        assert_eq!(remote.server_todos().len(), 1);

        let outcome = engine.remove(1).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::AlreadyGone);
        assert!(engine.store().get(1).is_none());
        assert_eq!(engine.store().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_failure_leaves_store_unchanged() {
        let (remote, engine) = setup(vec![milk()]);
        engine.fetch_all().await.unwrap();
        remote.fail_with(RemoteError::Status {
            status: 503,
            body: String::new(),
        });

        assert!(engine.remove(1).await.is_err());
        assert_eq!(engine.store().get_all(), vec![milk()]);
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_updates_to_different_ids() {
        let (_, engine) = setup(vec![milk(), Todo::new(2, "walk dog", "c2")]);
        engine.fetch_all().await.unwrap();

        let (a, b) = tokio::join!(
            engine.update(TodoPatch::new(1).completed(true)),
            engine.update(TodoPatch::new(2).text("walk cat")),
        );
        a.unwrap();
        b.unwrap();

        let todos = engine.store().get_all();
        assert!(todos[0].completed);
        assert_eq!(todos[1].text, "walk cat");
    }

    #[tokio::test]
    async fn test_staleness_tracking() {
        let (_, engine) = setup(vec![milk()]);
        assert!(engine.is_stale());

        engine.fetch_all().await.unwrap();
        assert!(!engine.is_stale());
        assert!(!engine.refresh_if_stale().await.unwrap());

        engine.create(TodoDraft::new("new", "c1")).await.unwrap();
        assert!(engine.is_stale());

        assert!(engine.refresh_if_stale().await.unwrap());
        assert!(!engine.is_stale());
        assert_eq!(engine.store().len(), 2);
    }

    #[tokio::test]
    async fn test_max_age_makes_snapshot_stale() {
        let options = SyncOptions {
            max_age: Some(Duration::from_millis(1)),
            ..SyncOptions::default()
        };
        let (_, engine) = setup_with(FakeRemote::with(vec![milk()]), options);
        engine.fetch_all().await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(engine.is_stale());
    }

    #[tokio::test]
    async fn test_refetch_on_invalidate() {
        let options = SyncOptions {
            refetch_on_invalidate: true,
            ..SyncOptions::default()
        };
        let (remote, engine) = setup_with(FakeRemote::with(vec![milk()]), options);
        engine.fetch_all().await.unwrap();

        engine.remove(1).await.unwrap();
        assert_eq!(remote.list_calls.load(Ordering::SeqCst), 2);
        assert!(!engine.is_stale());
        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_categories() {
        let (_, engine) = setup(vec![]);
        let categories = engine.fetch_categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].name, "Work");
    }
}

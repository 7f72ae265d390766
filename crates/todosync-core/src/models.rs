//! Data models for todosync
//!
//! Defines the records exchanged with the remote collection: `Todo`,
//! the write shapes `TodoDraft` and `TodoPatch`, and the read-only
//! `Category` reference data.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ValidationError;

/// Server-assigned todo identifier
pub type TodoId = i64;

/// A task record as returned by the remote collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    /// Unique identifier, assigned by the server
    #[serde(deserialize_with = "deserialize_id")]
    pub id: TodoId,
    /// Display text
    pub text: String,
    /// Category id (opaque foreign key)
    #[serde(default)]
    pub category: String,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// Optional longer description; empty is treated as absent
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_description"
    )]
    pub description: Option<String>,
}

impl Todo {
    /// Create an open todo with the given id
    pub fn new(id: TodoId, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
            completed: false,
            description: None,
        }
    }

    /// Set the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(Some(description.into()));
        self
    }

    /// Set the completion flag (builder style)
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// The body of a create request. Carries no id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoDraft {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TodoDraft {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            completed: false,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(Some(description.into()));
        self
    }

    /// Check the draft before it reaches the network
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// The record this draft would become once the server assigns `id`
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            text: self.text,
            category: self.category,
            completed: self.completed,
            description: self.description,
        }
    }
}

/// A partial update addressed to one record
///
/// Only the fields that are `Some` are changed. `description` uses a nested
/// option so that a patch can clear it (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub id: TodoId,
    pub text: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub description: Option<Option<String>>,
}

impl TodoPatch {
    pub fn new(id: TodoId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(normalize_description(description));
        self
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.category.is_none()
            && self.completed.is_none()
            && self.description.is_none()
    }

    /// Reject patches that would leave a record without text or category
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if matches!(self.text.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyText);
        }
        if matches!(self.category.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// Field-level merge onto an existing record
    pub fn apply_to(&self, todo: &Todo) -> Todo {
        let mut merged = todo.clone();
        if let Some(ref text) = self.text {
            merged.text = text.clone();
        }
        if let Some(ref category) = self.category {
            merged.category = category.clone();
        }
        if let Some(completed) = self.completed {
            merged.completed = completed;
        }
        if let Some(ref description) = self.description {
            merged.description = description.clone();
        }
        merged
    }

    /// JSON body carrying only the patched fields (plus the id)
    ///
    /// A cleared description is sent as an empty string, which the
    /// collection treats the same as absent.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("id".to_string(), Value::from(self.id));
        if let Some(ref text) = self.text {
            body.insert("text".to_string(), Value::from(text.as_str()));
        }
        if let Some(ref category) = self.category {
            body.insert("category".to_string(), Value::from(category.as_str()));
        }
        if let Some(completed) = self.completed {
            body.insert("completed".to_string(), Value::from(completed));
        }
        if let Some(ref description) = self.description {
            let value = description.as_deref().unwrap_or("");
            body.insert("description".to_string(), Value::from(value));
        }
        Value::Object(body)
    }

    /// Full record with this patch applied, for a PUT to a known todo
    ///
    /// Patched fields are written explicitly on top of the merged record,
    /// so a cleared description still goes out as `""`.
    pub fn merged_body(&self, base: &Todo) -> Value {
        let mut body = match serde_json::to_value(self.apply_to(base)) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Value::Object(fields) = self.to_body() {
            body.extend(fields);
        }
        Value::Object(body)
    }
}

/// Read-only category reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

/// How a record is keyed while it is visible to the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Created locally, waiting for the server to assign an id
    Provisional(Uuid),
    /// Server-assigned id
    Confirmed(TodoId),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Provisional(local) => write!(f, "pending-{}", &local.to_string()[..8]),
            RecordKey::Confirmed(id) => write!(f, "{}", id),
        }
    }
}

/// A create that has been shown optimistically but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTodo {
    pub local_id: Uuid,
    pub draft: TodoDraft,
}

impl PendingTodo {
    pub fn new(draft: TodoDraft) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            draft,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::Provisional(self.local_id)
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Int(i64),
    Text(String),
}

/// Accept `1` as well as `"1"`; json-server style backends emit both
fn deserialize_id<'de, D>(deserializer: D) -> Result<TodoId, D::Error>
where
    D: Deserializer<'de>,
{
    match RawKey::deserialize(deserializer)? {
        RawKey::Int(id) => Ok(id),
        RawKey::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid todo id: {:?}", s))),
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawKey::deserialize(deserializer)? {
        RawKey::Int(id) => id.to_string(),
        RawKey::Text(s) => s,
    })
}

fn deserialize_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_description(Option::<String>::deserialize(
        deserializer,
    )?))
}

//! Cache tags
//!
//! Tracks which parts of the last fetched snapshot have been invalidated by
//! successful mutations. A fetch provides the `List` tag plus one tag per
//! record; create invalidates `List`, update and remove invalidate the
//! record's own tag. Invalidating a tag nothing provides is a no-op.

use std::collections::HashSet;

use crate::models::{Todo, TodoId};

/// A piece of cached data that can be invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// The list as a whole (membership and order)
    List,
    /// A single record
    Todo(TodoId),
}

#[derive(Debug, Default)]
pub struct TagCache {
    provided: HashSet<CacheTag>,
    invalidated: HashSet<CacheTag>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tags provided by a fresh snapshot
    ///
    /// Replaces whatever was provided before and clears invalidations.
    pub fn provide(&mut self, todos: &[Todo]) {
        self.provided.clear();
        self.invalidated.clear();
        self.provided.insert(CacheTag::List);
        self.provided
            .extend(todos.iter().map(|t| CacheTag::Todo(t.id)));
    }

    /// Invalidate a tag; returns `true` if it was provided
    pub fn invalidate(&mut self, tag: CacheTag) -> bool {
        if self.provided.contains(&tag) {
            self.invalidated.insert(tag);
            true
        } else {
            false
        }
    }

    pub fn is_provided(&self, tag: CacheTag) -> bool {
        self.provided.contains(&tag)
    }

    pub fn is_invalidated(&self, tag: CacheTag) -> bool {
        self.invalidated.contains(&tag)
    }

    /// Whether anything the snapshot provides has been invalidated
    pub fn has_invalidated(&self) -> bool {
        !self.invalidated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provide_sets_list_and_record_tags() {
        let mut cache = TagCache::new();
        cache.provide(&[Todo::new(1, "a", "c1"), Todo::new(2, "b", "c1")]);

        assert!(cache.is_provided(CacheTag::List));
        assert!(cache.is_provided(CacheTag::Todo(1)));
        assert!(cache.is_provided(CacheTag::Todo(2)));
        assert!(!cache.is_provided(CacheTag::Todo(3)));
        assert!(!cache.has_invalidated());
    }

    #[test]
    fn test_invalidate_only_provided_tags() {
        let mut cache = TagCache::new();
        cache.provide(&[Todo::new(1, "a", "c1")]);

        assert!(!cache.invalidate(CacheTag::Todo(99)));
        assert!(!cache.has_invalidated());

        assert!(cache.invalidate(CacheTag::Todo(1)));
        assert!(cache.is_invalidated(CacheTag::Todo(1)));
        assert!(cache.has_invalidated());
    }

    #[test]
    fn test_provide_clears_invalidations() {
        let mut cache = TagCache::new();
        cache.provide(&[Todo::new(1, "a", "c1")]);
        cache.invalidate(CacheTag::List);
        assert!(cache.has_invalidated());

        cache.provide(&[]);
        assert!(!cache.has_invalidated());
        assert!(!cache.is_provided(CacheTag::Todo(1)));
    }

    #[test]
    fn test_empty_cache_ignores_invalidation() {
        let mut cache = TagCache::new();
        assert!(!cache.invalidate(CacheTag::List));
        assert!(!cache.has_invalidated());
    }
}

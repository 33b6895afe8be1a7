//! Query cache with tag-based invalidation.
//!
//! Each cached query result provides a set of [`Tag`]s. Mutations invalidate
//! tags, dropping every entry that provides a matching one. A tag without an
//! id matches every id of its kind, in both directions.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Service,
    Category,
    Subcategory,
    Product,
    FullTree,
    Cart,
    Wishlist,
    Order,
    CustomOrder,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: TagKind,
    pub id: Option<String>,
}

impl Tag {
    /// Tag covering every resource of a kind.
    pub fn all(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    pub fn one(kind: TagKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
        }
    }

    fn matches(&self, other: &Tag) -> bool {
        self.kind == other.kind
            && match (&self.id, &other.id) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

struct CacheEntry {
    value: serde_json::Value,
    tags: Vec<Tag>,
    stored_at: Instant,
}

pub struct QueryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh cached value for `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() >= self.ttl {
                None
            } else {
                Some(entry.value.clone())
            }
        };

        let Some(value) = value else {
            self.entries.remove(key);
            return None;
        };

        match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::trace!(key, "Cache hit");
                Some(decoded)
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Dropping cache entry of unexpected shape");
                self.entries.remove(key);
                None
            }
        }
    }

    pub fn insert<T: Serialize>(&self, key: &str, tags: Vec<Tag>, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value,
                        tags,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(e) => tracing::debug!(key, error = %e, "Value not cacheable"),
        }
    }

    /// Drop every entry providing one of `tags`. Returns how many were dropped.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            !entry
                .tags
                .iter()
                .any(|provided| tags.iter().any(|t| provided.matches(t)))
        });
        let dropped = before.saturating_sub(self.entries.len());
        if dropped > 0 {
            tracing::debug!(?tags, dropped, "Invalidated cached queries");
        }
        dropped
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_insert_and_get() {
        let cache = cache();
        cache.insert("products?page=1", vec![Tag::all(TagKind::Product)], &vec![1, 2]);
        assert_eq!(cache.get::<Vec<u32>>("products?page=1"), Some(vec![1, 2]));
        assert_eq!(cache.get::<Vec<u32>>("products?page=2"), None);
    }

    #[test]
    fn test_invalidate_by_kind_drops_specific_ids() {
        let cache = cache();
        cache.insert("tree:svc1", vec![Tag::one(TagKind::FullTree, "svc1")], &1);
        cache.insert("tree:svc2", vec![Tag::one(TagKind::FullTree, "svc2")], &2);
        cache.insert("cart", vec![Tag::all(TagKind::Cart)], &3);

        assert_eq!(cache.invalidate(&[Tag::all(TagKind::FullTree)]), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_specific_id() {
        let cache = cache();
        cache.insert("product:p1", vec![Tag::one(TagKind::Product, "p1")], &1);
        cache.insert("product:p2", vec![Tag::one(TagKind::Product, "p2")], &2);
        cache.insert("products", vec![Tag::all(TagKind::Product)], &3);

        assert_eq!(cache.invalidate(&[Tag::one(TagKind::Product, "p1")]), 2);
        assert_eq!(cache.get::<u32>("product:p2"), Some(2));
        assert_eq!(cache.get::<u32>("products"), None);
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert("cart", vec![Tag::all(TagKind::Cart)], &1);
        assert_eq!(cache.get::<u32>("cart"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_a_miss() {
        let cache = cache();
        cache.insert("cart", vec![], &"text");
        assert_eq!(cache.get::<u32>("cart"), None);
        assert!(cache.is_empty());
    }
}

//! Local mirrors of server-owned lists.
//!
//! A mirror holds the last authoritative list. A fetch replaces it wholesale;
//! a mutation is sent first and only patches the mirror by id once the server
//! has accepted it. Each fetch takes a ticket and results for stale tickets
//! (a newer fetch started, or the mirror was detached) are dropped.

mod cart;
mod orders;

pub use cart::CartMirror;
pub use orders::{CustomOrderMirror, OrderMirror, Scope};

use arc_swap::ArcSwap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::api::ClientError;
use crate::models::{CartItem, CustomOrder, Order};

/// Items that can be patched in place by id.
pub trait Mirrored: Clone + Send + Sync {
    fn mirror_id(&self) -> &str;
}

impl Mirrored for CartItem {
    fn mirror_id(&self) -> &str {
        &self.product_id
    }
}

impl Mirrored for Order {
    fn mirror_id(&self) -> &str {
        &self.id
    }
}

impl Mirrored for CustomOrder {
    fn mirror_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

pub struct Mirror<T> {
    items: ArcSwap<Vec<T>>,
    generation: AtomicU64,
}

impl<T: Mirrored> Default for Mirror<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Mirrored> Mirror<T> {
    pub fn new() -> Self {
        Self {
            items: ArcSwap::from_pointee(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.items.load_full()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.items
            .load()
            .iter()
            .find(|item| item.mirror_id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.load().is_empty()
    }

    /// Start a fetch. Only the most recent ticket can apply its result.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply a fetched list if its ticket is still current.
    pub fn finish_fetch(&self, ticket: FetchTicket, items: Vec<T>) -> bool {
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            tracing::debug!(ticket = ticket.0, "Discarding stale fetch result");
            return false;
        }
        self.replace_all(items);
        true
    }

    /// Server wins: replace the whole list.
    pub fn replace_all(&self, items: Vec<T>) {
        self.items.store(Arc::new(items));
    }

    /// Invalidate fetches in flight. Their results will not be applied.
    pub fn detach(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Run `fetch` under a ticket. `Ok(false)` means the result went stale.
    pub async fn refresh<F>(&self, fetch: F) -> Result<bool, ClientError>
    where
        F: Future<Output = Result<Vec<T>, ClientError>>,
    {
        let ticket = self.begin_fetch();
        let items = fetch.await?;
        Ok(self.finish_fetch(ticket, items))
    }

    /// Send `mutation`; on success apply `patch` to the item with `id`.
    pub async fn mutate<F, P>(&self, id: &str, mutation: F, patch: P) -> Result<(), ClientError>
    where
        F: Future<Output = Result<(), ClientError>>,
        P: Fn(&mut T),
    {
        mutation.await?;
        self.items.rcu(|items| {
            let mut next = Vec::clone(items);
            if let Some(item) = next.iter_mut().find(|item| item.mirror_id() == id) {
                patch(item);
            }
            next
        });
        Ok(())
    }

    /// Send `mutation`; on success drop the item with `id`.
    pub async fn remove<F>(&self, id: &str, mutation: F) -> Result<(), ClientError>
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        mutation.await?;
        self.items.rcu(|items| {
            items
                .iter()
                .filter(|item| item.mirror_id() != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        Ok(())
    }
}

//! Catalog navigation: ancestry for products reached by deep link.
//!
//! Product records carry their subcategory and category but not the full
//! chain, so the chain is rebuilt by walking the service's full tree.

mod breadcrumb;

pub use breadcrumb::{
    resolve_breadcrumb, resolve_category, resolve_category_breadcrumb, BreadcrumbResolver, Crumb,
    CrumbKind,
};

use async_trait::async_trait;

use crate::api::ClientError;
use crate::models::FullTree;

/// Anything that can produce the full tree of a service.
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn fetch_tree(&self, service_id: &str) -> Result<FullTree, ClientError>;
}

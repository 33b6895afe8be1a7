use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

use super::TreeSource;
use crate::models::{CategoryNode, EntityRef, FullTree, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrumbKind {
    Service,
    Category,
    Subcategory,
}

impl fmt::Display for CrumbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CrumbKind::Service => "service",
            CrumbKind::Category => "category",
            CrumbKind::Subcategory => "subcategory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CrumbKind,
}

impl Crumb {
    fn new(id: &str, name: &str, kind: CrumbKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// The tree node for a category, whichever shape the reference arrived in.
pub fn resolve_category<'a>(tree: &'a FullTree, category: &EntityRef) -> Option<&'a CategoryNode> {
    let category_id = category.id();
    tree.categories
        .iter()
        .find(|node| node.category.id == category_id)
}

/// `[service, category]` for a category-level link, empty on a miss.
pub fn resolve_category_breadcrumb(tree: &FullTree, category: &EntityRef) -> Vec<Crumb> {
    match resolve_category(tree, category) {
        Some(node) => service_and_category(tree, node),
        None => Vec::new(),
    }
}

fn service_and_category(tree: &FullTree, node: &CategoryNode) -> Vec<Crumb> {
    vec![
        Crumb::new(&tree.service.id, &tree.service.name, CrumbKind::Service),
        Crumb::new(&node.category.id, &node.category.name, CrumbKind::Category),
    ]
}

/// `[service, category, subcategory]` on a full match, empty otherwise.
pub fn resolve_breadcrumb(
    tree: &FullTree,
    category: &EntityRef,
    subcategory_id: &str,
) -> Vec<Crumb> {
    let Some(node) = resolve_category(tree, category) else {
        return Vec::new();
    };
    let Some(subcategory) = node
        .subcategories
        .iter()
        .map(|s| s.subcategory())
        .find(|s| s.id == subcategory_id)
    else {
        return Vec::new();
    };

    let mut crumbs = service_and_category(tree, node);
    crumbs.push(Crumb::new(&subcategory.id, &subcategory.name, CrumbKind::Subcategory));
    crumbs
}

/// The page a breadcrumb is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Category(String),
    Subcategory(String),
}

struct Resolved {
    service_id: String,
    route: Route,
    crumbs: Vec<Crumb>,
}

/// Resolves the breadcrumb for a category or subcategory route, fetching
/// the tree at most once per `(service, route)` pair that resolved.
#[derive(Default)]
pub struct BreadcrumbResolver {
    resolved: Mutex<Option<Resolved>>,
}

impl BreadcrumbResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Breadcrumb for `subcategory_id`, using the first product for the
    /// service and category. Misses and fetch failures give an empty chain.
    pub async fn resolve(
        &self,
        source: &dyn TreeSource,
        products: &[Product],
        subcategory_id: &str,
    ) -> Vec<Crumb> {
        self.resolve_route(source, products, Route::Subcategory(subcategory_id.to_string()))
            .await
    }

    /// `[service, category]` for a category page, from the first product.
    pub async fn resolve_for_category(
        &self,
        source: &dyn TreeSource,
        products: &[Product],
    ) -> Vec<Crumb> {
        let Some(category) = products.first().and_then(|p| p.category.as_ref()) else {
            return Vec::new();
        };
        self.resolve_route(source, products, Route::Category(category.id().to_string()))
            .await
    }

    async fn resolve_route(
        &self,
        source: &dyn TreeSource,
        products: &[Product],
        route: Route,
    ) -> Vec<Crumb> {
        let Some(first) = products.first() else {
            return Vec::new();
        };
        let (Some(service), Some(category)) = (&first.service_id, &first.category) else {
            tracing::debug!(product = %first.id, "Product has no service or category, no breadcrumb");
            return Vec::new();
        };
        let service_id = service.id();

        if let Some(resolved) = self.resolved.lock().as_ref() {
            if resolved.service_id == service_id && resolved.route == route {
                return resolved.crumbs.clone();
            }
        }

        let tree = match source.fetch_tree(service_id).await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!(service_id, error = %e, "Tree fetch failed, no breadcrumb");
                return Vec::new();
            }
        };

        let crumbs = match &route {
            Route::Category(_) => resolve_category_breadcrumb(&tree, category),
            Route::Subcategory(subcategory_id) => resolve_breadcrumb(&tree, category, subcategory_id),
        };
        if crumbs.is_empty() {
            tracing::debug!(service_id, ?route, "Route not found in tree");
        } else {
            *self.resolved.lock() = Some(Resolved {
                service_id: service_id.to_string(),
                route,
                crumbs: crumbs.clone(),
            });
        }
        crumbs
    }

    /// Forget the resolved route.
    pub fn reset(&self) {
        *self.resolved.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tree() -> FullTree {
        serde_json::from_value(json!({
            "service": {"_id": "svc1", "name": "Grocery"},
            "categories": [
                {
                    "category": {"_id": "c0", "name": "Dairy"},
                    "subcategories": [{"_id": "s0", "name": "Milk"}]
                },
                {
                    "category": {"_id": "c1", "name": "Grains"},
                    "subcategories": [
                        {"subcategory": {"_id": "s1", "name": "Rice"}},
                        {"subcategory": {"_id": "s2", "name": "Lentils"}}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn product(category: serde_json::Value) -> Product {
        serde_json::from_value(json!({
            "_id": "p1",
            "title": "Miniket Rice",
            "serviceId": "svc1",
            "category": category,
            "subcategory": "s1"
        }))
        .unwrap()
    }

    struct CountingSource {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl TreeSource for CountingSource {
        async fn fetch_tree(&self, _service_id: &str) -> Result<FullTree, ClientError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ClientError::Network("connection refused".to_string()))
            } else {
                Ok(tree())
            }
        }
    }

    #[test]
    fn test_full_match_is_ordered() {
        let crumbs = resolve_breadcrumb(&tree(), &EntityRef::from("c1"), "s1");
        let ids: Vec<(&str, CrumbKind)> = crumbs.iter().map(|c| (c.id.as_str(), c.kind)).collect();
        assert_eq!(
            ids,
            vec![
                ("svc1", CrumbKind::Service),
                ("c1", CrumbKind::Category),
                ("s1", CrumbKind::Subcategory),
            ]
        );
        assert_eq!(crumbs[2].name, "Rice");
    }

    #[test]
    fn test_subcategory_under_other_category_is_empty() {
        assert!(resolve_breadcrumb(&tree(), &EntityRef::from("c1"), "s0").is_empty());
        assert!(resolve_breadcrumb(&tree(), &EntityRef::from("c9"), "s1").is_empty());
    }

    #[test]
    fn test_bare_and_embedded_category_resolve_identically() {
        let bare = product(json!("c1"));
        let embedded = product(json!({"_id": "c1"}));
        let tree = tree();
        assert_eq!(
            resolve_breadcrumb(&tree, bare.category.as_ref().unwrap(), "s1"),
            resolve_breadcrumb(&tree, embedded.category.as_ref().unwrap(), "s1"),
        );
        assert_eq!(
            resolve_category(&tree, embedded.category.as_ref().unwrap())
                .map(|n| n.category.name.as_str()),
            Some("Grains")
        );
    }

    #[test]
    fn test_category_link_yields_service_and_category() {
        let tree = tree();
        let bare = product(json!("c1"));
        let embedded = product(json!({"_id": "c1", "name": "Grains"}));

        let crumbs = resolve_category_breadcrumb(&tree, bare.category.as_ref().unwrap());
        assert_eq!(
            crumbs,
            vec![
                Crumb::new("svc1", "Grocery", CrumbKind::Service),
                Crumb::new("c1", "Grains", CrumbKind::Category),
            ]
        );
        assert_eq!(
            resolve_category_breadcrumb(&tree, embedded.category.as_ref().unwrap()),
            crumbs
        );
    }

    #[test]
    fn test_unknown_category_link_is_empty() {
        assert!(resolve_category_breadcrumb(&tree(), &EntityRef::from("c9")).is_empty());
    }

    #[tokio::test]
    async fn test_category_route_shares_the_memo() {
        let source = CountingSource::new(false);
        let resolver = BreadcrumbResolver::new();
        let products = vec![product(json!({"_id": "c1"}))];

        let crumbs = resolver.resolve_for_category(&source, &products).await;
        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[1].name, "Grains");
        resolver.resolve_for_category(&source, &products).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        // Switching to a subcategory page is a new route
        assert_eq!(resolver.resolve(&source, &products, "s1").await.len(), 3);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        let orphan = vec![product(json!("c9"))];
        assert!(resolver.resolve_for_category(&source, &orphan).await.is_empty());
    }

    #[test]
    fn test_crumb_serializes_type() {
        let crumb = Crumb::new("svc1", "Grocery", CrumbKind::Service);
        assert_eq!(
            serde_json::to_value(crumb).unwrap(),
            json!({"id": "svc1", "name": "Grocery", "type": "service"})
        );
    }

    #[tokio::test]
    async fn test_resolver_fetches_once_per_route() {
        let source = CountingSource::new(false);
        let resolver = BreadcrumbResolver::new();
        let products = vec![product(json!({"_id": "c1", "name": "Grains"}))];

        let first = resolver.resolve(&source, &products, "s1").await;
        let second = resolver.resolve(&source, &products, "s1").await;
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        resolver.resolve(&source, &products, "s2").await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolver_is_empty_on_failure_or_no_products() {
        let source = CountingSource::new(true);
        let resolver = BreadcrumbResolver::new();
        let products = vec![product(json!("c1"))];

        assert!(resolver.resolve(&source, &products, "s1").await.is_empty());
        assert!(resolver.resolve(&source, &[], "s1").await.is_empty());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }
}

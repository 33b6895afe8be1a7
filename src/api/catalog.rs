//! Catalog queries and admin CRUD.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiClient, ClientError, ListQuery, Page};
use crate::cache::{Tag, TagKind};
use crate::catalog::TreeSource;
use crate::gateway::{path_segment, ApiRequest};
use crate::models::{
    Category, CategoryInput, FullTree, Product, ProductInput, Service, ServiceInput, Subcategory,
    SubcategoryInput,
};

/// Catalog collections and the cache tag each provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Services,
    Categories,
    Subcategories,
    Products,
}

impl Collection {
    fn path(&self) -> &'static str {
        match self {
            Collection::Services => "/services",
            Collection::Categories => "/categories",
            Collection::Subcategories => "/subcategories",
            Collection::Products => "/products",
        }
    }

    fn kind(&self) -> TagKind {
        match self {
            Collection::Services => TagKind::Service,
            Collection::Categories => TagKind::Category,
            Collection::Subcategories => TagKind::Subcategory,
            Collection::Products => TagKind::Product,
        }
    }

    /// Tags a write to this collection invalidates.
    fn invalidates(&self, id: Option<&str>) -> Vec<Tag> {
        let mut tags = vec![Tag::all(self.kind())];
        if let Some(id) = id {
            tags.push(Tag::one(self.kind(), id));
        }
        // Products are not part of the tree
        if *self != Collection::Products {
            tags.push(Tag::all(TagKind::FullTree));
        }
        tags
    }
}

impl ApiClient {
    async fn list<T>(&self, collection: Collection, query: &ListQuery) -> Result<Page<T>, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let request = ApiRequest::get(collection.path()).query_pairs(query.to_pairs());
        self.query_page(request, vec![Tag::all(collection.kind())], collection.path())
            .await
    }

    async fn fetch_one<T>(&self, collection: Collection, id: &str) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let request = ApiRequest::get(format!("{}/{}", collection.path(), path_segment(id)?));
        self.query_data(request, vec![Tag::one(collection.kind(), id)], collection.path())
            .await
    }

    async fn create<I: Serialize, T: DeserializeOwned>(
        &self,
        collection: Collection,
        input: &I,
    ) -> Result<T, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::post(collection.path()).json(input)?;
        self.mutate(request, &collection.invalidates(None), collection.path())
            .await
    }

    async fn update<I: Serialize, T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        input: &I,
    ) -> Result<T, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::patch(format!("{}/{}", collection.path(), path_segment(id)?))
            .json(input)?;
        self.mutate(request, &collection.invalidates(Some(id)), collection.path())
            .await
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<(), ClientError> {
        self.require_admin()?;
        let request = ApiRequest::delete(format!("{}/{}", collection.path(), path_segment(id)?));
        self.mutate_ack(request, &collection.invalidates(Some(id)), collection.path())
            .await?;
        tracing::info!(collection = collection.path(), id, "Deleted catalog entry");
        Ok(())
    }

    pub async fn services(&self, query: &ListQuery) -> Result<Page<Service>, ClientError> {
        self.list(Collection::Services, query).await
    }

    pub async fn service(&self, id: &str) -> Result<Service, ClientError> {
        self.fetch_one(Collection::Services, id).await
    }

    pub async fn categories(&self, query: &ListQuery) -> Result<Page<Category>, ClientError> {
        self.list(Collection::Categories, query).await
    }

    pub async fn category(&self, id: &str) -> Result<Category, ClientError> {
        self.fetch_one(Collection::Categories, id).await
    }

    pub async fn subcategories(&self, query: &ListQuery) -> Result<Page<Subcategory>, ClientError> {
        self.list(Collection::Subcategories, query).await
    }

    pub async fn subcategory(&self, id: &str) -> Result<Subcategory, ClientError> {
        self.fetch_one(Collection::Subcategories, id).await
    }

    pub async fn products(&self, query: &ListQuery) -> Result<Page<Product>, ClientError> {
        self.list(Collection::Products, query).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ClientError> {
        self.fetch_one(Collection::Products, id).await
    }

    /// The service with its nested categories and subcategories.
    pub async fn full_tree(&self, service_id: &str) -> Result<FullTree, ClientError> {
        let request = ApiRequest::get(format!("/services/{}/full-tree", path_segment(service_id)?));
        self.query_data(
            request,
            vec![Tag::one(TagKind::FullTree, service_id)],
            "service tree",
        )
        .await
    }

    pub async fn create_service(&self, input: &ServiceInput) -> Result<Service, ClientError> {
        self.create(Collection::Services, input).await
    }

    pub async fn update_service(&self, id: &str, input: &ServiceInput) -> Result<Service, ClientError> {
        self.update(Collection::Services, id, input).await
    }

    pub async fn delete_service(&self, id: &str) -> Result<(), ClientError> {
        self.remove(Collection::Services, id).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        self.create(Collection::Categories, input).await
    }

    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<Category, ClientError> {
        self.update(Collection::Categories, id, input).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        self.remove(Collection::Categories, id).await
    }

    pub async fn create_subcategory(
        &self,
        input: &SubcategoryInput,
    ) -> Result<Subcategory, ClientError> {
        self.create(Collection::Subcategories, input).await
    }

    pub async fn update_subcategory(
        &self,
        id: &str,
        input: &SubcategoryInput,
    ) -> Result<Subcategory, ClientError> {
        self.update(Collection::Subcategories, id, input).await
    }

    pub async fn delete_subcategory(&self, id: &str) -> Result<(), ClientError> {
        self.remove(Collection::Subcategories, id).await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        self.create(Collection::Products, input).await
    }

    pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, ClientError> {
        self.update(Collection::Products, id, input).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.remove(Collection::Products, id).await
    }
}

#[async_trait]
impl TreeSource for ApiClient {
    async fn fetch_tree(&self, service_id: &str) -> Result<FullTree, ClientError> {
        self.full_tree(service_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use super::*;
    use crate::session::Role;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    fn tree_body() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "service": {"_id": "svc1", "name": "Grocery"},
                "categories": [{
                    "category": {"_id": "c1", "name": "Grains"},
                    "subcategories": [{"subcategory": {"_id": "s1", "name": "Rice"}}]
                }]
            }
        })
    }

    #[tokio::test]
    async fn test_products_query_is_cached() {
        let (client, transport) = client(None);
        transport.respond(
            Method::GET,
            "/products",
            StatusCode::OK,
            json!({
                "success": true,
                "data": [{"_id": "p1", "title": "Rice", "price": 80}],
                "meta": {"total": 1, "totalPage": 1, "limit": 10, "page": 1}
            }),
        );

        let query = ListQuery::new().filter("subcategory", "s1");
        let first = client.products(&query).await.unwrap();
        let second = client.products(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.meta.total_pages, 1);
        assert_eq!(transport.calls_to(Method::GET, "/products").len(), 1);
        assert_eq!(
            transport.calls()[0].request.query,
            vec![("subcategory".to_string(), "s1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_category_write_invalidates_tree() {
        let (client, transport) = client(Some(Role::Admin));
        transport.respond(Method::GET, "/services/svc1/full-tree", StatusCode::OK, tree_body());
        transport.respond(Method::GET, "/services/svc1/full-tree", StatusCode::OK, tree_body());
        transport.respond(
            Method::PATCH,
            "/categories/c1",
            StatusCode::OK,
            json!({"success": true, "data": {"_id": "c1", "name": "Whole Grains"}}),
        );

        client.full_tree("svc1").await.unwrap();
        client.full_tree("svc1").await.unwrap();
        assert_eq!(transport.calls_to(Method::GET, "/services/svc1/full-tree").len(), 1);

        let input = CategoryInput {
            name: Some("Whole Grains".to_string()),
            ..CategoryInput::default()
        };
        let updated = client.update_category("c1", &input).await.unwrap();
        assert_eq!(updated.name, "Whole Grains");

        client.full_tree("svc1").await.unwrap();
        assert_eq!(transport.calls_to(Method::GET, "/services/svc1/full-tree").len(), 2);
    }

    #[tokio::test]
    async fn test_admin_writes_are_role_gated() {
        let (client, transport) = client(Some(Role::User));
        let err = client.delete_product("p1").await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden { .. }));
        assert!(transport.calls().is_empty());
        assert!(client.session().snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (client, transport) = client(None);
        transport.respond(
            Method::GET,
            "/products/nope",
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "Product not found"}),
        );
        let err = client.product("nope").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }
}

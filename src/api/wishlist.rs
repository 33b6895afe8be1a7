use serde_json::json;

use super::{ApiClient, ClientError, Page};
use crate::cache::{Tag, TagKind};
use crate::gateway::{path_segment, ApiRequest};
use crate::models::WishlistItem;

impl ApiClient {
    /// The wishlist is sent with whatever session exists; without one the
    /// gateway's refresh path decides the outcome.
    pub async fn wishlist(&self) -> Result<Page<WishlistItem>, ClientError> {
        self.query_page(
            ApiRequest::get("/wishlist"),
            vec![Tag::all(TagKind::Wishlist)],
            "wishlist",
        )
        .await
    }

    pub async fn add_to_wishlist(&self, product_id: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/wishlist").json(&json!({ "productId": product_id }))?;
        self.mutate_ack(request, &[Tag::all(TagKind::Wishlist)], "add to wishlist")
            .await?;
        Ok(())
    }

    pub async fn remove_from_wishlist(&self, product_id: &str) -> Result<(), ClientError> {
        let request = ApiRequest::delete(format!("/wishlist/{}", path_segment(product_id)?));
        self.mutate_ack(request, &[Tag::all(TagKind::Wishlist)], "remove from wishlist")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use crate::api::ClientError;
    use crate::gateway::REFRESH_PATH;
    use crate::session::{Role, Session};
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_wishlist_without_session_ends_logged_out() {
        let (client, transport) = client(None);
        transport.respond(
            Method::GET,
            "/wishlist",
            StatusCode::UNAUTHORIZED,
            json!({"success": false, "message": "You are not authorized"}),
        );
        transport.respond(
            Method::POST,
            REFRESH_PATH,
            StatusCode::OK,
            json!({"success": true, "data": {"accessToken": "fresh"}}),
        );

        let err = client.wishlist().await.unwrap_err();
        assert!(matches!(err, ClientError::SessionEnded));
        assert_eq!(transport.calls()[0].bearer, None);
        assert_eq!(transport.calls_to(Method::GET, "/wishlist").len(), 1);
        assert_eq!(client.session().snapshot(), Session::default());
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_wishlist_page() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::GET,
            "/wishlist",
            StatusCode::OK,
            json!({
                "success": true,
                "data": [{"product": {"_id": "p1", "title": "Mango"}, "title": "Mango", "price": 3}],
                "meta": {"total": "1", "totalPage": 1}
            }),
        );

        let page = client.wishlist().await.unwrap();
        assert_eq!(page.items[0].product_id, "p1");
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.meta.page, 1);
    }

    #[tokio::test]
    async fn test_remove_failure_surfaces_error() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::DELETE,
            "/wishlist/p1",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"success": false, "message": "boom"}),
        );
        let err = client.remove_from_wishlist("p1").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { .. }));
    }
}

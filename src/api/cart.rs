use reqwest::StatusCode;
use serde_json::json;

use super::{envelope, ApiClient, ClientError};
use crate::cache::{Tag, TagKind};
use crate::gateway::{path_segment, ApiRequest};
use crate::models::cart::CartPayload;
use crate::models::CartItem;

impl ApiClient {
    /// Items in the logged-in user's cart. A missing cart is an empty one.
    pub async fn cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let request = ApiRequest::get("/cart");
        let req = &request;
        self.cached(req, vec![Tag::all(TagKind::Cart)], || async move {
            let response = self.send(req).await?;
            if response.status == StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            let payload: Option<CartPayload> = envelope::decode_data(&response, "cart")?;
            Ok(payload.map(CartPayload::into_items).unwrap_or_default())
        })
        .await
    }

    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<(), ClientError> {
        let request = ApiRequest::post("/cart")
            .json(&json!({ "productId": product_id, "quantity": quantity }))?;
        self.mutate_ack(request, &[Tag::all(TagKind::Cart)], "add to cart")
            .await?;
        tracing::debug!(product_id, quantity, "Added to cart");
        Ok(())
    }

    pub async fn update_cart_quantity(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), ClientError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        let request = ApiRequest::patch(format!("/cart/{}", path_segment(product_id)?))
            .json(&json!({ "quantity": quantity }))?;
        self.mutate_ack(request, &[Tag::all(TagKind::Cart)], "cart quantity")
            .await?;
        Ok(())
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Result<(), ClientError> {
        let request = ApiRequest::delete(format!("/cart/{}", path_segment(product_id)?));
        self.mutate_ack(request, &[Tag::all(TagKind::Cart)], "remove from cart")
            .await?;
        Ok(())
    }

    pub async fn clear_cart(&self) -> Result<(), ClientError> {
        self.mutate_ack(
            ApiRequest::delete("/cart"),
            &[Tag::all(TagKind::Cart)],
            "clear cart",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use crate::session::Role;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_cart_accepts_wrapped_payload() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::GET,
            "/cart",
            StatusCode::OK,
            json!({"success": true, "data": {"items": [
                {"product": {"_id": "p1", "title": "Tea"}, "title": "Tea", "price": 120, "quantity": 2}
            ]}}),
        );

        let items = client.cart().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "p1");
        assert_eq!(transport.calls()[0].bearer.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::GET,
            "/cart",
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "Cart not found"}),
        );
        assert!(client.cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_write_invalidates_cached_cart() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(Method::GET, "/cart", StatusCode::OK, json!({"success": true, "data": []}));
        transport.respond(
            Method::POST,
            "/cart",
            StatusCode::OK,
            json!({"success": true, "message": "Added"}),
        );
        transport.respond(
            Method::GET,
            "/cart",
            StatusCode::OK,
            json!({"success": true, "data": [{"productId": "p2", "price": 5, "quantity": 3}]}),
        );

        assert!(client.cart().await.unwrap().is_empty());
        client.add_to_cart("p2", 3).await.unwrap();
        let items = client.cart().await.unwrap();
        assert_eq!(items[0].quantity, 3);

        let add = &transport.calls_to(Method::POST, "/cart")[0];
        assert_eq!(add.request.body, Some(json!({"productId": "p2", "quantity": 3})));
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_item() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::DELETE,
            "/cart/p1",
            StatusCode::OK,
            json!({"success": true}),
        );
        client.update_cart_quantity("p1", 0).await.unwrap();
        assert!(transport.calls_to(Method::PATCH, "/cart/p1").is_empty());
        assert_eq!(transport.calls_to(Method::DELETE, "/cart/p1").len(), 1);
    }
}

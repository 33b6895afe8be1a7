//! Custom bazar orders: free-form shopping lists.

use serde_json::json;

use super::{ApiClient, ClientError, ListQuery, Page};
use crate::cache::{Tag, TagKind};
use crate::gateway::{path_segment, ApiRequest};
use crate::models::{CustomOrder, CustomOrderRequest, OrderStatus, PaymentStatus};

impl ApiClient {
    pub async fn create_custom_order(
        &self,
        order: &CustomOrderRequest,
    ) -> Result<CustomOrder, ClientError> {
        self.require_login()?;
        if order.items.is_empty() {
            return Err(ClientError::Validation {
                message: "Add at least one item to the list".to_string(),
            });
        }

        let request = ApiRequest::post("/custom-orders").json(order)?;
        let created: CustomOrder = self
            .mutate(request, &[Tag::all(TagKind::CustomOrder)], "custom order")
            .await?;
        tracing::info!(order_id = %created.id, items = created.items.len(), "Custom order placed");
        Ok(created)
    }

    pub async fn my_custom_orders(&self, query: &ListQuery) -> Result<Page<CustomOrder>, ClientError> {
        self.require_login()?;
        let request = ApiRequest::get("/custom-orders/my-orders").query_pairs(query.to_pairs());
        self.query_page(request, vec![Tag::all(TagKind::CustomOrder)], "my custom orders")
            .await
    }

    /// Look up a custom order by its invoice id. Works without a session.
    pub async fn track_custom_order(&self, invoice_id: &str) -> Result<CustomOrder, ClientError> {
        let invoice_id = invoice_id.trim();
        if invoice_id.is_empty() {
            return Err(ClientError::Validation {
                message: "Invoice id is required".to_string(),
            });
        }
        self.query_data(
            ApiRequest::get(format!("/custom-orders/track/{}", path_segment(invoice_id)?)),
            vec![Tag::all(TagKind::CustomOrder)],
            "custom order tracking",
        )
        .await
    }

    pub async fn all_custom_orders(&self, query: &ListQuery) -> Result<Page<CustomOrder>, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::get("/custom-orders").query_pairs(query.to_pairs());
        self.query_page(request, vec![Tag::all(TagKind::CustomOrder)], "custom orders")
            .await
    }

    pub async fn update_custom_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), ClientError> {
        self.require_admin()?;
        let request = ApiRequest::patch(format!("/custom-orders/{}/status", path_segment(id)?))
            .json(&json!({ "status": status }))?;
        self.mutate_ack(request, &[Tag::all(TagKind::CustomOrder)], "custom order status")
            .await?;
        Ok(())
    }

    pub async fn update_custom_order_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<(), ClientError> {
        self.require_admin()?;
        let path = format!("/custom-orders/{}/payment-status", path_segment(id)?);
        let request = ApiRequest::patch(path)
            .json(&json!({ "paymentStatus": status }))?;
        self.mutate_ack(
            request,
            &[Tag::all(TagKind::CustomOrder)],
            "custom order payment status",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use super::*;
    use crate::models::CustomOrderItem;
    use crate::session::Role;
    use reqwest::{Method, StatusCode};

    #[tokio::test]
    async fn test_create_custom_order() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::POST,
            "/custom-orders",
            StatusCode::CREATED,
            json!({"success": true, "data": {
                "_id": "co1",
                "invoiceId": "CB-1",
                "items": [{"name": "Hilsa", "quantity": 1}],
                "address": "Mirpur 10",
                "phone": "01900000000"
            }}),
        );

        let order = client
            .create_custom_order(&CustomOrderRequest {
                items: vec![CustomOrderItem {
                    name: "Hilsa".to_string(),
                    quantity: 1,
                    note: None,
                }],
                address: "Mirpur 10".to_string(),
                phone: "01900000000".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(order.invoice_id, "CB-1");
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_my_custom_orders_missing_is_empty() {
        let (client, transport) = client(Some(Role::User));
        transport.respond(
            Method::GET,
            "/custom-orders/my-orders",
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "No orders"}),
        );
        let page = client.my_custom_orders(&ListQuery::new()).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.meta.page, 1);
    }

    #[tokio::test]
    async fn test_blank_invoice_is_rejected_locally() {
        let (client, transport) = client(None);
        let err = client.track_custom_order("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
        assert_eq!(err.user_message(), "Invoice id is required");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_track_custom_order_trims_and_escapes() {
        let (client, transport) = client(None);
        transport.respond(
            Method::GET,
            "/custom-orders/track/CB%3F1",
            StatusCode::OK,
            json!({"success": true, "data": {"_id": "co9", "invoiceId": "CB?1", "items": []}}),
        );
        let order = client.track_custom_order(" CB?1 ").await.unwrap();
        assert_eq!(order.id, "co9");
    }

    #[tokio::test]
    async fn test_payment_status_update_shape() {
        let (client, transport) = client(Some(Role::Admin));
        transport.respond(
            Method::PATCH,
            "/custom-orders/co1/payment-status",
            StatusCode::OK,
            json!({"success": true}),
        );
        client
            .update_custom_order_payment_status("co1", PaymentStatus::Paid)
            .await
            .unwrap();
        let call = &transport.calls_to(Method::PATCH, "/custom-orders/co1/payment-status")[0];
        assert_eq!(call.request.body, Some(json!({"paymentStatus": "paid"})));
    }
}

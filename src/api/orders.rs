//! Orders: checkout, customer history, invoice tracking and admin status
//! updates. Tracking by invoice lives here too; there is one order module.

use serde_json::json;

use super::{ApiClient, ClientError, ListQuery, Page};
use crate::cache::{Tag, TagKind};
use crate::gateway::{path_segment, ApiRequest};
use crate::models::{CheckoutRequest, Order, OrderStatus, PaymentStatus};

impl ApiClient {
    /// Place an order from the given items. Clears the cached cart.
    pub async fn checkout(&self, checkout: &CheckoutRequest) -> Result<Order, ClientError> {
        self.require_login()?;
        if checkout.items.is_empty() {
            return Err(ClientError::Validation {
                message: "Cannot check out an empty cart".to_string(),
            });
        }

        let request = ApiRequest::post("/orders").json(checkout)?;
        let order: Order = self
            .mutate(
                request,
                &[Tag::all(TagKind::Order), Tag::all(TagKind::Cart)],
                "checkout",
            )
            .await?;
        tracing::info!(order_id = %order.id, invoice = %order.invoice_id, "Order placed");
        Ok(order)
    }

    pub async fn my_orders(&self, query: &ListQuery) -> Result<Page<Order>, ClientError> {
        let user = self.require_login()?;
        let request = ApiRequest::get("/orders/my-orders").query_pairs(query.to_pairs());
        self.query_page(
            request,
            vec![Tag::all(TagKind::Order), Tag::one(TagKind::User, user.subject_id)],
            "my orders",
        )
        .await
    }

    pub async fn order(&self, id: &str) -> Result<Order, ClientError> {
        self.query_data(
            ApiRequest::get(format!("/orders/{}", path_segment(id)?)),
            vec![Tag::one(TagKind::Order, id)],
            "order",
        )
        .await
    }

    /// Look up an order by its invoice id. Works without a session.
    pub async fn track_order(&self, invoice_id: &str) -> Result<Order, ClientError> {
        let invoice_id = invoice_id.trim();
        if invoice_id.is_empty() {
            return Err(ClientError::Validation {
                message: "Invoice id is required".to_string(),
            });
        }
        self.query_data(
            ApiRequest::get(format!("/orders/track/{}", path_segment(invoice_id)?)),
            vec![Tag::all(TagKind::Order)],
            "order tracking",
        )
        .await
    }

    pub async fn all_orders(&self, query: &ListQuery) -> Result<Page<Order>, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::get("/orders").query_pairs(query.to_pairs());
        self.query_page(request, vec![Tag::all(TagKind::Order)], "orders")
            .await
    }

    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<(), ClientError> {
        self.require_admin()?;
        let request = ApiRequest::patch(format!("/orders/{}/status", path_segment(id)?))
            .json(&json!({ "status": status }))?;
        self.mutate_ack(request, &order_tags(id), "order status")
            .await?;
        tracing::info!(order_id = id, %status, "Order status updated");
        Ok(())
    }

    pub async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> Result<(), ClientError> {
        self.require_admin()?;
        let request = ApiRequest::patch(format!("/orders/{}/payment-status", path_segment(id)?))
            .json(&json!({ "paymentStatus": status }))?;
        self.mutate_ack(request, &order_tags(id), "payment status")
            .await?;
        tracing::info!(order_id = id, %status, "Payment status updated");
        Ok(())
    }
}

fn order_tags(id: &str) -> [Tag; 2] {
    [Tag::all(TagKind::Order), Tag::one(TagKind::Order, id)]
}

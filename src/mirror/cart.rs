use std::sync::Arc;

use super::Mirror;
use crate::api::{ApiClient, ClientError};
use crate::models::{CartItem, Money};

/// Cart lines plus totals derived from whatever lines remain.
#[derive(Default)]
pub struct CartMirror {
    lines: Mirror<CartItem>,
}

impl CartMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Arc<Vec<CartItem>> {
        self.lines.snapshot()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines.snapshot().iter().map(|item| item.quantity).sum()
    }

    pub fn total_amount(&self) -> Money {
        self.lines.snapshot().iter().map(CartItem::line_total).sum()
    }

    pub fn detach(&self) {
        self.lines.detach();
    }

    pub async fn load(&self, client: &ApiClient) -> Result<bool, ClientError> {
        self.lines.refresh(client.cart()).await
    }

    pub async fn set_quantity(
        &self,
        client: &ApiClient,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), ClientError> {
        if quantity == 0 {
            return self.remove(client, product_id).await;
        }
        self.lines
            .mutate(
                product_id,
                client.update_cart_quantity(product_id, quantity),
                |item| item.quantity = quantity,
            )
            .await
    }

    pub async fn remove(&self, client: &ApiClient, product_id: &str) -> Result<(), ClientError> {
        self.lines
            .remove(product_id, client.remove_from_cart(product_id))
            .await
    }

    pub async fn clear(&self, client: &ApiClient) -> Result<(), ClientError> {
        client.clear_cart().await?;
        self.lines.replace_all(Vec::new());
        Ok(())
    }
}

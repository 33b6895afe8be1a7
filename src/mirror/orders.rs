use parking_lot::RwLock;
use std::sync::Arc;

use super::Mirror;
use crate::api::{ApiClient, ClientError, ListQuery, PageMeta};
use crate::models::{CustomOrder, Order, OrderStatus, PaymentStatus};

/// Which order list a mirror follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Mine,
    All,
}

pub struct OrderMirror {
    scope: Scope,
    orders: Mirror<Order>,
    meta: RwLock<PageMeta>,
}

impl OrderMirror {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            orders: Mirror::new(),
            meta: RwLock::new(PageMeta::default()),
        }
    }

    pub fn orders(&self) -> Arc<Vec<Order>> {
        self.orders.snapshot()
    }

    pub fn meta(&self) -> PageMeta {
        *self.meta.read()
    }

    pub fn detach(&self) {
        self.orders.detach();
    }

    pub async fn load(&self, client: &ApiClient, query: &ListQuery) -> Result<bool, ClientError> {
        let ticket = self.orders.begin_fetch();
        let page = match self.scope {
            Scope::Mine => client.my_orders(query).await?,
            Scope::All => client.all_orders(query).await?,
        };
        let applied = self.orders.finish_fetch(ticket, page.items);
        if applied {
            *self.meta.write() = page.meta;
        }
        Ok(applied)
    }

    pub async fn set_status(
        &self,
        client: &ApiClient,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), ClientError> {
        self.orders
            .mutate(id, client.update_order_status(id, status), |order| {
                order.status = status
            })
            .await
    }

    pub async fn set_payment_status(
        &self,
        client: &ApiClient,
        id: &str,
        status: PaymentStatus,
    ) -> Result<(), ClientError> {
        self.orders
            .mutate(id, client.update_payment_status(id, status), |order| {
                order.payment_status = status
            })
            .await
    }
}

pub struct CustomOrderMirror {
    scope: Scope,
    orders: Mirror<CustomOrder>,
}

impl CustomOrderMirror {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            orders: Mirror::new(),
        }
    }

    pub fn orders(&self) -> Arc<Vec<CustomOrder>> {
        self.orders.snapshot()
    }

    pub fn detach(&self) {
        self.orders.detach();
    }

    pub async fn load(&self, client: &ApiClient, query: &ListQuery) -> Result<bool, ClientError> {
        let fetch = async {
            let page = match self.scope {
                Scope::Mine => client.my_custom_orders(query).await?,
                Scope::All => client.all_custom_orders(query).await?,
            };
            Ok::<_, ClientError>(page.items)
        };
        self.orders.refresh(fetch).await
    }

    pub async fn set_status(
        &self,
        client: &ApiClient,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), ClientError> {
        self.orders
            .mutate(id, client.update_custom_order_status(id, status), |order| {
                order.status = status
            })
            .await
    }

    pub async fn set_payment_status(
        &self,
        client: &ApiClient,
        id: &str,
        status: PaymentStatus,
    ) -> Result<(), ClientError> {
        self.orders
            .mutate(
                id,
                client.update_custom_order_payment_status(id, status),
                |order| order.payment_status = status,
            )
            .await
    }
}

use serde::{Deserialize, Serialize};

use super::catalog::ref_id;
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(deserialize_with = "ref_id", alias = "product")]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        Money::from_major(self.price).times(self.quantity)
    }
}

/// The cart endpoint sends either `{ items: [...] }` or the bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartPayload {
    Wrapped { items: Vec<CartItem> },
    List(Vec<CartItem>),
}

impl CartPayload {
    pub(crate) fn into_items(self) -> Vec<CartItem> {
        match self {
            CartPayload::Wrapped { items } => items,
            CartPayload::List(items) => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(deserialize_with = "ref_id", alias = "product")]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

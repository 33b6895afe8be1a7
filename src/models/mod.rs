//! Typed shapes of the marketplace API.

pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;
pub mod user;

pub use cart::{CartItem, WishlistItem};
pub use catalog::{
    Category, CategoryInput, CategoryNode, EmbeddedRef, EntityRef, FullTree, Product,
    ProductInput, Service, ServiceInput, Subcategory, SubcategoryInput, SubcategoryNode,
};
pub use money::Money;
pub use order::{
    CheckoutItem, CheckoutRequest, CustomOrder, CustomOrderItem, CustomOrderRequest, Order,
    OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
};
pub use user::{Credentials, Registration, UserProfile};

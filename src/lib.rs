pub mod api;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod mirror;
pub mod models;
pub mod session;

pub use api::{ApiClient, ClientError, ListQuery, Page, PageMeta};
pub use config::Config;
pub use gateway::{Gateway, HttpTransport, Transport};
pub use session::{Role, Session, SessionHandle, SessionUser};

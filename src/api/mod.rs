//! Typed access to the marketplace API.
//!
//! [`ApiClient`] owns the gateway and the query cache. Queries read through
//! the cache; mutations go straight to the gateway and invalidate the tags
//! they affect. Endpoint groups live in one file per resource.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod custom_orders;
pub mod envelope;
pub mod error;
pub mod orders;
pub mod users;
pub mod wishlist;

pub use envelope::{normalize_meta, Page, PageMeta, RawMeta};
pub use error::{ClientError, ErrorCode};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{QueryCache, Tag};
use crate::config::Config;
use crate::gateway::{ApiRequest, Gateway, HttpResponse, HttpTransport, Transport};
use crate::session::{FileSessionStorage, SessionHandle, SessionUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Paging, search and filter parameters shared by list endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search_term: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(term) = self.search_term.as_ref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("searchTerm".to_string(), term.trim().to_string()));
        }
        if let Some(field) = &self.sort_by {
            pairs.push(("sortBy".to_string(), field.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

pub struct ApiClient {
    gateway: Gateway,
    cache: QueryCache,
}

impl ApiClient {
    pub fn new(gateway: Gateway, cache_ttl: Duration) -> Self {
        Self {
            gateway,
            cache: QueryCache::new(cache_ttl),
        }
    }

    /// Restore the persisted session and connect to the configured API.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let storage = Arc::new(FileSessionStorage::new(&config.session.store_path));
        let session = SessionHandle::restore(storage)?;
        let transport = HttpTransport::new(&config.api, session.cookies().as_deref())?;
        tracing::debug!(base_url = transport.base_url(), "API client ready");

        Ok(Self::with_transport(
            Arc::new(transport),
            session,
            Duration::from_secs(config.cache.ttl_secs),
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        session: SessionHandle,
        cache_ttl: Duration,
    ) -> Self {
        Self::new(Gateway::new(transport, session), cache_ttl)
    }

    pub fn session(&self) -> &SessionHandle {
        self.gateway.session()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session().user()
    }

    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, ClientError> {
        self.gateway.execute(request).await
    }

    /// A logged-out session invalidates everything cached for it.
    fn observe<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(ClientError::SessionEnded) = &result {
            self.cache.clear();
        }
        result
    }

    async fn cached<T, F, Fut>(
        &self,
        request: &ApiRequest,
        tags: Vec<Tag>,
        fetch: F,
    ) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let key = cache_key(request);
        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(hit);
        }

        let value = self.observe(fetch().await)?;
        self.cache.insert(&key, tags, &value);
        Ok(value)
    }

    async fn query_data<T>(
        &self,
        request: ApiRequest,
        tags: Vec<Tag>,
        context: &str,
    ) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let req = &request;
        self.cached(req, tags, || async move {
            let response = self.send(req).await?;
            envelope::decode_data(&response, context)
        })
        .await
    }

    async fn query_page<T>(
        &self,
        request: ApiRequest,
        tags: Vec<Tag>,
        context: &str,
    ) -> Result<Page<T>, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let req = &request;
        self.cached(req, tags, || async move {
            let response = self.send(req).await?;
            envelope::decode_page(&response, context)
        })
        .await
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        invalidates: &[Tag],
        context: &str,
    ) -> Result<T, ClientError> {
        let response = self.send(&request).await?;
        let value = self.observe(envelope::decode_data(&response, context))?;
        self.cache.invalidate(invalidates);
        Ok(value)
    }

    async fn mutate_ack(
        &self,
        request: ApiRequest,
        invalidates: &[Tag],
        context: &str,
    ) -> Result<Option<String>, ClientError> {
        let response = self.send(&request).await?;
        let message = self.observe(envelope::decode_ack(&response, context))?;
        self.cache.invalidate(invalidates);
        Ok(message)
    }

    fn require_login(&self) -> Result<SessionUser, ClientError> {
        self.current_user().ok_or(ClientError::SessionEnded)
    }

    fn require_admin(&self) -> Result<SessionUser, ClientError> {
        let user = self.require_login()?;
        if user.role.is_admin() {
            Ok(user)
        } else {
            Err(ClientError::forbidden(format!(
                "admin role required, signed in as {}",
                user.role
            )))
        }
    }
}

fn cache_key(request: &ApiRequest) -> String {
    let mut query = request.query.clone();
    query.sort();
    let query = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{} {}?{}", request.method, request.path, query)
}

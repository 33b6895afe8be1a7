//! Response envelope decoding and pagination meta normalization.
//!
//! Every backend response is `{ success, data, meta?, message? }`. Decoding
//! happens here, once, so nothing past the client boundary sees raw shapes.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use super::error::ClientError;
use crate::gateway::HttpResponse;

/// The JSON wrapper every endpoint responds with.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub meta: Option<RawMeta>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Pagination meta as the backend emits it.
///
/// Some endpoints send `totalPage`, others `totalPages`; counts occasionally
/// arrive as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

/// Canonical pagination meta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub total_pages: u64,
    pub limit: u64,
    pub page: u64,
}

impl Default for PageMeta {
    fn default() -> Self {
        normalize_meta(None)
    }
}

impl From<PageMeta> for RawMeta {
    fn from(meta: PageMeta) -> Self {
        RawMeta {
            total: Some(meta.total),
            total_pages: Some(meta.total_pages),
            total_page: None,
            limit: Some(meta.limit),
            page: Some(meta.page),
        }
    }
}

/// Coalesce a raw meta into the canonical shape.
///
/// Missing counts default to 0 and a missing (or zero) page to 1. A non-zero
/// `totalPages` wins over `totalPage`.
pub fn normalize_meta(raw: Option<&RawMeta>) -> PageMeta {
    let raw = match raw {
        Some(raw) => raw.clone(),
        None => RawMeta::default(),
    };

    let total_pages = raw
        .total_pages
        .filter(|n| *n > 0)
        .or(raw.total_page)
        .or(raw.total_pages)
        .unwrap_or(0);

    PageMeta {
        total: raw.total.unwrap_or(0),
        total_pages,
        limit: raw.limit.unwrap_or(0),
        page: raw.page.filter(|n| *n > 0).unwrap_or(1),
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }))
}

/// A list result with normalized meta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn parse_envelope(response: &HttpResponse, context: &str) -> Result<Envelope, ClientError> {
    if !response.status.is_success() {
        return Err(ClientError::from_response(response.status, &response.body));
    }

    let envelope: Envelope = serde_json::from_slice(&response.body)
        .map_err(|e| ClientError::decode(context, e))?;

    if !envelope.success {
        return Err(ClientError::Api {
            status: response.status,
            message: envelope
                .message
                .unwrap_or_else(|| format!("{} was not successful", context)),
        });
    }

    Ok(envelope)
}

/// Decode the `data` field of a single-resource response.
pub fn decode_data<T: DeserializeOwned>(
    response: &HttpResponse,
    context: &str,
) -> Result<T, ClientError> {
    let envelope = parse_envelope(response, context)?;
    serde_json::from_value(envelope.data).map_err(|e| ClientError::decode(context, e))
}

/// Decode a list response. A 404 or a null `data` is an empty page.
pub fn decode_page<T: DeserializeOwned>(
    response: &HttpResponse,
    context: &str,
) -> Result<Page<T>, ClientError> {
    if response.status == reqwest::StatusCode::NOT_FOUND {
        return Ok(Page::empty());
    }

    let envelope = parse_envelope(response, context)?;
    let items = if envelope.data.is_null() {
        Vec::new()
    } else {
        serde_json::from_value(envelope.data).map_err(|e| ClientError::decode(context, e))?
    };

    Ok(Page {
        items,
        meta: normalize_meta(envelope.meta.as_ref()),
    })
}

/// Check a mutation response, returning the backend message if any.
pub fn decode_ack(response: &HttpResponse, context: &str) -> Result<Option<String>, ClientError> {
    parse_envelope(response, context).map(|e| e.message)
}

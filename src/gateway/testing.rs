//! Scripted in-memory transport for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};

use super::{ApiRequest, HttpResponse, Transport};
use crate::api::error::ClientError;

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// A call the transport saw, with the bearer it was given.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: ApiRequest,
    pub bearer: Option<String>,
}

/// Responses are queued per `METHOD path`; each call pops the next one.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: serde_json::Value) {
        self.script
            .lock()
            .entry(key(&method, path))
            .or_default()
            .push_back(Scripted::Respond(HttpResponse::json(status, &body)));
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.script
            .lock()
            .entry(key(&method, path))
            .or_default()
            .push_back(Scripted::Fail(message.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.request.method == method && c.request.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, ClientError> {
        self.calls.lock().push(RecordedCall {
            request: request.clone(),
            bearer: bearer.map(str::to_string),
        });

        let next = self
            .script
            .lock()
            .get_mut(&key(&request.method, &request.path))
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ClientError::Network(message)),
            None => Err(ClientError::Network(format!(
                "no scripted response for {}",
                key(&request.method, &request.path)
            ))),
        }
    }
}

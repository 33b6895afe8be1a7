//! Authenticated request gateway.
//!
//! Every API call goes through [`Gateway::execute`], which attaches the
//! session's bearer token and hides one kind of failure from callers: an
//! expired access token. On a 401 the gateway makes exactly one call to the
//! refresh endpoint and, if that yields a new token for a logged-in user,
//! replays the original request exactly once. Anything else is handed back
//! unchanged.

mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use transport::{path_segment, ApiRequest, HttpResponse, HttpTransport, Transport};

use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::envelope::decode_data;
use crate::api::error::ClientError;
use crate::session::SessionHandle;

/// Cookie-authenticated endpoint that mints a new access token.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Progress of one call through the gateway.
///
/// `RefreshPending -> Retried` happens at most once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Init,
    Sent,
    RefreshPending,
    Retried,
    Failed,
}

/// Final response of a call and the state the call ended in.
#[derive(Debug)]
pub struct Attempt {
    pub response: HttpResponse,
    pub state: AttemptState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Execute a request, refreshing the token once on 401.
    pub async fn execute(&self, request: &ApiRequest) -> Result<HttpResponse, ClientError> {
        self.attempt(request).await.map(|attempt| attempt.response)
    }

    /// Like [`execute`](Self::execute) but also reports the final state.
    pub async fn attempt(&self, request: &ApiRequest) -> Result<Attempt, ClientError> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &ApiRequest) -> Result<Attempt, ClientError> {
        let mut state = AttemptState::Init;
        let token = self.session.token();

        advance(&mut state, AttemptState::Sent);
        let first = self.transport.send(request, token.as_deref()).await?;
        if !first.is_unauthorized() {
            return Ok(Attempt {
                response: first,
                state,
            });
        }

        advance(&mut state, AttemptState::RefreshPending);
        let new_token = match self.refresh().await {
            Some(token) => token,
            None => {
                self.end_session();
                advance(&mut state, AttemptState::Failed);
                return Ok(Attempt {
                    response: first,
                    state,
                });
            }
        };

        advance(&mut state, AttemptState::Retried);
        let replay = self.transport.send(request, Some(&new_token)).await?;
        if replay.is_unauthorized() {
            tracing::warn!("Request still unauthorized after token refresh, ending session");
            self.end_session();
            advance(&mut state, AttemptState::Failed);
        }

        Ok(Attempt {
            response: replay,
            state,
        })
    }

    /// One refresh call. Returns the new token only if it was applied.
    async fn refresh(&self) -> Option<String> {
        let request = ApiRequest::post(REFRESH_PATH).with_credentials();

        let response = match self.transport.send(&request, None).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return None;
            }
        };

        let token = match decode_data::<RefreshData>(&response, "token refresh") {
            Ok(data) => data.access_token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh rejected");
                return None;
            }
        };

        let Some(token) = token else {
            tracing::warn!("Token refresh returned no access token");
            return None;
        };

        if !self.session.replace_token(token.clone()) {
            tracing::info!("Token refreshed but no user in session, staying logged out");
            return None;
        }

        self.sync_cookies();
        tracing::info!("Access token refreshed");
        Some(token)
    }

    /// Persist whatever cookies the transport now holds for the API.
    pub fn sync_cookies(&self) {
        self.session.remember_cookies(self.transport.cookie_header());
    }

    /// Drop the session and the cookies that came with it.
    pub fn end_session(&self) {
        self.transport.clear_cookies();
        self.session.clear();
    }
}

fn advance(state: &mut AttemptState, next: AttemptState) {
    tracing::trace!(from = ?*state, to = ?next, "Gateway state");
    *state = next;
}

//! Login, registration and logout.

use serde::Deserialize;

use super::{ApiClient, ClientError};
use crate::cache::{Tag, TagKind};
use crate::gateway::ApiRequest;
use crate::models::{Credentials, Registration, UserProfile};
use crate::session::{decode_user, SessionUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
}

impl ApiClient {
    /// Log in and start a session from the returned access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let request = ApiRequest::post("/auth/login")
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .with_credentials();

        let response = self.send(&request).await?;
        let data: LoginData = match super::envelope::decode_data(&response, "login") {
            Ok(data) => data,
            // Bad credentials come back as 401; that is not an expired session
            Err(ClientError::SessionEnded) => {
                return Err(ClientError::Validation {
                    message: "Invalid email or password".to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let user = decode_user(&data.access_token)?;
        self.cache.clear();
        self.session().establish(user.clone(), data.access_token);
        self.gateway.sync_cookies();

        tracing::info!(user = %user.subject_id, role = %user.role, "Logged in");
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::post("/users/register").json(registration)?;
        self.mutate(request, &[Tag::all(TagKind::User)], "registration")
            .await
    }

    /// End the session locally. The backend is told first, best effort.
    pub async fn logout(&self) {
        if self.session().token().is_some() {
            let request = ApiRequest::post("/auth/logout").with_credentials();
            match self.send(&request).await {
                Ok(response) if !response.status.is_success() => {
                    tracing::debug!(status = %response.status, "Backend logout not acknowledged")
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "Backend logout failed"),
            }
        }

        self.gateway.end_session();
        self.cache.clear();
        tracing::info!("Logged out");
    }

    /// Profile of the logged-in user.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let user = self.require_login()?;
        self.query_data(
            ApiRequest::get("/users/me"),
            vec![Tag::one(TagKind::User, user.subject_id)],
            "profile",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use crate::api::ClientError;
    use crate::gateway::REFRESH_PATH;
    use crate::session::{test_token, Role, Session};
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_establishes_session() {
        let (client, transport) = client(None);
        let token = test_token("u-9", "admin", 1_700_000_000, 1_700_086_400);
        transport.respond(
            Method::POST,
            "/auth/login",
            StatusCode::OK,
            json!({"success": true, "data": {"accessToken": token}}),
        );

        let user = client.login("a@b.c", "secret").await.unwrap();
        assert_eq!(user.subject_id, "u-9");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(client.session().token().as_deref(), Some(token.as_str()));

        let call = &transport.calls_to(Method::POST, "/auth/login")[0];
        assert!(call.request.with_credentials);
        assert_eq!(call.request.body.as_ref().unwrap()["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_a_validation_error() {
        let (client, transport) = client(None);
        transport.respond(
            Method::POST,
            "/auth/login",
            StatusCode::UNAUTHORIZED,
            json!({"success": false, "message": "Password is incorrect"}),
        );
        transport.respond(
            Method::POST,
            REFRESH_PATH,
            StatusCode::UNAUTHORIZED,
            json!({"success": false}),
        );

        let err = client.login("a@b.c", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
        assert_eq!(client.session().snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_if_backend_fails() {
        let (client, transport) = client(Some(Role::User));
        transport.fail(Method::POST, "/auth/logout", "offline");

        client.logout().await;
        assert_eq!(client.session().snapshot(), Session::default());
        assert_eq!(transport.calls_to(Method::POST, "/auth/logout").len(), 1);
    }

    #[tokio::test]
    async fn test_me_requires_login() {
        let (client, transport) = client(None);
        let err = client.me().await.unwrap_err();
        assert!(err.is_session_ended());
        assert!(transport.calls().is_empty());
    }
}

use serde_json::json;

use super::{ApiClient, ClientError, ListQuery, Page};
use crate::cache::{Tag, TagKind};
use crate::gateway::{path_segment, ApiRequest};
use crate::models::UserProfile;
use crate::session::Role;

impl ApiClient {
    pub async fn users(&self, query: &ListQuery) -> Result<Page<UserProfile>, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::get("/users").query_pairs(query.to_pairs());
        self.query_page(request, vec![Tag::all(TagKind::User)], "users")
            .await
    }

    pub async fn update_user_role(&self, id: &str, role: Role) -> Result<(), ClientError> {
        let admin = self.require_admin()?;
        if role == Role::Unknown {
            return Err(ClientError::Validation {
                message: "Unknown role".to_string(),
            });
        }
        if admin.subject_id == id {
            return Err(ClientError::forbidden("cannot change your own role"));
        }

        let request = ApiRequest::patch(format!("/users/{}/role", path_segment(id)?))
            .json(&json!({ "role": role }))?;
        self.mutate_ack(
            request,
            &[Tag::all(TagKind::User), Tag::one(TagKind::User, id)],
            "user role",
        )
        .await?;
        tracing::info!(user = id, %role, "User role updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use super::*;
    use reqwest::{Method, StatusCode};

    #[tokio::test]
    async fn test_users_listing() {
        let (client, transport) = client(Some(Role::Admin));
        transport.respond(
            Method::GET,
            "/users",
            StatusCode::OK,
            json!({
                "success": true,
                "data": [{"_id": "u-2", "name": "Nadia", "email": "n@example.com", "role": "user"}],
                "meta": {"total": 1, "totalPages": 1, "limit": 10, "page": 1}
            }),
        );
        let page = client.users(&ListQuery::new().limit(10)).await.unwrap();
        assert_eq!(page.items[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_role_change_payload() {
        let (client, transport) = client(Some(Role::SuperAdmin));
        transport.respond(Method::PATCH, "/users/u-2/role", StatusCode::OK, json!({"success": true}));
        client.update_user_role("u-2", Role::Admin).await.unwrap();
        let call = &transport.calls_to(Method::PATCH, "/users/u-2/role")[0];
        assert_eq!(call.request.body, Some(json!({"role": "admin"})));
    }

    #[tokio::test]
    async fn test_cannot_change_own_role() {
        let (client, transport) = client(Some(Role::Admin));
        let err = client.update_user_role("u-1", Role::User).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden { .. }));
        assert!(transport.calls().is_empty());
    }
}

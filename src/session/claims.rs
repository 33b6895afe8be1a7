//! Reading the session user out of an access token.
//!
//! The backend signs access tokens; the client never holds the key, so the
//! payload is decoded without signature verification. The token is only
//! trusted by the backend, never by this crate.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{Role, SessionUser};
use crate::api::error::ClientError;

/// Claims carried by a Bazar access token.
///
/// Tokens name the user `userId`, `_id` or `sub`; some carry more than one.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    role: Role,
    iat: i64,
    exp: i64,
}

/// Decode the user from an access token's payload.
pub fn decode_user(token: &str) -> Result<SessionUser, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    let claims = data.claims;
    let subject_id = claims
        .user_id
        .or(claims.id)
        .or(claims.sub)
        .ok_or_else(|| {
            ClientError::Token(jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(
                "userId".to_string(),
            )
            .into())
        })?;

    Ok(SessionUser {
        subject_id,
        role: claims.role,
        issued_at: timestamp(claims.iat),
        expires_at: timestamp(claims.exp),
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
pub(crate) fn test_token(id: &str, role: &str, iat: i64, exp: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = serde_json::json!({ "userId": id, "role": role, "iat": iat, "exp": exp });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-only-secret"),
    )
    .unwrap()
}

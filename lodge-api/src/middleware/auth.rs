use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lodge_core::{Actor, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn new(actor: &Actor, ttl: Duration) -> Self {
        Self {
            sub: actor.id,
            role: actor.role,
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role)
    }

    /// HS256 token for these claims.
    pub fn sign(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret.as_bytes()))
    }
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Resolves the bearer token into an [`Actor`] and stores it in the request extensions.
pub async fn require_actor(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("Malformed authorization header".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::AuthenticationError("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(token_data.claims.actor());

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_round_trip_through_token() {
        let actor = Actor::supplier(Uuid::new_v4());
        let token = Claims::new(&actor, Duration::minutes(5)).sign("secret").unwrap();

        let data = decode::<Claims>(&token, &DecodingKey::from_secret(b"secret"), &Validation::default()).unwrap();
        assert_eq!(data.claims.actor(), actor);
    }

    #[test]
    fn test_legacy_user_role_is_a_guest() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "6f1c2a9e-3b7d-4c5e-8f90-1a2b3c4d5e6f",
            "role": "user",
            "exp": 4102444800u64,
        }))
        .unwrap();
        assert_eq!(claims.role, Role::Guest);
    }
}

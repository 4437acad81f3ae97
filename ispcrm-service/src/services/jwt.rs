use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::User;

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

/// Claims carried by an access token. `sub` is the operator id that scopes
/// every ledger query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (operator id)
    pub sub: i64,
    /// Username, for display and audit logs
    pub username: String,
    /// Role
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_expiry_hours: config.token_expiry_hours,
        })
    }

    /// Generate an access token for an operator
    pub fn generate_token(&self, user: &User) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_expiry_hours);

        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    /// Validate and decode an access token
    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds (for client info)
    pub fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "a-test-secret-that-is-long-enough-for-hs256".to_string(),
            token_expiry_hours: 24,
        })
        .expect("Failed to build JWT service")
    }

    fn test_user() -> User {
        User {
            id: 42,
            username: "operator1".to_string(),
            password: "hash".to_string(),
            name: "Operator One".to_string(),
            email: Some("op@example.com".to_string()),
            role: "user".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let service = test_service();
        let token = service.generate_token(&test_user()).unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "operator1");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let mut token = service.generate_token(&test_user()).unwrap();
        token.push('x');
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "a-different-secret-also-long-enough-xxxx".to_string(),
            token_expiry_hours: 24,
        })
        .unwrap();

        let token = other.generate_token(&test_user()).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = JwtService::new(&JwtConfig {
            secret: String::new(),
            token_expiry_hours: 24,
        });
        assert!(result.is_err());
    }

    #[test]
    fn expiry_seconds_follows_config() {
        let service = test_service();
        assert_eq!(service.token_expiry_seconds(), 86_400);
    }
}

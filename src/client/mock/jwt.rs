use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

/// Claims of the mock backend's tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockClaims {
    pub sub: String,
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
    /// Session generation; tokens from an older generation are rejected
    pub epoch: u64,
}

/// HS256 token issuer for the mock backend
pub struct MockJwt {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: i64,
    refresh_token_days: i64,
}

impl MockJwt {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }

    fn issue(
        &self,
        user_id: &str,
        email: &str,
        token_type: &str,
        ttl: Duration,
        epoch: u64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = MockClaims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
            epoch,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn access_token(&self, user_id: &str, email: &str, epoch: u64) -> Result<String, JwtError> {
        self.issue(
            user_id,
            email,
            ACCESS,
            Duration::minutes(self.access_token_minutes),
            epoch,
        )
    }

    pub fn refresh_token(&self, user_id: &str, email: &str, epoch: u64) -> Result<String, JwtError> {
        self.issue(
            user_id,
            email,
            REFRESH,
            Duration::days(self.refresh_token_days),
            epoch,
        )
    }

    /// Validate signature, expiry and token type
    pub fn validate(&self, token: &str, token_type: &str) -> Result<MockClaims, JwtError> {
        let data = decode::<MockClaims>(token, &self.decoding_key, &Validation::default())?;
        if data.claims.token_type != token_type {
            return Err(JwtError::from(ErrorKind::InvalidToken));
        }
        Ok(data.claims)
    }
}

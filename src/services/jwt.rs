use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::accounts::model::Role;

/// Session tokens are stateless: there is no server-side revocation list, so a
/// token stays valid until `exp` even if the account is later removed.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,        // account id
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

pub struct JwtService {
    secret: String,
    session_duration: Duration,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            session_duration: Duration::hours(24),
        }
    }

    pub fn create_session_token(&self, user_id: &str, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + self.session_duration;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_session_token(&self, token: &str) -> Result<TokenData<SessionClaims>, jsonwebtoken::errors::Error> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
    }

    pub fn session_duration_secs(&self) -> i64 {
        self.session_duration.num_seconds()
    }
}

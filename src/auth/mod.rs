use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::{Role, User};

/// Claims carried by short-lived access tokens.
///
/// `email` and `role` are denormalized at issuance time and go stale if the
/// profile changes before the token expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by refresh tokens. Subject only; everything else is
/// resolved against the store when the token is exchanged.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secrets are not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    Generation(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("generated token failed structural check")]
    Malformed,
}

/// Signs and verifies both token kinds. Access and refresh tokens use
/// distinct secrets so one cannot stand in for the other.
pub struct TokenIssuer {
    access_encode: EncodingKey,
    access_decode: DecodingKey,
    refresh_encode: EncodingKey,
    refresh_decode: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            access_encode: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decode: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encode: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decode: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config() -> Result<Self, TokenError> {
        let security = &config::config().security;
        Self::new(
            &security.jwt_secret,
            &security.jwt_refresh_secret,
            Duration::minutes(security.access_token_ttl_minutes),
            Duration::days(security.refresh_token_ttl_days),
        )
    }

    /// Issue a short-lived access token encoding `{id, email, role}`.
    pub fn issue_access(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: (now + self.access_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.access_encode).map_err(TokenError::Generation)
    }

    /// Issue a refresh token encoding the subject id only.
    pub fn issue_refresh(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            id: user.id,
            exp: (now + self.refresh_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh_encode).map_err(TokenError::Generation)
    }

    /// Full cryptographic verification of a refresh token (signature and
    /// expiry) against the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(token, &self.refresh_decode, &Validation::default())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Full cryptographic verification of an access token.
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.access_decode, &Validation::default())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

/// Structural shape check only: a non-empty string of exactly three
/// dot-separated segments. Used right after issuance to catch generation
/// bugs, never to validate external input.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && token.split('.').count() == 3
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_user;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            "access-secret",
            "refresh-secret",
            Duration::minutes(15),
            Duration::days(7),
        )
        .expect("test issuer")
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = TokenIssuer::new("", "refresh", Duration::minutes(15), Duration::days(7));
        assert!(matches!(result, Err(TokenError::MissingSecret)));
    }

    #[test]
    fn issued_tokens_are_well_formed() {
        let issuer = issuer();
        let user = test_user("a@example.com");

        let access = issuer.issue_access(&user).unwrap();
        let refresh = issuer.issue_refresh(&user).unwrap();

        assert!(is_well_formed(&access));
        assert!(is_well_formed(&refresh));
    }

    #[test]
    fn refresh_round_trips_subject_id() {
        let issuer = issuer();
        let user = test_user("a@example.com");

        let refresh = issuer.issue_refresh(&user).unwrap();
        let claims = issuer.verify_refresh(&refresh).unwrap();

        assert_eq!(claims.id, user.id);
    }

    #[test]
    fn access_token_embeds_email_and_role() {
        let issuer = issuer();
        let user = test_user("someone@example.com");

        let access = issuer.issue_access(&user).unwrap();
        let claims = issuer.decode_access(&access).unwrap();

        assert_eq!(claims.email, "someone@example.com");
        assert_eq!(claims.role, user.role);
    }

    #[test]
    fn refresh_token_does_not_verify_as_access_token() {
        let issuer = issuer();
        let user = test_user("a@example.com");

        let refresh = issuer.issue_refresh(&user).unwrap();
        assert!(issuer.decode_access(&refresh).is_err());
    }

    #[test]
    fn structural_check_requires_three_segments() {
        assert!(is_well_formed("aaa.bbb.ccc"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("aaa.bbb"));
        assert!(!is_well_formed("aaa.bbb.ccc.ddd"));
    }
}

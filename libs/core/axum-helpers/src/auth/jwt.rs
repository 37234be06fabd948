use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime in seconds (15 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// Role name that grants administrative rights
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    /// `sub` parsed as a UUID, if it is one.
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Stateless HS256 token verification.
///
/// Token issuance lives with whatever identity service fronts the API;
/// [`JwtAuth::create_access_token`] exists for local tooling and tests.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        tracing::info!("JWT auth initialized");

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(ACCESS_TOKEN_TTL)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(secret: &str) -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(secret).unwrap())
    }

    #[test]
    fn test_issued_token_verifies() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!");
        let id = Uuid::now_v7().to_string();
        let token = auth
            .create_access_token(&id, "ann@example.com", "Ann", &["admin".to_string()])
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.is_admin());
        assert!(claims.subject_id().is_some());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = auth("this-is-a-valid-secret-with-32-chars!")
            .create_access_token("u", "u@example.com", "U", &[])
            .unwrap();

        assert!(
            auth("another-secret-that-is-also-32-chars-long")
                .verify_token(&token)
                .is_err()
        );
    }

    #[test]
    fn test_role_check_is_case_insensitive() {
        let claims = JwtClaims {
            sub: "x".into(),
            email: "x@example.com".into(),
            name: "X".into(),
            roles: vec!["Admin".into()],
            exp: 0,
            iat: 0,
            jti: "j".into(),
        };
        assert!(claims.is_admin());
        assert!(claims.subject_id().is_none());
    }
}

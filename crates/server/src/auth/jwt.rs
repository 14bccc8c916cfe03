use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use parley_core::Username;

use super::identity::CallerIdentity;

/// JWT claims embedded in issued tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Unique token ID.
    pub jti: String,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

/// Manages JWT issuance and validation.
///
/// Tokens are valid until expiry; there is no revocation list, so the
/// expiry window is the only bound on a leaked token's lifetime.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a JWT for the given username. Returns the token together
    /// with its lifetime in seconds.
    pub fn issue_token(&self, username: &Username) -> Result<(String, u64), String> {
        #[allow(clippy::cast_possible_truncation)]
        let exp = jsonwebtoken::get_current_timestamp() as usize + self.expiry_seconds as usize;

        let claims = Claims {
            sub: username.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            exp,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("JWT encoding failed: {e}"))?;

        Ok((token, self.expiry_seconds))
    }

    /// Validate a JWT's signature and expiry, returning the caller
    /// identity it names.
    pub fn validate_token(&self, token: &str) -> Result<CallerIdentity, String> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| format!("invalid token: {e}"))?;

        Ok(CallerIdentity {
            username: Username::new(token_data.claims.sub),
            auth_method: "jwt".to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_validate_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);
        let (token, expires_in) = manager.issue_token(&Username::new("alice")).unwrap();
        assert_eq!(expires_in, 3600);

        let identity = manager.validate_token(&token).unwrap();
        assert_eq!(identity.username.as_str(), "alice");
        assert_eq!(identity.auth_method, "jwt");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);
        let (token, _) = issuer.issue_token(&Username::new("alice")).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let manager = JwtManager::new("test-secret", 3600);
        assert!(manager.validate_token("not.a.jwt").is_err());
    }
}

//! Credential adapter: bcrypt password hashing and HS256 bearer tokens.
//!
//! Implements the domain's [`CredentialService`] port. Verification failures
//! (bad signature, expired, malformed claims) are authentication outcomes,
//! reported as `Ok(None)`; only mechanical faults become errors.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CredentialError, CredentialService};
use crate::domain::{EmailAddress, Identity, UserId};

/// Token lifetime applied when the configuration does not override it.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// JWT claim set carried by issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: String,
    /// The account email at issuance time.
    email: String,
    /// Expiry as a unix timestamp.
    exp: i64,
    /// Issued-at as a unix timestamp.
    iat: i64,
}

/// HS256 token issuer/verifier with bcrypt password hashing.
pub struct JwtCredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl JwtCredentialService {
    /// Build a credential service around a shared signing secret.
    pub fn new(secret: &[u8], ttl_secs: u64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs.min(i64::MAX as u64) as i64),
            bcrypt_cost,
        }
    }
}

impl CredentialService for JwtCredentialService {
    fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|err| CredentialError::hashing(err.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        bcrypt::verify(password, hash).map_err(|err| CredentialError::hashing(err.to_string()))
    }

    fn issue_token(&self, identity: &Identity) -> Result<String, CredentialError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.as_str().to_owned(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| CredentialError::token(err.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Option<Identity>, CredentialError> {
        let validation = Validation::new(Algorithm::HS256);
        let Ok(data) = decode::<Claims>(token, &self.decoding_key, &validation) else {
            return Ok(None);
        };

        // A token minted against a different schema fails verification, not
        // the request.
        let Ok(user_id) = data.claims.sub.parse::<UserId>() else {
            return Ok(None);
        };
        let Ok(email) = EmailAddress::parse(&data.claims.email) else {
            return Ok(None);
        };

        Ok(Some(Identity { user_id, email }))
    }
}

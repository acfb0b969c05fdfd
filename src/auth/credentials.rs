use base64::prelude::*;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Verified identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Player the credential was issued to.
    pub player_id: i32,
    /// Whether the player holds the admin role.
    pub is_admin: bool,
}

/// Reasons a token is refused.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The token is not three dot-separated segments.
    #[error("invalid token format")]
    InvalidFormat,
    /// A segment is not valid base64url.
    #[error("base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The header or claims are not valid JSON.
    #[error("token parsing error: {0}")]
    Parsing(#[from] serde_json::Error),
    /// The header names an algorithm other than HS256.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The signature does not match the secret.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The `exp` claim lies in the past.
    #[error("token expired")]
    Expired,
    /// The secret cannot key an HMAC.
    #[error("signing key rejected")]
    Key,
}

/// Turns a bearer credential into the identity it was issued for.
pub trait CredentialVerifier: Send + Sync {
    /// Check `token` and return the identity it carries.
    fn verify(&self, token: &str) -> Result<Principal, CredentialError>;
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by league session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Player identifier.
    pub id: i32,
    /// Player login email.
    pub email: String,
    /// Admin role flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
    /// Issue time as a unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// HS256 JSON Web Token verifier keyed with a shared secret.
#[derive(Clone)]
pub struct HmacCredentials {
    secret: Vec<u8>,
}

impl HmacCredentials {
    /// Verifier keyed with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, CredentialError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| CredentialError::Key)
    }

    /// Encode and sign `claims` as a compact token.
    pub fn sign(&self, claims: &Claims) -> Result<String, CredentialError> {
        let header = Header {
            alg: ALGORITHM.into(),
            typ: "JWT".into(),
        };
        let header = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signed = format!("{header}.{payload}");

        let mut mac = self.mac()?;
        mac.update(signed.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signed}.{signature}"))
    }

    /// Check the signature and expiry of `token` and return its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, CredentialError> {
        let mut segments = token.split('.');
        let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(CredentialError::InvalidFormat);
        };

        let header: Header = serde_json::from_slice(&decode_segment(header_segment)?)?;
        if header.alg != ALGORITHM {
            return Err(CredentialError::UnsupportedAlgorithm(header.alg));
        }

        let mut mac = self.mac()?;
        mac.update(header_segment.as_bytes());
        mac.update(b".");
        mac.update(payload_segment.as_bytes());
        mac.verify_slice(&decode_segment(signature_segment)?)
            .map_err(|_| CredentialError::InvalidSignature)?;

        let claims: Claims = serde_json::from_slice(&decode_segment(payload_segment)?)?;
        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(CredentialError::Expired);
        }
        Ok(claims)
    }
}

impl CredentialVerifier for HmacCredentials {
    fn verify(&self, token: &str) -> Result<Principal, CredentialError> {
        let claims = self.decode(token)?;
        Ok(Principal {
            player_id: claims.id,
            is_admin: claims.is_admin,
        })
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, CredentialError> {
    Ok(BASE64_URL_SAFE_NO_PAD.decode(segment.trim_end_matches('='))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> Claims {
        Claims {
            id: 7,
            email: "ada@league.test".into(),
            is_admin: true,
            exp: OffsetDateTime::now_utc().unix_timestamp() + exp_offset,
            iat: None,
        }
    }

    #[test]
    fn signed_token_verifies_to_its_principal() {
        let credentials = HmacCredentials::new("secret");
        let token = credentials.sign(&claims(3600)).unwrap();
        assert_eq!(
            credentials.verify(&token).unwrap(),
            Principal {
                player_id: 7,
                is_admin: true
            }
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = HmacCredentials::new("other").sign(&claims(3600)).unwrap();
        assert!(matches!(
            HmacCredentials::new("secret").verify(&token),
            Err(CredentialError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let credentials = HmacCredentials::new("secret");
        let token = credentials.sign(&claims(-10)).unwrap();
        assert!(matches!(
            credentials.verify(&token),
            Err(CredentialError::Expired)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let credentials = HmacCredentials::new("secret");
        assert!(matches!(
            credentials.verify("not-a-token"),
            Err(CredentialError::InvalidFormat)
        ));
        assert!(credentials.verify("a.b.c").is_err());
    }

    #[test]
    fn missing_admin_claim_means_regular_player() {
        let credentials = HmacCredentials::new("secret");
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let exp = OffsetDateTime::now_utc().unix_timestamp() + 60;
        let payload = BASE64_URL_SAFE_NO_PAD
            .encode(format!(r#"{{"id":3,"email":"b@league.test","exp":{exp}}}"#));
        let mut mac = credentials.mac().unwrap();
        mac.update(format!("{header}.{payload}").as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let principal = credentials
            .verify(&format!("{header}.{payload}.{signature}"))
            .unwrap();
        assert_eq!(principal.player_id, 3);
        assert!(!principal.is_admin);
    }
}

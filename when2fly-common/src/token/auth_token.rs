use crate::token::{Expiring, HmacSha256Verifier, Token};

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::Mac;
use serde::{Deserialize, Serialize};

use super::HmacSha256;

/// Identity asserted by the sign-in boundary for one caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: String,
    #[serde(rename = "eml")]
    pub user_email: String,
    #[serde(rename = "nam")]
    pub user_name: String,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAuthTokenClaims<'a> {
    #[serde(rename = "uid")]
    pub user_id: &'a str,
    #[serde(rename = "eml")]
    pub user_email: &'a str,
    #[serde(rename = "nam")]
    pub user_name: &'a str,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl Expiring for AuthTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

pub struct AuthToken {}

impl AuthToken {
    pub fn sign_new(claims: NewAuthTokenClaims, signing_key: &[u8]) -> String {
        let mut token_unencoded =
            serde_json::to_vec(&claims).expect("Failed to transform claims into JSON");

        let mut mac = HmacSha256::new_from_slice(signing_key).expect("HMAC key should not fail");
        mac.update(&token_unencoded);
        let signature = mac.finalize();
        token_unencoded.extend_from_slice(&signature.into_bytes());

        b64_urlsafe.encode(&token_unencoded)
    }
}

impl Token for AuthToken {
    type Claims = AuthTokenClaims;
    type Verifier = HmacSha256Verifier;

    fn token_name() -> &'static str {
        "AuthToken"
    }
}

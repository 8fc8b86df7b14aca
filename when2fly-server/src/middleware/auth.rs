use when2fly_common::token::auth_token::{AuthToken, AuthTokenClaims};
use when2fly_common::token::{Token, TokenError};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};
use futures::future;

use crate::env;
use crate::handlers::error::HttpErrorResponse;

const BEARER_PREFIX: &str = "Bearer ";

/// The caller identity, resolved from a signed bearer token.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub claims: AuthTokenClaims,
}

impl FromRequest for AuthenticatedUser {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match get_and_verify_claims(req, &env::CONF.token_signing_key) {
            Ok(claims) => future::ok(AuthenticatedUser { claims }),
            Err(e) => future::err(e.into()),
        }
    }
}

fn get_and_verify_claims(
    req: &HttpRequest,
    signing_key: &[u8],
) -> Result<AuthTokenClaims, TokenError> {
    let token = bearer_token(req).ok_or(TokenError::TokenMissing)?;

    let decoded_token = AuthToken::decode(token)?;
    decoded_token.verify(signing_key)?;

    Ok(decoded_token.into_claims())
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;

    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

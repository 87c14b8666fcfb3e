//! Authorization strategies for the HTTP API.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{AuthConfig, AuthMode};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid bearer token")]
    InvalidToken,
}

/// Decides whether a request may use a protected endpoint.
pub trait Authorizer: Send + Sync {
    /// `bearer` is the token from `Authorization: Bearer <token>`, if any.
    fn authorize(&self, bearer: Option<&str>) -> Result<(), AuthError>;

    fn mode(&self) -> &'static str;
}

/// Lets every request through.
#[derive(Debug, Default)]
pub struct OpenAccess;

impl Authorizer for OpenAccess {
    fn authorize(&self, _bearer: Option<&str>) -> Result<(), AuthError> {
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "open"
    }
}

/// Accepts a fixed set of static bearer tokens.
#[derive(Debug)]
pub struct BearerTokens {
    tokens: HashSet<String>,
}

impl BearerTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl Authorizer for BearerTokens {
    fn authorize(&self, bearer: Option<&str>) -> Result<(), AuthError> {
        let token = bearer.map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    fn mode(&self) -> &'static str {
        "bearer"
    }
}

/// Build the configured strategy.
pub fn from_config(config: &AuthConfig) -> Arc<dyn Authorizer> {
    match config.mode {
        AuthMode::Open => {
            tracing::warn!("API authorization is disabled (auth.mode = \"open\")");
            Arc::new(OpenAccess)
        }
        AuthMode::Bearer => Arc::new(BearerTokens::new(&config.tokens)),
    }
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

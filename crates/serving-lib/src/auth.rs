//! Bearer-token allow-list
//!
//! Tokens and per-token metadata (holder identity, permitted endpoint
//! list) are provisioned out-of-band through environment variables and
//! loaded once at startup. The registry is read-only afterwards.

use std::collections::HashMap;
use std::env;
use tracing::warn;

/// What one token is allowed to do
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccess {
    pub holder: String,
    /// Request paths this token may call; empty means every endpoint
    pub endpoints: Vec<String>,
}

/// Allow-list keyed by token value
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenAccess>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the allow-list from `TOKEN_n`/`HOLDER_n` pairs with their
    /// endpoint-list variables. Unset pairs are skipped.
    pub fn from_env() -> Self {
        let mut registry = Self::new();
        for (token_var, holder_var, endpoints_var) in [
            ("TOKEN_1", "HOLDER_1", "USER_ENDPOINTS"),
            ("TOKEN_2", "HOLDER_2", "DEV_ENDPOINTS"),
        ] {
            match env::var(token_var) {
                Ok(token) if !token.is_empty() => {
                    let holder = env::var(holder_var).unwrap_or_default();
                    registry.insert(token, holder, endpoints_from_env(endpoints_var));
                }
                _ => warn!(var = token_var, "Auth token variable not set, skipping"),
            }
        }
        registry
    }

    pub fn insert(
        &mut self,
        token: impl Into<String>,
        holder: impl Into<String>,
        endpoints: Vec<String>,
    ) {
        self.tokens.insert(
            token.into(),
            TokenAccess {
                holder: holder.into(),
                endpoints,
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn holder(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(|a| a.holder.as_str())
    }

    /// True when the token is known and permitted for the given path
    pub fn authorize(&self, token: &str, path: &str) -> bool {
        match self.tokens.get(token) {
            Some(access) => {
                access.endpoints.is_empty() || access.endpoints.iter().any(|e| e == path)
            }
            None => false,
        }
    }
}

fn endpoints_from_env(var: &str) -> Vec<String> {
    match env::var(var) {
        Ok(value) => value
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
/// Any other header shape yields no token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

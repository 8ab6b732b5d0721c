//! Static token resolver.
//!
//! Stand-in for the external identity provider: a fixed token → identity
//! map fed from configuration. Real deployments hand the server their own
//! [`IdentityResolver`] implementation at construction time.

use std::collections::HashMap;

use async_trait::async_trait;
use vantage_core::identity::{Identity, IdentityResolver};

use crate::config::TokenEntry;

/// Resolves tokens against a fixed in-memory map.
#[derive(Default)]
pub struct StaticResolver {
    tokens: HashMap<String, Identity>,
}

impl StaticResolver {
    /// Empty resolver — every token is anonymous.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration entries.
    #[must_use]
    pub fn from_entries(entries: &[TokenEntry]) -> Self {
        Self {
            tokens: entries
                .iter()
                .map(|entry| (entry.token.clone(), entry.identity()))
                .collect(),
        }
    }

    /// Add a token (builder style, used in tests and embedding hosts).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        let _ = self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).cloned()
    }
}

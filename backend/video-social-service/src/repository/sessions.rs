use super::IdGenerator;
use crate::error::{Result, ServiceError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Token -> user name mapping.
///
/// Tokens never expire and logging in again does not revoke older tokens.
pub struct SessionRegistry {
    tokens: RwLock<HashMap<String, String>>,
    token_length: usize,
}

impl SessionRegistry {
    pub fn new(token_length: usize) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            token_length,
        }
    }

    /// Issue a fresh token for `user_name`.
    pub async fn issue_token(&self, user_name: &str, ids: &IdGenerator) -> Result<String> {
        let mut tokens = self.tokens.write().await;
        let token = ids.next_unique(self.token_length, |candidate| {
            tokens.contains_key(candidate)
        })?;
        tokens.insert(token.clone(), user_name.to_string());
        Ok(token)
    }

    /// Resolve a token to the user name it was issued for.
    pub async fn resolve(&self, token: &str) -> Result<String> {
        let tokens = self.tokens.read().await;
        tokens
            .get(token)
            .cloned()
            .ok_or(ServiceError::NotAuthorized)
    }

    /// Number of tokens currently valid for `user_name`
    pub async fn active_sessions(&self, user_name: &str) -> usize {
        let tokens = self.tokens.read().await;
        tokens.values().filter(|owner| *owner == user_name).count()
    }
}

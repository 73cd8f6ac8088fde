use async_trait::async_trait;

/// Mints bearer tokens for outgoing searches.
///
/// Providers handle their own failures: a missing user or a failed refresh
/// yields `None` and the request goes out unauthenticated, leaving the
/// backend to reject it.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn id_token(&self, force_refresh: bool) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn id_token(&self, _force_refresh: bool) -> Option<String> {
        self.token.clone()
    }
}

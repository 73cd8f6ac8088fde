use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::error::SearchError;
use crate::types::{ErrorResponse, SearchResponse};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        page: u32,
        token: Option<&str>,
    ) -> Result<SearchResponse, SearchError>;
}

/// Talks to the portal backend's `GET /api/search`.
#[derive(Clone, Debug)]
pub struct HttpSearchBackend {
    endpoint: Url,
    http_client: reqwest::Client,
}

impl HttpSearchBackend {
    pub fn new(api_url: &str, http_client: reqwest::Client) -> Result<Self, SearchError> {
        let mut base = Url::parse(api_url)?;
        // Keep any path prefix on the origin when joining
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("api/search")?;
        Ok(Self {
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(
        &self,
        query: &str,
        page: u32,
        token: Option<&str>,
    ) -> Result<SearchResponse, SearchError> {
        info!("Searching for: {} (page {})", query, page);

        let page_param = page.to_string();
        let mut request = self
            .http_client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("page", page_param.as_str())])
            .header("Accept", "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        } else {
            debug!("no identity token, sending search unauthenticated");
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error);
            return Err(SearchError::Status { status, message });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        debug!(
            "backend returned {} results, has_more={}",
            parsed.results.len(),
            parsed.pagination.has_more
        );
        Ok(parsed)
    }
}

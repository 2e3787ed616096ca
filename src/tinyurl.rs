use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[async_trait]
pub trait LinkShortener: Send + Sync {
    /// Shorten `long_url`. `None` on any failure; callers skip the link.
    async fn shorten(&self, long_url: &str, token: &str) -> Option<String>;
}

pub struct TinyUrlClient {
    api_base: String,
    domain: String,
    client: reqwest::Client,
}

impl TinyUrlClient {
    pub fn new(api_base: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            domain: domain.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    url: &'a str,
    domain: &'a str,
}

#[derive(Deserialize)]
struct CreateResponse {
    data: Option<CreateData>,
}

#[derive(Deserialize)]
struct CreateData {
    tiny_url: Option<String>,
}

#[async_trait]
impl LinkShortener for TinyUrlClient {
    async fn shorten(&self, long_url: &str, token: &str) -> Option<String> {
        debug!(long_url, token_len = token.len(), "shortening link");

        let resp = self
            .client
            .post(format!("{}/create", self.api_base))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&CreateRequest {
                url: long_url,
                domain: &self.domain,
            })
            .send()
            .await;
        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "TinyURL request failed");
                return None;
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "TinyURL response unreadable");
                return None;
            }
        };
        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "TinyURL returned an error");
            return None;
        }

        let parsed: CreateResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "TinyURL response did not parse");
                return None;
            }
        };
        match parsed
            .data
            .and_then(|d| d.tiny_url)
            .filter(|u| !u.trim().is_empty())
        {
            Some(short) => {
                info!(short_url = %short, "link shortened");
                Some(short)
            }
            None => {
                warn!("TinyURL response has no tiny_url");
                None
            }
        }
    }
}

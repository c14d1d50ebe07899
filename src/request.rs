use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};

use crate::Result;

/// Raw response of a single listing-page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub const TOO_MANY_REQUESTS: u16 = 429;

    pub fn is_rate_limited(&self) -> bool {
        self.status == Self::TOO_MANY_REQUESTS
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Requests `url` once. Non-success statuses are returned, not turned into errors.
    async fn fetch(&self, url: &str) -> Result<Page>;
}

pub struct ReqwestFetcher {
    client: Client,
    user_agent: Option<String>,
}

impl ReqwestFetcher {
    pub fn new(user_agent: Option<String>) -> Self {
        Self {
            client: Client::new(),
            user_agent,
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let mut req = self.client.get(url);
        if let Some(agent) = &self.user_agent {
            req = req.header(USER_AGENT, agent);
        }
        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(Page { status, body })
    }
}

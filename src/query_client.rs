//! Read-only JSON lookups against the MediaWiki and Wikidata APIs.

use crate::config::{CheckerConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::ClientBuilder;
use serde_json::Value;
use std::time::Duration;

/// Issues a single GET request and returns the JSON body.
///
/// Implementations never return errors: any failure is logged and reported as `None`,
/// which callers treat the same as "not found".
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpQueryClient {
    user_agent: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpQueryClient {
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        Self::with_settings(&config.user_agent, config.timeout())
    }

    fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Self::client_builder(user_agent, timeout).build()?;
        Ok(Self {
            user_agent: user_agent.to_string(),
            timeout,
            client,
        })
    }

    /// Returns a reqwest client builder with the given user agent and timeout.
    pub fn client_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
        reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.client = Self::client_builder(user_agent, self.timeout).build()?;
        self.user_agent = user_agent.to_string();
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.client = Self::client_builder(&self.user_agent, timeout).build()?;
        self.timeout = timeout;
        Ok(())
    }

    async fn try_get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        match self.try_get_json(url, params).await {
            Ok(j) => Some(j),
            Err(e) => {
                tracing::warn!(url, ?params, error = %e, "Request failed");
                None
            }
        }
    }
}

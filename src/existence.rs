//! Existence probes for wikis and pages.

use crate::query_client::QueryClient;
use crate::wiki_site::WikiSite;
use serde_json::Value;
use std::sync::Arc;

/// Key MediaWiki uses in `query.pages` for a title that does not exist.
pub const MISSING_PAGE_KEY: &str = "-1";

#[derive(Clone)]
pub struct ExistenceChecker {
    client: Arc<dyn QueryClient>,
}

impl ExistenceChecker {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client }
    }

    /// A wiki exists if its site info can be retrieved and is not empty.
    pub async fn wiki_exists(&self, site: &WikiSite) -> bool {
        let params = [("action", "query"), ("meta", "siteinfo"), ("format", "json")];
        match self.client.get_json(site.api_url(), &params).await {
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    /// A page exists unless the wiki reports it under the missing-page key.
    /// A failed lookup counts as "does not exist".
    pub async fn page_exists(&self, title: &str, site: &WikiSite) -> bool {
        let params = [("action", "query"), ("titles", title), ("format", "json")];
        match self.client.get_json(site.api_url(), &params).await {
            Some(j) => j["query"]["pages"].get(MISSING_PAGE_KEY).is_none(),
            None => false,
        }
    }
}

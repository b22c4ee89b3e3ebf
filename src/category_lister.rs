//! Lists the visible categories of a page.

use crate::config::ListingConfig;
use crate::query_client::QueryClient;
use crate::title::strip_namespace;
use crate::wiki_site::WikiSite;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CategoryLister {
    client: Arc<dyn QueryClient>,
    listing: ListingConfig,
}

impl CategoryLister {
    pub fn new(client: Arc<dyn QueryClient>, listing: ListingConfig) -> Self {
        Self { client, listing }
    }

    /// Returns the non-hidden categories of a page, without namespace prefix, in API order.
    ///
    /// Hidden categories are filtered by the wiki (`clshow=!hidden`).
    /// A failed request and a page without categories both give an empty list.
    /// Unless `follow_continuation` is set, only the first batch is returned.
    pub async fn categories_of(&self, title: &str, site: &WikiSite) -> Vec<String> {
        let mut ret = vec![];
        let mut continuation: Vec<(String, String)> = vec![];
        let max_batches = if self.listing.follow_continuation {
            self.listing.max_batches.max(1)
        } else {
            1
        };
        for batch in 0..max_batches {
            let mut params = vec![
                ("action", "query"),
                ("titles", title),
                ("prop", "categories"),
                ("cllimit", self.listing.limit.as_str()),
                ("clshow", "!hidden"),
                ("format", "json"),
            ];
            params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            let j = match self.client.get_json(site.api_url(), &params).await {
                Some(j) => j,
                None => break,
            };
            ret.extend(Self::category_titles(&j));
            continuation = match Self::continuation(&j) {
                Some(c) => c,
                None => break,
            };
            if batch + 1 == max_batches && self.listing.follow_continuation {
                tracing::warn!(
                    title,
                    wiki = %site.dbname(),
                    batches = max_batches,
                    "Category listing truncated after maximum number of batches"
                );
            }
        }
        ret
    }

    fn category_titles(j: &Value) -> Vec<String> {
        let pages = match j["query"]["pages"].as_object() {
            Some(pages) => pages,
            None => return vec![],
        };
        pages
            .values()
            .filter_map(|page| page["categories"].as_array())
            .flatten()
            .filter_map(|c| c["title"].as_str())
            .map(strip_namespace)
            .collect()
    }

    /// The parameters to send with the next request, if the API indicated more results.
    fn continuation(j: &Value) -> Option<Vec<(String, String)>> {
        let cont = j["continue"].as_object()?;
        let ret: Vec<(String, String)> = cont
            .iter()
            .filter_map(|(k, v)| Some((k.to_owned(), v.as_str()?.to_string())))
            .collect();
        if ret.is_empty() {
            None
        } else {
            tracing::debug!(?ret, "Continuing category listing");
            Some(ret)
        }
    }
}

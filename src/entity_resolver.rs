//! Maps categories to Wikidata items and items to their titles on other wikis.

use crate::cache::{CategoryCache, TargetTitleCache};
use crate::config::CheckerConfig;
use crate::query_client::QueryClient;
use crate::title::category_page_title;
use crate::wiki_site::WikiSite;
use std::sync::Arc;

/// Key Wikidata uses in `entities` when no item matches a sitelink.
pub const MISSING_ENTITY_KEY: &str = "-1";

/// What happened to one source category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryResolution {
    /// The equivalent category title on the target wiki.
    Resolved(String),
    /// No item for the category, or the item has no sitelink on the target wiki.
    NoEquivalent,
    /// A remote lookup returned nothing.
    LookupFailed,
}

impl CategoryResolution {
    pub fn title(&self) -> Option<&str> {
        match self {
            CategoryResolution::Resolved(title) => Some(title),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CategoryResolution::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Found(String),
    NotFound,
    Failed,
}

impl Lookup {
    fn into_option(self) -> Option<String> {
        match self {
            Lookup::Found(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct EntityResolver {
    client: Arc<dyn QueryClient>,
    wikidata_api: String,
    category_cache: CategoryCache,
    target_cache: TargetTitleCache,
}

impl EntityResolver {
    /// Creates a resolver with fresh caches, as configured.
    pub fn new(client: Arc<dyn QueryClient>, config: &CheckerConfig) -> Self {
        Self::with_caches(
            client,
            &config.endpoints.wikidata_api,
            CategoryCache::new(config.category_cache_keying, &config.category_cache),
            TargetTitleCache::new(&config.target_cache),
        )
    }

    /// Creates a resolver using existing caches, e.g. to share them between resolvers.
    pub fn with_caches(
        client: Arc<dyn QueryClient>,
        wikidata_api: &str,
        category_cache: CategoryCache,
        target_cache: TargetTitleCache,
    ) -> Self {
        Self {
            client,
            wikidata_api: wikidata_api.to_string(),
            category_cache,
            target_cache,
        }
    }

    pub fn category_cache(&self) -> &CategoryCache {
        &self.category_cache
    }

    pub fn target_cache(&self) -> &TargetTitleCache {
        &self.target_cache
    }

    /// Returns the QID of the item that has `Category:<category>` as sitelink on the source wiki.
    pub async fn resolve_entity(&self, category: &str, source: &WikiSite) -> Option<String> {
        self.lookup_entity(category, source).await.into_option()
    }

    /// Returns the title of the item's sitelink on the target wiki.
    /// An absent or empty QID returns `None` without a remote call.
    pub async fn resolve_target_title(
        &self,
        qid: Option<&str>,
        target: &WikiSite,
    ) -> Option<String> {
        match qid {
            Some(qid) => self.lookup_target_title(qid, target).await.into_option(),
            None => None,
        }
    }

    /// Resolves a source category to its equivalent on the target wiki.
    pub async fn check_category(
        &self,
        category: &str,
        source: &WikiSite,
        target: &WikiSite,
    ) -> CategoryResolution {
        let qid = match self.lookup_entity(category, source).await {
            Lookup::Found(qid) => qid,
            Lookup::NotFound => return CategoryResolution::NoEquivalent,
            Lookup::Failed => return CategoryResolution::LookupFailed,
        };
        match self.lookup_target_title(&qid, target).await {
            Lookup::Found(title) => CategoryResolution::Resolved(title),
            Lookup::NotFound => CategoryResolution::NoEquivalent,
            Lookup::Failed => CategoryResolution::LookupFailed,
        }
    }

    async fn lookup_entity(&self, category: &str, source: &WikiSite) -> Lookup {
        if let Some(qid) = self.category_cache.get(category, source.language()) {
            tracing::debug!(category, %qid, "Category cache hit");
            return Lookup::Found(qid);
        }
        let dbname = source.dbname();
        let title = category_page_title(category);
        let params = [
            ("action", "wbgetentities"),
            ("sites", dbname.as_str()),
            ("titles", title.as_str()),
            ("format", "json"),
        ];
        let j = match self.client.get_json(&self.wikidata_api, &params).await {
            Some(j) => j,
            None => return Lookup::Failed,
        };
        let qid = j["entities"]
            .as_object()
            .and_then(|entities| entities.keys().find(|k| *k != MISSING_ENTITY_KEY))
            .cloned();
        match qid {
            Some(qid) => {
                self.category_cache
                    .insert(category, source.language(), &qid);
                Lookup::Found(qid)
            }
            None => Lookup::NotFound,
        }
    }

    async fn lookup_target_title(&self, qid: &str, target: &WikiSite) -> Lookup {
        if qid.is_empty() {
            return Lookup::NotFound;
        }
        if let Some(title) = self.target_cache.get(qid, target.language()) {
            tracing::debug!(qid, %title, "Target title cache hit");
            return Lookup::Found(title);
        }
        let params = [
            ("action", "wbgetentities"),
            ("ids", qid),
            ("props", "sitelinks"),
            ("format", "json"),
        ];
        let j = match self.client.get_json(&self.wikidata_api, &params).await {
            Some(j) => j,
            None => return Lookup::Failed,
        };
        match j["entities"][qid]["sitelinks"][target.dbname()]["title"].as_str() {
            Some(title) if !title.is_empty() => {
                self.target_cache.insert(qid, target.language(), title);
                Lookup::Found(title.to_string())
            }
            _ => Lookup::NotFound,
        }
    }
}

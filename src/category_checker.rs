//! Finds the equivalents of a page's categories on another language edition.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use wikicatcheck::{CategoryChecker, CheckerConfig};
//! let checker = CategoryChecker::new(&CheckerConfig::default())?;
//! let response = checker.check("en", "fr", "Dog").await;
//! println!("{}", serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```

use crate::category_lister::CategoryLister;
use crate::config::{CheckerConfig, Endpoints};
use crate::entity_resolver::{CategoryResolution, EntityResolver};
use crate::existence::ExistenceChecker;
use crate::query_client::{HttpQueryClient, QueryClient};
use crate::title::{normalize_language, normalize_title};
use crate::wiki_site::WikiSite;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failures that end a check before any category is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Source wiki '{0}' does not exist.")]
    SourceWikiMissing(String),
    #[error("Target wiki '{0}' does not exist.")]
    TargetWikiMissing(String),
    /// `wiki` is the database name (`zh_yuewiki`), which is also the Wikidata site id.
    #[error("Page '{title}' does not exist in {wiki}.")]
    PageMissing { title: String, wiki: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub category: String,
    pub resolution: CategoryResolution,
}

/// The result of a successful check, with the outcome for every source category.
#[derive(Debug, Clone)]
pub struct CheckReport {
    source: WikiSite,
    target: WikiSite,
    page_title: String,
    outcomes: Vec<CategoryOutcome>,
}

impl CheckReport {
    pub fn source(&self) -> &WikiSite {
        &self.source
    }

    pub fn target(&self) -> &WikiSite {
        &self.target
    }

    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    pub fn outcomes(&self) -> &[CategoryOutcome] {
        &self.outcomes
    }

    /// The resolved target-wiki titles, in source listing order. Duplicates are kept.
    pub fn categories(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.resolution.title())
            .map(|s| s.to_string())
            .collect()
    }

    /// Resolved titles with their URLs on the target wiki.
    pub fn resolved_links(&self) -> Vec<(String, String)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.resolution.title())
            .map(|title| (title.to_string(), self.target.article_url(title)))
            .collect()
    }
}

/// What the web layer returns: `{"error": "..."}` or `{"categories": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckResponse {
    Error { error: String },
    Categories { categories: Vec<String> },
}

impl From<Result<CheckReport, CheckError>> for CheckResponse {
    fn from(result: Result<CheckReport, CheckError>) -> Self {
        match result {
            Ok(report) => CheckResponse::Categories {
                categories: report.categories(),
            },
            Err(e) => CheckResponse::Error {
                error: e.to_string(),
            },
        }
    }
}

/// The body of an inbound check request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckRequest {
    pub source_lang: String,
    pub target_lang: String,
    pub page_title: String,
}

impl CheckRequest {
    pub async fn run(&self, checker: &CategoryChecker) -> CheckResponse {
        checker
            .check(&self.source_lang, &self.target_lang, &self.page_title)
            .await
    }
}

#[derive(Clone)]
pub struct CategoryChecker {
    endpoints: Endpoints,
    existence: ExistenceChecker,
    lister: CategoryLister,
    resolver: EntityResolver,
    resolve_concurrency: usize,
}

impl CategoryChecker {
    /// Creates a checker that talks to the configured wikis over HTTP.
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let client = Arc::new(HttpQueryClient::from_config(config)?);
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Arc<dyn QueryClient>, config: &CheckerConfig) -> Self {
        let resolver = EntityResolver::new(client.clone(), config);
        Self::with_resolver(client, config, resolver)
    }

    /// Creates a checker around an existing resolver, so its caches can be shared or scoped.
    pub fn with_resolver(
        client: Arc<dyn QueryClient>,
        config: &CheckerConfig,
        resolver: EntityResolver,
    ) -> Self {
        Self {
            endpoints: config.endpoints.clone(),
            existence: ExistenceChecker::new(client.clone()),
            lister: CategoryLister::new(client, config.listing.clone()),
            resolver,
            resolve_concurrency: config.resolve_concurrency.max(1),
        }
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Runs a check and collapses the result into the response shape.
    pub async fn check(
        &self,
        source_lang: &str,
        target_lang: &str,
        page_title: &str,
    ) -> CheckResponse {
        self.check_detailed(source_lang, target_lang, page_title)
            .await
            .into()
    }

    /// Runs a check, keeping the outcome of every source category.
    ///
    /// The wikis and the page are checked in order, and the first failure ends the check.
    /// Categories that cannot be resolved do not fail the check.
    pub async fn check_detailed(
        &self,
        source_lang: &str,
        target_lang: &str,
        page_title: &str,
    ) -> Result<CheckReport, CheckError> {
        let source_lang = normalize_language(source_lang);
        let target_lang = normalize_language(target_lang);
        let page_title = normalize_title(page_title);
        if source_lang.is_empty() || target_lang.is_empty() || page_title.is_empty() {
            return Err(CheckError::MissingFields);
        }

        let source = WikiSite::new(&source_lang, &self.endpoints);
        let target = WikiSite::new(&target_lang, &self.endpoints);
        if !self.existence.wiki_exists(&source).await {
            return Err(CheckError::SourceWikiMissing(source_lang));
        }
        if !self.existence.wiki_exists(&target).await {
            return Err(CheckError::TargetWikiMissing(target_lang));
        }
        if !self.existence.page_exists(&page_title, &source).await {
            return Err(CheckError::PageMissing {
                title: page_title,
                wiki: source.dbname(),
            });
        }

        let categories = self.lister.categories_of(&page_title, &source).await;
        let resolver = &self.resolver;
        let (source_ref, target_ref) = (&source, &target);
        let outcomes: Vec<CategoryOutcome> = stream::iter(categories)
            .map(move |category| async move {
                let resolution = resolver
                    .check_category(&category, source_ref, target_ref)
                    .await;
                CategoryOutcome {
                    category,
                    resolution,
                }
            })
            .buffered(self.resolve_concurrency)
            .collect()
            .await;

        tracing::debug!(
            page = %page_title,
            source = %source.dbname(),
            target = %target.dbname(),
            categories = outcomes.len(),
            resolved = outcomes.iter().filter(|o| o.resolution.is_resolved()).count(),
            "Category check done"
        );
        Ok(CheckReport {
            source,
            target,
            page_title,
            outcomes,
        })
    }
}

//! Finds which categories of a Wikipedia page exist on another language edition,
//! using Wikidata sitelinks to translate category titles.

pub mod cache;
pub mod category_checker;
pub mod category_lister;
pub mod config;
pub mod entity_resolver;
pub mod existence;
pub mod query_client;
pub mod title;
pub mod wiki_site;

#[cfg(test)]
pub(crate) mod test_support;

pub use category_checker::{CategoryChecker, CheckError, CheckReport, CheckRequest, CheckResponse};
pub use config::CheckerConfig;
pub use entity_resolver::{CategoryResolution, EntityResolver};
pub use query_client::{HttpQueryClient, QueryClient};

//! In-memory stand-in for the wiki and Wikidata APIs, recording every call.

use crate::config::{CheckerConfig, Endpoints};
use crate::query_client::QueryClient;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const WIKIDATA_API: &str = "https://wikidata.test/w/api.php";

pub fn test_endpoints() -> Endpoints {
    Endpoints {
        wiki_api: "https://{lang}.wiki.test/w/api.php".to_string(),
        wiki_article: "https://{lang}.wiki.test/wiki/{title}".to_string(),
        wikidata_api: WIKIDATA_API.to_string(),
    }
}

pub fn test_config() -> CheckerConfig {
    CheckerConfig {
        endpoints: test_endpoints(),
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub url: String,
    pub params: HashMap<String, String>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    pub fn is_wikidata(&self) -> bool {
        self.url == WIKIDATA_API
    }
}

#[derive(Debug, Clone)]
struct FakeCategory {
    title: String,
    hidden: bool,
}

#[derive(Debug, Default)]
pub struct FakeWikimedia {
    wikis: HashSet<String>,
    pages: HashMap<(String, String), Vec<FakeCategory>>,
    /// QID => (dbname => title)
    entities: Vec<(String, HashMap<String, String>)>,
    failing_titles: HashSet<String>,
    failing_ids: HashSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeWikimedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wiki(mut self, lang: &str) -> Self {
        self.wikis.insert(lang.to_string());
        self
    }

    /// Adds a page with visible categories, given with their namespace prefix.
    pub fn with_page(mut self, lang: &str, title: &str, categories: &[&str]) -> Self {
        let categories = categories
            .iter()
            .map(|c| FakeCategory {
                title: c.to_string(),
                hidden: false,
            })
            .collect();
        self.pages
            .insert((lang.to_string(), title.to_string()), categories);
        self
    }

    pub fn with_hidden_category(mut self, lang: &str, title: &str, category: &str) -> Self {
        self.pages
            .entry((lang.to_string(), title.to_string()))
            .or_default()
            .push(FakeCategory {
                title: category.to_string(),
                hidden: true,
            });
        self
    }

    /// Adds an entity with sitelinks, as (dbname, title) pairs.
    pub fn with_entity(mut self, qid: &str, sitelinks: &[(&str, &str)]) -> Self {
        let sitelinks = sitelinks
            .iter()
            .map(|(site, title)| (site.to_string(), title.to_string()))
            .collect();
        self.entities.push((qid.to_string(), sitelinks));
        self
    }

    /// Lookups of this sitelink title fail as if the request errored.
    pub fn failing_title(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    /// Sitelink lookups for this QID fail as if the request errored.
    pub fn failing_id(mut self, qid: &str) -> Self {
        self.failing_ids.insert(qid.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn wikidata_call_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_wikidata()).count()
    }

    pub fn category_listing_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.param("prop") == Some("categories"))
            .count()
    }

    fn wiki_language(url: &str) -> Option<&str> {
        url.strip_prefix("https://")?
            .strip_suffix(".wiki.test/w/api.php")
    }

    fn respond(&self, url: &str, params: &HashMap<String, String>) -> Option<Value> {
        if url == WIKIDATA_API {
            return self.respond_wikidata(
                param(params, "sites"),
                param(params, "titles"),
                param(params, "ids"),
            );
        }
        let lang = Self::wiki_language(url)?;
        if !self.wikis.contains(lang) {
            return None;
        }
        if param(params, "meta") == Some("siteinfo") {
            return Some(json!({
                "batchcomplete": "",
                "query": {"general": {"sitename": "Wikipedia", "lang": lang}}
            }));
        }
        let title = param(params, "titles")?;
        let categories = match self.pages.get(&(lang.to_string(), title.to_string())) {
            Some(categories) => categories,
            None => {
                return Some(json!({
                    "batchcomplete": "",
                    "query": {"pages": {"-1": {"ns": 0, "title": title, "missing": ""}}}
                }))
            }
        };
        let mut page = json!({"pageid": 123, "ns": 0, "title": title});
        let mut ret = json!({"batchcomplete": ""});
        if param(params, "prop") == Some("categories") {
            let visible: Vec<&FakeCategory> = categories
                .iter()
                .filter(|c| param(params, "clshow") != Some("!hidden") || !c.hidden)
                .collect();
            let offset = param(params, "clcontinue")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0);
            let limit = param(params, "cllimit")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(500);
            let end = (offset + limit).min(visible.len());
            let batch: Vec<Value> = visible[offset.min(end)..end]
                .iter()
                .map(|c| json!({"ns": 14, "title": c.title}))
                .collect();
            if !batch.is_empty() {
                page["categories"] = json!(batch);
            }
            if end < visible.len() {
                ret["continue"] = json!({"clcontinue": end.to_string(), "continue": "||"});
            }
        }
        ret["query"] = json!({"pages": {"123": page}});
        Some(ret)
    }

    fn respond_wikidata(
        &self,
        site: Option<&str>,
        title: Option<&str>,
        ids: Option<&str>,
    ) -> Option<Value> {
        let mut entities = Map::new();
        if let (Some(site), Some(title)) = (site, title) {
            if self.failing_titles.contains(title) {
                return None;
            }
            let found = self
                .entities
                .iter()
                .find(|(_, links)| links.get(site).map(|t| t.as_str()) == Some(title));
            match found {
                Some((qid, _)) => {
                    entities.insert(qid.clone(), json!({"type": "item", "id": qid}));
                }
                None => {
                    entities.insert(
                        "-1".to_string(),
                        json!({"site": site, "title": title, "missing": ""}),
                    );
                }
            }
        } else if let Some(qid) = ids {
            if self.failing_ids.contains(qid) {
                return None;
            }
            match self.entities.iter().find(|(id, _)| id == qid) {
                Some((_, links)) => {
                    let sitelinks: Map<String, Value> = links
                        .iter()
                        .map(|(site, title)| (site.clone(), json!({"site": site, "title": title})))
                        .collect();
                    entities.insert(
                        qid.to_string(),
                        json!({"type": "item", "id": qid, "sitelinks": sitelinks}),
                    );
                }
                None => {
                    entities.insert(qid.to_string(), json!({"id": qid, "missing": ""}));
                }
            }
        } else {
            return None;
        }
        Some(json!({"entities": entities, "success": 1}))
    }
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|s| s.as_str())
}

#[async_trait]
impl QueryClient for FakeWikimedia {
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            params: params.clone(),
        });
        self.respond(url, &params)
    }
}

/// The wiki universe used by the end-to-end tests: English and French Wikipedia,
/// the page "Dog" with two resolvable categories and one hidden category.
pub fn dog_wikimedia() -> FakeWikimedia {
    FakeWikimedia::new()
        .with_wiki("en")
        .with_wiki("fr")
        .with_page(
            "en",
            "Dog",
            &["Category:Domesticated animals", "Category:Canines"],
        )
        .with_hidden_category("en", "Dog", "Category:Hidden stuff")
        .with_entity(
            "Q1",
            &[
                ("enwiki", "Category:Domesticated animals"),
                ("frwiki", "Animaux domestiques"),
            ],
        )
        .with_entity(
            "Q2",
            &[("enwiki", "Category:Canines"), ("frwiki", "Canidés")],
        )
        .with_entity(
            "Q3",
            &[("enwiki", "Category:Hidden stuff"), ("frwiki", "Trucs cachés")],
        )
}

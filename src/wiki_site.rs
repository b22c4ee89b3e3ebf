//! Addressing for one language edition of Wikipedia.

use crate::config::Endpoints;
use crate::title::normalize_language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSite {
    language: String,
    api_url: String,
    article_url_template: String,
}

impl WikiSite {
    /// Creates a site for a language code. The code is normalized first.
    pub fn new(language: &str, endpoints: &Endpoints) -> Self {
        let language = normalize_language(language);
        let host_language = Self::host_language(&language);
        Self {
            api_url: endpoints.wiki_api.replace("{lang}", host_language),
            article_url_template: endpoints.wiki_article.replace("{lang}", host_language),
            language,
        }
    }

    /// Language codes whose wiki lives under a different host name.
    fn host_language(language: &str) -> &str {
        match language {
            "be-x-old" | "be_x_old" => "be-tarask",
            other => other,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The database name of the wiki, as used for Wikidata sitelinks
    /// ("en" => "enwiki", "zh-yue" => "zh_yuewiki").
    pub fn dbname(&self) -> String {
        let base = match self.language.as_str() {
            "be-tarask" | "be-x-old" | "be_x_old" => "be_x_old",
            other => other,
        };
        format!("{}wiki", base.replace('-', "_"))
    }

    /// Returns the URL of an article on this wiki.
    pub fn article_url(&self, title: &str) -> String {
        let title = urlencoding::encode(&title.replace(' ', "_")).into_owned();
        self.article_url_template.replace("{title}", &title)
    }
}

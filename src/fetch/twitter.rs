//! Twitter search feed filtered to `from:<name>`, following `next_page` fragments.

use super::{encode_component, CommentRecord, Feed, Page, Source};
use serde::Deserialize;
use serde_json::Value;

// Results stay raw so one odd entry cannot sink the rest of the page.
#[derive(Deserialize)]
struct SearchPage {
    results: Option<Vec<Value>>,
    next_page: Option<Value>,
}

#[derive(Deserialize)]
struct Tweet {
    id: Option<Value>,
    id_str: Option<String>,
    text: Option<String>,
}

impl Tweet {
    /// `id_str` when present, else the numeric or string `id`.
    fn external_id(&self) -> Option<String> {
        if let Some(s) = self.id_str.as_deref().filter(|s| !s.is_empty()) {
            return Some(s.to_string());
        }
        match self.id.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

pub struct TwitterFeed {
    base: String,
    username: String,
}

impl TwitterFeed {
    pub fn new(base: impl Into<String>, username: impl Into<String>) -> Self {
        Self { base: base.into(), username: username.into() }
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search.json{}", self.base, query)
    }
}

impl Feed for TwitterFeed {
    fn source(&self) -> Source {
        Source::Twitter
    }

    fn first_url(&self) -> String {
        self.search_url(&format!("?rpp=100&q=from%3A{}", encode_component(&self.username)))
    }

    fn parse_page(&self, page: &Value) -> Page {
        let parsed = match SearchPage::deserialize(page) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("twitter: unrecognized search page ({}), treating as end of feed", e);
                return Page::default();
            }
        };

        // no results key means the feed is done, whatever else the page says
        let Some(results) = parsed.results else {
            tracing::debug!("twitter: page without results, treating as end of feed");
            return Page::default();
        };

        let items = results
            .iter()
            .filter_map(|raw| match Tweet::deserialize(raw) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::debug!("twitter: skipping unreadable result ({})", e);
                    None
                }
            })
            .filter_map(|t| {
                let id = t.external_id()?;
                let text = t.text?;
                Some(CommentRecord { external_id: id, text })
            })
            .collect();

        let next_url = parsed
            .next_page
            .as_ref()
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(|n| self.search_url(n));

        Page { items, next_url }
    }
}

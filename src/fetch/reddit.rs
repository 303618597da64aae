//! Reddit user comment listing: `/user/<name>/comments.json`, 100 per page, `after` cursor.

use super::{encode_component, CommentRecord, Feed, Page, Source};
use serde::Deserialize;
use serde_json::Value;

const PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
struct Listing {
    data: Option<ListingData>,
}

// Children stay raw so one odd child cannot sink the rest of the page.
#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Value>,
    after: Option<Value>,
}

#[derive(Deserialize)]
struct Child {
    data: Option<ChildData>,
}

#[derive(Deserialize)]
struct ChildData {
    id: Option<String>,
    body: Option<String>,
}

pub struct RedditFeed {
    base: String,
    username: String,
}

impl RedditFeed {
    pub fn new(base: impl Into<String>, username: impl Into<String>) -> Self {
        Self { base: base.into(), username: username.into() }
    }

    fn page_url(&self, after: Option<&str>) -> String {
        let mut url = format!(
            "{}/user/{}/comments.json?limit={}",
            self.base,
            encode_component(&self.username),
            PAGE_SIZE
        );
        if let Some(after) = after {
            url.push_str("&after=");
            url.push_str(after);
        }
        url
    }
}

impl Feed for RedditFeed {
    fn source(&self) -> Source {
        Source::Reddit
    }

    fn first_url(&self) -> String {
        self.page_url(None)
    }

    fn parse_page(&self, page: &Value) -> Page {
        let data = match Listing::deserialize(page) {
            Ok(Listing { data: Some(data) }) => data,
            Ok(Listing { data: None }) => {
                tracing::debug!("reddit: listing without data, treating as end of feed");
                return Page::default();
            }
            Err(e) => {
                tracing::warn!("reddit: unrecognized listing ({}), treating as end of feed", e);
                return Page::default();
            }
        };

        let items = data
            .children
            .iter()
            .filter_map(|c| match Child::deserialize(c) {
                Ok(child) => child.data,
                Err(e) => {
                    tracing::debug!("reddit: skipping unreadable child ({})", e);
                    None
                }
            })
            .filter_map(|d| match (d.id, d.body) {
                (Some(id), Some(body)) if !id.is_empty() => Some(CommentRecord { external_id: id, text: body }),
                _ => None,
            })
            .collect();

        let next_url = data
            .after
            .as_ref()
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty())
            .map(|a| self.page_url(Some(a)));

        Page { items, next_url }
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REDDIT_BASE: &str = "http://www.reddit.com";
pub const DEFAULT_TWITTER_BASE: &str = "http://search.twitter.com";
pub const DEFAULT_CALAIS_ENDPOINT: &str = "http://api.opencalais.com/enlighten/rest/";

/// Which comment feeds to pull from. At least one must be on for a fetching run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sources {
    pub reddit: bool,
    pub twitter: bool,
}

impl Sources {
    pub fn reddit_only() -> Self { Self { reddit: true, twitter: false } }
    pub fn twitter_only() -> Self { Self { reddit: false, twitter: true } }
    pub fn both() -> Self { Self { reddit: true, twitter: true } }
    pub fn any(&self) -> bool { self.reddit || self.twitter }
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct MineOptions {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub db_path: Option<PathBuf>,     // if None, derived from username
    pub sources: Sources,
    pub summary_only: bool,           // skip fetch + annotate, report on an existing store
    pub progress: bool,               // show progress bar while annotating
    pub submitter: String,            // reported to the annotation service

    // network
    pub timeout: Duration,
    pub user_agent: String,
    pub max_pages: Option<usize>,     // per source; None means until the feed ends
    pub reddit_base: String,
    pub twitter_base: String,
    pub calais_endpoint: String,
}

impl Default for MineOptions {
    fn default() -> Self {
        Self {
            username: None,
            api_key: None,
            db_path: None,
            sources: Sources::default(),
            summary_only: false,
            progress: false,
            submitter: "usermine".to_string(),

            timeout: Duration::from_secs(30),
            user_agent: concat!("usermine/", env!("CARGO_PKG_VERSION")).to_string(),
            max_pages: None,
            reddit_base: DEFAULT_REDDIT_BASE.to_string(),
            twitter_base: DEFAULT_TWITTER_BASE.to_string(),
            calais_endpoint: DEFAULT_CALAIS_ENDPOINT.to_string(),
        }
    }
}

impl MineOptions {
    pub fn with_username(mut self, user: impl AsRef<str>) -> Self {
        self.username = Some(user.as_ref().trim().to_string());
        self
    }
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = Some(path.as_ref().to_path_buf());
        self
    }
    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }
    pub fn with_summary_only(mut self, yes: bool) -> Self {
        self.summary_only = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_submitter(mut self, name: impl Into<String>) -> Self {
        self.submitter = name.into();
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        // zero would make every request fail immediately
        self.timeout = timeout.max(Duration::from_secs(1));
        self
    }
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages.max(1));
        self
    }

    // endpoints, mostly for pointing at a local fixture server
    pub fn with_reddit_base(mut self, base: impl AsRef<str>) -> Self {
        self.reddit_base = base.as_ref().trim_end_matches('/').to_string();
        self
    }
    pub fn with_twitter_base(mut self, base: impl AsRef<str>) -> Self {
        self.twitter_base = base.as_ref().trim_end_matches('/').to_string();
        self
    }
    pub fn with_calais_endpoint(mut self, url: impl Into<String>) -> Self {
        self.calais_endpoint = url.into();
        self
    }
}

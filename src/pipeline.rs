use crate::annotate::{annotate_pending, AnnotateReport};
use crate::calais::{Annotator, CalaisClient};
use crate::config::{MineOptions, Sources};
use crate::fetch::{ingest, Feed, FeedStream, HttpTransport, IngestReport, JsonTransport, RedditFeed, Source, TwitterFeed};
use crate::store::CommentStore;
use crate::summary::{summarize, Summary};
use crate::util::default_db_filename;
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One mining run over a single user's store.
#[derive(Clone, Default)]
pub struct UserMine {
    pub(crate) opts: MineOptions,
}

/// Everything a run did, plus the final summary.
#[derive(Debug)]
pub struct MineReport {
    pub db_path: PathBuf,
    pub fetched: Vec<(Source, IngestReport)>,
    pub annotated: Option<AnnotateReport>,
    pub summary: Summary,
}

impl UserMine {
    pub fn new() -> Self {
        Self { opts: MineOptions::default() }
    }

    pub fn from_options(opts: MineOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn username(mut self, user: impl AsRef<str>) -> Self { self.opts = self.opts.with_username(user); self }
    pub fn api_key(mut self, key: impl Into<String>) -> Self { self.opts = self.opts.with_api_key(key); self }
    pub fn db_path(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_db_path(path); self }
    pub fn sources(mut self, sources: Sources) -> Self { self.opts = self.opts.with_sources(sources); self }
    pub fn summary_only(mut self, yes: bool) -> Self { self.opts = self.opts.with_summary_only(yes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn submitter(mut self, name: impl Into<String>) -> Self { self.opts = self.opts.with_submitter(name); self }
    pub fn timeout(mut self, timeout: Duration) -> Self { self.opts = self.opts.with_timeout(timeout); self }
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self { self.opts = self.opts.with_user_agent(ua); self }
    pub fn max_pages(mut self, pages: usize) -> Self { self.opts = self.opts.with_max_pages(pages); self }
    pub fn reddit_base(mut self, base: impl AsRef<str>) -> Self { self.opts = self.opts.with_reddit_base(base); self }
    pub fn twitter_base(mut self, base: impl AsRef<str>) -> Self { self.opts = self.opts.with_twitter_base(base); self }
    pub fn calais_endpoint(mut self, url: impl Into<String>) -> Self { self.opts = self.opts.with_calais_endpoint(url); self }

    pub fn options(&self) -> &MineOptions {
        &self.opts
    }

    /// Explicit `db_path`, else `usermine-<username>.db`.
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.opts.db_path {
            return Ok(p.clone());
        }
        let user = self.require_username()?;
        Ok(default_db_filename(user))
    }

    /// Run against the live services: HTTP feeds and the Calais endpoint.
    pub fn run(&self) -> Result<MineReport> {
        self.validate()?;
        if self.opts.summary_only {
            return self.report_only();
        }

        let transport = HttpTransport::new(self.opts.timeout, &self.opts.user_agent)
            .context("building HTTP client")?;
        let api_key = self.opts.api_key.clone().unwrap_or_default();
        let calais = CalaisClient::new(
            self.opts.calais_endpoint.clone(),
            api_key,
            self.opts.submitter.clone(),
            self.opts.timeout,
            &self.opts.user_agent,
        )
        .context("building annotation client")?;

        self.run_with(&transport, &calais)
    }

    /// Run with caller-supplied transport and annotator.
    pub fn run_with<A: Annotator + ?Sized>(&self, transport: &dyn JsonTransport, annotator: &A) -> Result<MineReport> {
        self.validate()?;
        if self.opts.summary_only {
            return self.report_only();
        }
        let user = self.require_username()?;
        let db_path = self.resolve_db_path()?;

        tracing::info!("Opening store {}", db_path.display());
        let store = CommentStore::open(&db_path)
            .with_context(|| format!("opening store {}", db_path.display()))?;

        let mut fetched = Vec::new();
        if self.opts.sources.reddit {
            let feed = RedditFeed::new(self.opts.reddit_base.clone(), user);
            fetched.push((Source::Reddit, self.fetch_into(&store, feed, transport)?));
        }
        if self.opts.sources.twitter {
            let feed = TwitterFeed::new(self.opts.twitter_base.clone(), user);
            fetched.push((Source::Twitter, self.fetch_into(&store, feed, transport)?));
        }

        let annotated = annotate_pending(&store, annotator, self.opts.progress)
            .context("annotating stored comments")?;

        let summary = summarize(&store).context("summarizing store")?;
        store.close().context("closing store")?;

        Ok(MineReport { db_path, fetched, annotated: Some(annotated), summary })
    }

    /// Summarize an existing store without touching the network.
    fn report_only(&self) -> Result<MineReport> {
        let db_path = self.resolve_db_path()?;
        if !db_path.exists() {
            bail!("store {} does not exist", db_path.display());
        }
        let store = CommentStore::open(&db_path)
            .with_context(|| format!("opening store {}", db_path.display()))?;
        let summary = summarize(&store).context("summarizing store")?;
        store.close().context("closing store")?;
        Ok(MineReport { db_path, fetched: Vec::new(), annotated: None, summary })
    }

    fn fetch_into<F: Feed>(&self, store: &CommentStore, feed: F, transport: &dyn JsonTransport) -> Result<IngestReport> {
        let source = feed.source();
        tracing::info!("Fetching {} comments", source);
        let stream = FeedStream::new(feed, transport).max_pages(self.opts.max_pages);
        let report = ingest(store, source, stream)
            .with_context(|| format!("storing {} comments", source))?;

        match &report.error {
            Some(e) => tracing::warn!(
                "{}: fetch stopped early after {} comments ({} new): {}",
                source, report.seen, report.inserted, e
            ),
            None => tracing::info!("{}: {} comments seen, {} new", source, report.seen, report.inserted),
        }
        Ok(report)
    }

    fn require_username(&self) -> Result<&str> {
        self.opts
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| anyhow!("username is required"))
    }

    fn validate(&self) -> Result<()> {
        self.require_username()?;
        if self.opts.summary_only {
            return Ok(());
        }
        if self.opts.api_key.as_deref().map_or(true, str::is_empty) {
            bail!("API key is required");
        }
        if !self.opts.sources.any() {
            bail!("at least one source (Reddit or Twitter) is required");
        }
        Ok(())
    }
}

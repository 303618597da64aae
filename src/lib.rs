mod config;
mod error;
mod util;
mod progress;

mod store;
mod fetch;
mod calais;
mod annotate;
mod counting;
mod summary;
mod pipeline;

pub use crate::config::{MineOptions, Sources};
pub use crate::error::{AnnotateError, FetchError, StoreError, StoreResult};
pub use crate::pipeline::{MineReport, UserMine};

// Store and its row type, for inspecting a mined database directly.
pub use crate::store::{CommentStore, StoredComment};

// Feeds: implement `JsonTransport` to serve pages from somewhere other than HTTP.
pub use crate::fetch::{
    ingest, CommentRecord, Feed, FeedStream, HttpTransport, IngestReport, JsonTransport, Page, RedditFeed, Source,
    TwitterFeed,
};

// Annotation client and the best-effort pass over pending comments.
pub use crate::calais::{parse_response, Annotation, Annotator, CalaisClient, MAX_CONTENT_BYTES};
pub use crate::annotate::{annotate_pending, AnnotateReport};

// Tally, ranking, and rendering.
pub use crate::counting::{rank, Tally, URL_PREFIX};
pub use crate::summary::{summarize, tally_store, Summary};

pub use crate::util::{default_db_filename, init_tracing_once};

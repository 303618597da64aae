#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use usermine::{ingest, CommentStore, FeedStream, FetchError, RedditFeed, Source, TwitterFeed};

fn two_page_reddit() -> CannedTransport {
    CannedTransport::new()
        .page(reddit_url("alice", None), reddit_page(&[("c1", "first"), ("c2", "second")], Some("t1_c2")))
        .page(reddit_url("alice", Some("t1_c2")), reddit_page(&[("c3", "third")], Some("")))
}

/// Two Reddit pages: the first carries an `after` cursor, the second an empty one.
/// Expectation: both pages are read, then the stream ends without a third request.
#[test]
fn reddit_follows_cursor_until_empty() {
    let transport = two_page_reddit();
    let feed = RedditFeed::new(REDDIT_BASE, "alice");

    let got: Vec<_> = FeedStream::new(feed, &transport).map(|r| r.unwrap().external_id).collect();

    assert_eq!(got, vec!["c1", "c2", "c3"]);
    assert_eq!(transport.request_count(), 2);
}

/// Ingesting the same unchanged feed twice writes each comment once.
#[test]
fn ingest_is_idempotent() {
    let transport = two_page_reddit();
    let store = CommentStore::open_in_memory().unwrap();

    let first = ingest(&store, Source::Reddit, FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)).unwrap();
    assert_eq!((first.seen, first.inserted), (3, 3));

    let second = ingest(&store, Source::Reddit, FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)).unwrap();
    assert_eq!((second.seen, second.inserted), (3, 0));
    assert!(second.error.is_none());

    assert_eq!(store.comment_count().unwrap(), 3);
}

/// A page whose shape is not a listing ends the stream quietly.
#[test]
fn malformed_page_is_end_of_stream() {
    let transport = CannedTransport::new()
        .page(reddit_url("alice", None), reddit_page(&[("c1", "first")], Some("t1_c1")))
        .page(reddit_url("alice", Some("t1_c1")), json!({"message": "Too Many Requests"}));

    let results: Vec<_> = FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport).collect();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_ok());
    assert_eq!(transport.request_count(), 2);
}

/// A feed that keeps handing back the cursor it was just asked for must not loop forever.
#[test]
fn repeated_cursor_terminates() {
    let transport = CannedTransport::new()
        .page(reddit_url("alice", None), reddit_page(&[("c1", "first")], Some("t1_c1")))
        .page(reddit_url("alice", Some("t1_c1")), reddit_page(&[("c2", "second")], Some("t1_c1")));

    let got: Vec<_> = FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)
        .map(|r| r.unwrap().external_id)
        .collect();

    assert_eq!(got, vec!["c1", "c2"]);
    assert_eq!(transport.request_count(), 2);
}

/// A network failure on page two stops that source; page one's rows stay stored.
#[test]
fn fetch_error_keeps_already_ingested_rows() {
    let transport = CannedTransport::new()
        .page(reddit_url("alice", None), reddit_page(&[("c1", "first"), ("c2", "second")], Some("t1_c2")))
        .fail(reddit_url("alice", Some("t1_c2")));
    let store = CommentStore::open_in_memory().unwrap();

    let report = ingest(&store, Source::Reddit, FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)).unwrap();

    assert_eq!(report.inserted, 2);
    assert!(matches!(report.error, Some(FetchError::Network(_))));
    assert_eq!(store.comment_count().unwrap(), 2);
}

/// Unknown user: the first page answers 404 and nothing is stored.
#[test]
fn status_error_on_first_page() {
    let transport = CannedTransport::new();
    let store = CommentStore::open_in_memory().unwrap();

    let report = ingest(&store, Source::Reddit, FeedStream::new(RedditFeed::new(REDDIT_BASE, "nobody"), &transport)).unwrap();

    assert_eq!(report.seen, 0);
    assert!(matches!(report.error, Some(FetchError::Status { status: 404, .. })));
    assert_eq!(transport.request_count(), 1);
}

/// Twitter search: `next_page` is appended verbatim; a page without `results` ends the feed.
#[test]
fn twitter_follows_next_page_until_results_missing() {
    let page2 = "?page=2&max_id=11&rpp=100&q=from%3Abob";
    let page3 = "?page=3&max_id=11&rpp=100&q=from%3Abob";
    let transport = CannedTransport::new()
        .page(
            twitter_url("?rpp=100&q=from%3Abob"),
            json!({"results": [{"id": 11, "text": "one"}, {"id": 12, "text": "two"}], "next_page": page2}),
        )
        .page(twitter_url(page2), json!({"results": [{"id": 13, "text": "three"}], "next_page": page3}))
        .page(twitter_url(page3), json!({"error": "page limit", "next_page": "?page=4"}));
    let store = CommentStore::open_in_memory().unwrap();

    let report = ingest(&store, Source::Twitter, FeedStream::new(TwitterFeed::new(TWITTER_BASE, "bob"), &transport)).unwrap();

    assert_eq!(report.inserted, 3);
    assert!(report.error.is_none());
    assert_eq!(transport.request_count(), 3);
    assert!(store.has_comment(Source::Twitter, "13").unwrap());
}

/// `max_pages` caps how far a long feed is followed.
#[test]
fn max_pages_caps_requests() {
    let transport = two_page_reddit();

    let mut stream = FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport).max_pages(Some(1));
    let got: Vec<_> = stream.by_ref().map(|r| r.unwrap().external_id).collect();

    assert_eq!(got, vec!["c1", "c2"]);
    assert_eq!(stream.pages_fetched(), 1);
    assert_eq!(transport.request_count(), 1);
}

/// One page mixes readable comments with a null body, an object body, and a bare
/// null child. The readable ones are yielded and the cursor is still followed.
#[test]
fn bad_children_do_not_sink_the_page() {
    let page1 = json!({"kind": "Listing", "data": {
        "after": "t1_c3",
        "children": [
            {"kind": "t1", "data": {"id": "c1", "body": "good"}},
            {"kind": "t1", "data": {"id": "c2", "body": null}},
            {"kind": "t1", "data": {"id": "c3", "body": {"weird": 1}}},
            null
        ]
    }});
    let transport = CannedTransport::new()
        .page(reddit_url("alice", None), page1)
        .page(reddit_url("alice", Some("t1_c3")), reddit_page(&[("c4", "after the odd ones")], Some("")));
    let store = CommentStore::open_in_memory().unwrap();

    let report = ingest(&store, Source::Reddit, FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)).unwrap();

    assert_eq!(report.inserted, 2);
    assert!(report.error.is_none());
    assert_eq!(transport.request_count(), 2);
    assert!(store.has_comment(Source::Reddit, "c1").unwrap());
    assert!(store.has_comment(Source::Reddit, "c4").unwrap());
    assert!(!store.has_comment(Source::Reddit, "c2").unwrap());
}

/// Same for Twitter: a null entry in `results` is skipped and `next_page` still followed.
#[test]
fn bad_results_do_not_sink_the_page() {
    let page2 = "?page=2&rpp=100&q=from%3Abob";
    let transport = CannedTransport::new()
        .page(
            twitter_url("?rpp=100&q=from%3Abob"),
            json!({"results": [{"id": 1, "text": "ok"}, null, {"id": 2, "text": 5}], "next_page": page2}),
        )
        .page(twitter_url(page2), json!({"results": [{"id": 3, "text": "later"}]}));

    let got: Vec<_> = FeedStream::new(TwitterFeed::new(TWITTER_BASE, "bob"), &transport)
        .map(|r| r.unwrap().external_id)
        .collect();

    assert_eq!(got, vec!["1", "3"]);
    assert_eq!(transport.request_count(), 2);
}

/// Cursors that cycle B -> C -> B stop once the stream is pointed back at a page it has read.
#[test]
fn cursor_cycle_terminates() {
    let transport = CannedTransport::new()
        .page(reddit_url("alice", None), reddit_page(&[("c1", "first")], Some("t1_b")))
        .page(reddit_url("alice", Some("t1_b")), reddit_page(&[("c2", "second")], Some("t1_c")))
        .page(reddit_url("alice", Some("t1_c")), reddit_page(&[("c3", "third")], Some("t1_b")));

    let got: Vec<_> = FeedStream::new(RedditFeed::new(REDDIT_BASE, "alice"), &transport)
        .map(|r| r.unwrap().external_id)
        .collect();

    assert_eq!(got, vec!["c1", "c2", "c3"]);
    assert_eq!(transport.request_count(), 3);
}

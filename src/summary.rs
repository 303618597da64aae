//! Ranked summary of a store, rendered as JSON or as indented text.

use crate::counting::{rank, Tally};
use crate::error::StoreResult;
use crate::store::CommentStore;
use serde::Serialize;
use std::io::{self, Write};

/// Three ranked `(name, count)` lists. Serializes as
/// `{"topics": [[name, n], ...], "entities": [...], "urls": [...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub topics: Vec<(String, u64)>,
    pub entities: Vec<(String, u64)>,
    pub urls: Vec<(String, u64)>,
}

impl Summary {
    pub fn from_tally(tally: &Tally) -> Self {
        Self {
            topics: rank(&tally.topics),
            entities: rank(&tally.entities),
            urls: rank(&tally.urls),
        }
    }

    /// Lists in output order, with their display titles.
    pub fn sections(&self) -> [(&'static str, &[(String, u64)]); 3] {
        [
            ("Topics", self.topics.as_slice()),
            ("Entities", self.entities.as_slice()),
            ("Urls", self.urls.as_slice()),
        ]
    }

    pub fn write_json<W: Write>(&self, w: &mut W, pretty: bool) -> serde_json::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *w, self)
        } else {
            serde_json::to_writer(&mut *w, self)
        }
    }

    /// ```text
    /// Topics:
    ///     Politics (3)
    ///
    /// ```
    pub fn write_human<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (title, items) in self.sections() {
            writeln!(w, "{}:", title)?;
            for (name, n) in items {
                writeln!(w, "    {} ({})", name, n)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

/// Read every stored entity and topic row into a fresh tally.
pub fn tally_store(store: &CommentStore) -> StoreResult<Tally> {
    let mut tally = Tally::default();
    for topic in store.topic_names()? {
        tally.add_topic(&topic);
    }
    for entity in store.entity_names()? {
        tally.add_entity(&entity);
    }
    Ok(tally)
}

pub fn summarize(store: &CommentStore) -> StoreResult<Summary> {
    Ok(Summary::from_tally(&tally_store(store)?))
}

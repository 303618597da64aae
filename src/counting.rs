//! Frequency tally over stored entity and topic names, and ranking.

use std::collections::BTreeMap;

/// Entity names with this exact prefix are counted as URLs.
pub const URL_PREFIX: &str = "http://";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub topics: BTreeMap<String, u64>,
    pub entities: BTreeMap<String, u64>,
    pub urls: BTreeMap<String, u64>,
}

impl Tally {
    pub fn add_topic(&mut self, name: &str) {
        *self.topics.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Case-sensitive prefix match only: "HTTP://x" and "https://x" stay entities.
    pub fn add_entity(&mut self, name: &str) {
        let bucket = if name.starts_with(URL_PREFIX) { &mut self.urls } else { &mut self.entities };
        *bucket.entry(name.to_string()).or_insert(0) += 1;
    }
}

/// Descending by count; equal counts fall back to ascending name.
pub fn rank(counts: &BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let mut v: Vec<(String, u64)> = counts.iter().map(|(k, n)| (k.clone(), *n)).collect();
    // BTreeMap iteration is already name-ordered, so a stable sort keeps the tie-break.
    v.sort_by(|a, b| b.1.cmp(&a.1));
    v
}

//! Grouping of the flat Atom entry list into weather categories.
//!
//! ```text
//! {"feed": {"@xml:lang": "en-ca", ..., "entry": [e0, e1, ...]}}
//!        │
//!        ▼
//! meta:                   META(feed)
//! "Warnings and Watches": [ENTRY(e0)]
//! "Current Conditions":   [ENTRY(e1)]
//! "Weather Forecasts":    [ENTRY(e2), ENTRY(e3), ...]
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::{self, Record};
use crate::tree::as_list;

/// The category term every feed entry is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    WarningsAndWatches,
    CurrentConditions,
    WeatherForecasts,
}

impl Category {
    /// Output order of the categories.
    pub const ALL: [Category; 3] = [
        Category::WarningsAndWatches,
        Category::CurrentConditions,
        Category::WeatherForecasts,
    ];

    pub const TERMS: [&'static str; 3] = [
        "Warnings and Watches",
        "Current Conditions",
        "Weather Forecasts",
    ];

    pub fn term(self) -> &'static str {
        match self {
            Category::WarningsAndWatches => Self::TERMS[0],
            Category::CurrentConditions => Self::TERMS[1],
            Category::WeatherForecasts => Self::TERMS[2],
        }
    }

    pub fn from_term(term: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.term() == term)
    }

    /// Post-processing applied to this category's entries on output.
    pub(crate) fn schema(self) -> &'static schema::Schema {
        match self {
            Category::WarningsAndWatches => &schema::WARNINGS,
            Category::CurrentConditions => &schema::CURRENT_CONDITIONS,
            Category::WeatherForecasts => &schema::FORECASTS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.term())
    }
}

/// Feed metadata plus one bucket of entry records per category seen.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSource {
    meta: Record,
    buckets: IndexMap<Category, Vec<Record>>,
}

impl GroupedSource {
    pub fn meta(&self) -> &Record {
        &self.meta
    }

    /// Entries of `category` in feed order; empty when the feed had none.
    pub fn entries(&self, category: Category) -> &[Record] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories present in the feed, in order of first appearance.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.buckets.keys().copied()
    }
}

/// Validate the feed metadata and bucket every entry by its category.
///
/// Any entry failing its schema fails the whole parse; there is no
/// skip-and-continue.
pub fn group(tree: &Value) -> Result<GroupedSource> {
    let feed = tree
        .get("feed")
        .ok_or_else(|| Error::violation("feed", "required key not provided", None))?;

    let meta = schema::META.validate_at(feed, "feed")?;

    let mut buckets: IndexMap<Category, Vec<Record>> = IndexMap::new();
    for (i, entry) in as_list(feed.get("entry")).iter().enumerate() {
        let path = format!("feed.entry[{i}]");
        let record = schema::ENTRY.validate_at(entry, &path)?;
        let term = record.get("category").and_then(Value::as_str);
        let category = term.and_then(Category::from_term).ok_or_else(|| {
            Error::violation(
                format!("{path}.category"),
                "unknown category term",
                record.get("category"),
            )
        })?;
        buckets.entry(category).or_default().push(record);
    }

    for (category, entries) in &buckets {
        tracing::debug!("{}: {} entries", category, entries.len());
    }
    Ok(GroupedSource { meta, buckets })
}

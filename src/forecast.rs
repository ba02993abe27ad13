//! The public facade: one location, one snapshot of its feed.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::parse::{self, Category, GroupedSource};
use crate::source::{FeedSource, HttpSource};
use crate::tree;

/// `aa-b123`: province, hyphen, optional letter, one to three digits.
static LOCATION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[a-z]?[0-9]{1,3}$").unwrap());

const BADGE_BASE_URL: &str = "https://weather.gc.ca/wxlink/wxlink.html";

const META_KEY: &str = "meta";

/// A validated, lowercased Environment Canada location code.
///
/// The code is visible in the city page URL, e.g.
/// `https://weather.gc.ca/city/pages/on-82_metric_e.html` is `on-82`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationCode(String);

impl LocationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the graphical forecast badge for this location.
    pub fn badge_url(&self) -> String {
        format!("{BADGE_BASE_URL}?cityCode={}&lang=e", self.0)
    }
}

impl FromStr for LocationCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.to_lowercase();
        if LOCATION_CODE.is_match(&code) {
            Ok(Self(code))
        } else {
            Err(Error::InvalidLocationCode(s.to_string()))
        }
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

struct Snapshot {
    grouped: GroupedSource,
    fetched_at: DateTime<Utc>,
}

/// Environment Canada weather for one location.
///
/// Construction fetches and parses the feed right away; [`refresh`] replaces
/// the held snapshot only once a new one has been fully built.
///
/// [`refresh`]: Forecast::refresh
pub struct Forecast {
    code: LocationCode,
    source: Box<dyn FeedSource>,
    snapshot: Snapshot,
}

impl Forecast {
    /// Fetch the live feed for `code` from weather.gc.ca.
    pub fn new(code: &str) -> Result<Self> {
        Self::with_source(code, Box::new(HttpSource::default()))
    }

    /// Like [`new`](Forecast::new) but fetching through `source`.
    ///
    /// An invalid code fails before `source` is touched.
    pub fn with_source(code: &str, source: Box<dyn FeedSource>) -> Result<Self> {
        let code: LocationCode = code.parse()?;
        let snapshot = load(source.as_ref(), &code)?;
        Ok(Self {
            code,
            source,
            snapshot,
        })
    }

    /// Re-fetch and re-parse. On failure the previous snapshot is kept.
    pub fn refresh(&mut self) -> Result<()> {
        match load(self.source.as_ref(), &self.code) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("refresh of {} failed, keeping previous snapshot: {}", self.code, e);
                Err(e)
            }
        }
    }

    pub fn location_code(&self) -> &LocationCode {
        &self.code
    }

    pub fn badge_url(&self) -> String {
        self.code.badge_url()
    }

    /// When the current snapshot was built.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.snapshot.fetched_at
    }

    pub fn snapshot(&self) -> &GroupedSource {
        &self.snapshot.grouped
    }

    /// Collate the snapshot into its final shape:
    ///
    /// ```text
    /// {
    ///     "meta": {lang, author, logo, rights, title, updated, badge},
    ///     "Warnings and Watches": [...],
    ///     "Current Conditions": [{title, data: {...}, published, updated}],
    ///     "Weather Forecasts": [...]
    /// }
    /// ```
    ///
    /// Every category key is present, empty when the feed had no entries.
    pub fn to_structure(&self) -> Result<Value> {
        let grouped = &self.snapshot.grouped;

        let mut meta = grouped.meta().clone();
        meta.insert("badge".to_string(), Value::String(self.badge_url()));

        let mut out = Map::new();
        out.insert(META_KEY.to_string(), Value::Object(meta));
        for category in Category::ALL {
            let schema = category.schema();
            let entries = grouped
                .entries(category)
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let path = format!("{}[{i}]", category.term());
                    schema
                        .validate_at(&Value::Object(entry.clone()), &path)
                        .map(Value::Object)
                })
                .collect::<Result<Vec<_>>>()?;
            out.insert(category.term().to_string(), Value::Array(entries));
        }
        Ok(Value::Object(out))
    }

    /// [`to_structure`](Forecast::to_structure) as JSON indented by four
    /// spaces.
    pub fn to_text(&self) -> Result<String> {
        Ok(render(&self.to_structure()?))
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.to_text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Forecast")
            .field("code", &self.code)
            .field("source", &self.source.name())
            .field("fetched_at", &self.snapshot.fetched_at)
            .finish_non_exhaustive()
    }
}

impl Serialize for Forecast {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_structure()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

/// Indented JSON rendering used by [`Forecast::to_text`].
pub fn render(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Serializing a Value into memory cannot fail.
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

fn load(source: &dyn FeedSource, code: &LocationCode) -> Result<Snapshot> {
    let bytes = source.fetch(code)?;
    tracing::debug!("{}: {} bytes from {}", code, bytes.len(), source.name());
    let tree = tree::from_bytes(&bytes)?;
    let grouped = parse::group(&tree)?;
    Ok(Snapshot {
        grouped,
        fetched_at: Utc::now(),
    })
}

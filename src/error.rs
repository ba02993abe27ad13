//! Error taxonomy shared by every stage of the pipeline.
//!
//! Nothing is retried or swallowed internally: a failed fetch, an
//! undecodable document or a record that does not match its schema aborts
//! the whole operation and surfaces here.

use serde_json::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The code does not look like `aa-b123`. Only raised at construction.
    #[error("{0:?} is not a valid location code")]
    InvalidLocationCode(String),

    #[error("failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),

    /// A deserialized record did not match the shape its schema expects.
    #[error("schema violation at {path}: {message} (received {received})")]
    SchemaViolation {
        /// Dotted path from the feed root, e.g. `feed.entry[3].category.@term`.
        path: String,
        message: String,
        received: String,
    },
}

impl Error {
    pub(crate) fn violation(
        path: impl Into<String>,
        message: impl Into<String>,
        received: Option<&Value>,
    ) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            message: message.into(),
            received: render_received(received),
        }
    }

    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }
}

/// Anything that prevents us from getting a Raw Feed Tree out of the
/// collaborators: transport, status, local I/O or XML decoding.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response status {0}")]
    Status(reqwest::StatusCode),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed feed document: {0}")]
    Xml(String),
}

impl From<xml::reader::Error> for FetchError {
    fn from(e: xml::reader::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

// Long summaries would drown the message, so cap what we echo back.
const RECEIVED_MAX: usize = 80;

fn render_received(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "<missing>".to_string();
    };
    let rendered = value.to_string();
    if rendered.chars().count() <= RECEIVED_MAX {
        rendered
    } else {
        let cut: String = rendered.chars().take(RECEIVED_MAX).collect();
        format!("{cut}...")
    }
}

//! Where feed documents come from.
//!
//! This module defines the [`FeedSource`] trait. Concrete sources live in
//! sub-modules: [`HttpSource`] talks to weather.gc.ca, [`DirSource`] reads
//! previously saved documents from disk.
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `cache.rs`).
//! 2. Define a struct and implement [`FeedSource`] for it.
//! 3. Add `mod cache;` below and re-export the struct.
//! 4. Hand it to [`Forecast::with_source`](crate::Forecast::with_source).
//!
//! Sources only move bytes. Decoding and validation happen in the
//! [`Forecast`](crate::Forecast) facade, so every source gets the same
//! treatment of malformed documents.

mod dir;
mod http;

pub use dir::DirSource;
pub use http::{HttpSource, DEFAULT_BASE_URL};

use crate::error::FetchError;
use crate::forecast::LocationCode;

/// Fetches the raw Atom document for one location.
///
/// Each [`Forecast`](crate::Forecast) owns its source, so implementations
/// only need to be [`Send`] for the forecast itself to move across threads.
///
/// ```ignore
/// pub struct MySource { /* config fields */ }
///
/// impl FeedSource for MySource {
///     fn name(&self) -> &str { "my-source" }
///
///     fn fetch(&self, code: &LocationCode) -> Result<Vec<u8>, FetchError> {
///         // Perform HTTP / IO and return the document bytes.
///         todo!()
///     }
/// }
/// ```
pub trait FeedSource: Send {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    /// Return the feed document for `code`, undecoded.
    fn fetch(&self, code: &LocationCode) -> Result<Vec<u8>, FetchError>;
}

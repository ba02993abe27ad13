//! weathergc — Environment Canada city forecasts as structured data.
//!
//! weather.gc.ca publishes an Atom feed per location. Each feed is a flat
//! list of entries tagged with a category term; this crate regroups them
//! into warnings, current conditions and forecasts, validating and cleaning
//! every field on the way.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ bytes ┌──────────┐ tree ┌──────────┐ GroupedSource ┌─────────────┐
//! │  source/  │ ────► │ tree.rs  │ ───► │ parse.rs │ ────────────► │ forecast.rs │
//! │ (fetch)   │       │ (xml)    │      │ (group)  │   snapshot    │ (collate)   │
//! └───────────┘       └──────────┘      └──────────┘               └─────────────┘
//!                                            │                           │
//!                                            └──── schema.rs ◄───────────┘
//!                                                 (validate/clean)
//! ```
//!
//! * **`source/`** — the [`FeedSource`] trait, HTTP and directory sources.
//! * **`tree`** — XML bytes to a JSON value tree.
//! * **`parse`** — splits the tree into metadata and per-category entries.
//! * **`schema`** — declarative validators for each record shape.
//! * **`normalize`** / **`html`** — field-level clean-up helpers.
//! * **`forecast`** — the [`Forecast`] facade owning one location's snapshot.
//!
//! ```no_run
//! let forecast = weathergc::Forecast::new("on-82")?;
//! println!("{}", forecast.to_text()?);
//! # Ok::<(), weathergc::Error>(())
//! ```

pub mod error;
pub mod forecast;
pub mod html;
pub mod normalize;
pub mod parse;
pub mod schema;
pub mod source;
pub mod tree;

pub use error::{Error, FetchError, Result};
pub use forecast::{Forecast, LocationCode};
pub use parse::{Category, GroupedSource};
pub use source::{DirSource, FeedSource, HttpSource};

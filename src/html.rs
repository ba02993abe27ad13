//! Key/value extraction from the current-conditions summary.
//!
//! The feed encodes observations as a run of
//! `<b>Key:</b> value <br/>` fragments. This is not an HTML parser: only that
//! literal micro-format is recognised and anything else is skipped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// One `<b>KEY:trailing</b>VALUE<br/>` fragment, confined to a single line.
/// The key runs to the last colon inside the bold region; the value stops at
/// the first `<br/>`.
static FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>([^<\n]*):[^<\n]*</b>([^\n]*?)<br/>").unwrap());

/// Map every fragment's trimmed key to its trimmed value.
///
/// Keys keep their order of first appearance; a repeated key takes the last
/// value seen.
pub fn html_to_map(html: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for caps in FRAGMENT.captures_iter(html) {
        let key = caps[1].trim();
        let value = caps[2].trim();
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    map
}

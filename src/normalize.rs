//! Field-level clean-up applied to feed text.
//!
//! Both functions are total: they never fail, and input without anything to
//! clean comes back unchanged (modulo trimming where noted).

/// Entity used by the feed for the degree sign inside HTML summaries.
const DEGREE_ENTITY: &str = "&deg;";
const DEGREE_SIGN: char = '\u{00B0}';

/// Marks the start of the issue-time trailer on every forecast summary.
const FORECAST_ISSUED: &str = "Forecast issued";

/// Replace every `&deg;` entity and every literal `°` with a single space.
///
/// `"24.2&deg;C"` and `"24.2°C"` both become `"24.2 C"`.
pub fn normalize_degree(text: &str) -> String {
    text.replace(DEGREE_ENTITY, " ").replace(DEGREE_SIGN, " ")
}

/// Drop the `Forecast issued ...` trailer and trim what remains.
///
/// Everything from the first occurrence of the phrase to the end of the text
/// is removed. Without the phrase the input is only trimmed.
pub fn strip_forecast_boilerplate(text: &str) -> String {
    let kept = match text.find(FORECAST_ISSUED) {
        Some(at) => &text[..at],
        None => text,
    };
    kept.trim().to_string()
}

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use weathergc::{Category, DirSource, Error, FeedSource, FetchError, Forecast, LocationCode};

const ON_1: &str = include_str!("data/on-1.xml");

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn fixture() -> Forecast {
    Forecast::with_source("on-1", Box::new(DirSource::new(data_dir()))).unwrap()
}

/// Hands out canned responses in order, then fails.
struct Scripted {
    responses: Mutex<VecDeque<Result<Vec<u8>, FetchError>>>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(responses: Vec<Result<Vec<u8>, FetchError>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            responses: Mutex::new(responses.into()),
            calls: calls.clone(),
        };
        (source, calls)
    }
}

impl FeedSource for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, _code: &LocationCode) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Xml("script exhausted".into())))
    }
}

fn ok(xml: &str) -> Result<Vec<u8>, FetchError> {
    Ok(xml.as_bytes().to_vec())
}

fn offline() -> Result<Vec<u8>, FetchError> {
    Err(FetchError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "offline",
    )))
}

#[test]
fn canonical_feed_is_collated() {
    let structure = fixture().to_structure().unwrap();

    let keys: Vec<&str> = structure.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["meta", "Warnings and Watches", "Current Conditions", "Weather Forecasts"]
    );

    let warnings = structure["Warnings and Watches"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0]["title"],
        "No watches or warnings in effect, Algonquin Park (Brent)"
    );
    assert_eq!(warnings[0]["summary"], "No watches or warnings in effect.");
    assert!(warnings[0].get("category").is_none());
    assert!(warnings[0].get("id").is_none());
    assert!(warnings[0].get("link").is_none());
}

#[test]
fn forecasts_keep_feed_order_and_lose_trailer() {
    let structure = fixture().to_structure().unwrap();
    let forecasts = structure["Weather Forecasts"].as_array().unwrap();

    assert_eq!(forecasts.len(), 13);
    assert_eq!(forecasts[0]["title"], "Sunday: Sunny. High 26.");
    assert_eq!(forecasts[1]["title"], "Sunday night: Clear. Low 8.");
    assert_eq!(forecasts[12]["title"], "Saturday: Chance of showers. High 21. POP 30%");
    assert_eq!(
        forecasts[0]["summary"],
        "Sunny. High 26. Humidex 28. UV index 7 or high."
    );
    for forecast in forecasts {
        let summary = forecast["summary"].as_str().unwrap();
        assert!(!summary.contains("Forecast issued"), "{summary}");
        assert_eq!(summary, summary.trim());
    }
}

#[test]
fn current_conditions_are_degree_free_and_tabulated() {
    let structure = fixture().to_structure().unwrap();
    let conditions = structure["Current Conditions"].as_array().unwrap();

    assert_eq!(conditions.len(), 1);
    let cc = &conditions[0];
    assert_eq!(cc["title"], "Current Conditions: 24.2 C");
    assert!(cc.get("summary").is_none());

    let keys: Vec<&str> = cc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["title", "updated", "published", "data"]);

    assert_eq!(
        cc["data"],
        json!({
            "Observed at": "Algonquin Park East Gate 3:00 PM EDT Sunday 04 September 2016",
            "Temperature": "24.2 C",
            "Pressure / Tendency": "102.5 kPa falling",
            "Humidity": "40 %",
            "Humidex": "25",
            "Dewpoint": "9.7 C",
            "Wind": "ESE 7 km/h",
            "Air Quality Health Index": "N/A"
        })
    );
}

#[test]
fn meta_carries_badge() {
    let forecast = fixture();
    let structure = forecast.to_structure().unwrap();
    let meta = structure["meta"].as_object().unwrap();

    let keys: Vec<&str> = meta.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["lang", "title", "author", "updated", "logo", "rights", "badge"]
    );
    assert_eq!(meta["lang"], "en-ca");
    assert_eq!(
        meta["author"],
        json!({"name": "Environment Canada", "uri": "http://www.weather.gc.ca"})
    );
    assert_eq!(
        meta["badge"],
        "https://weather.gc.ca/wxlink/wxlink.html?cityCode=on-1&lang=e"
    );
    assert_eq!(forecast.badge_url(), meta["badge"]);
}

#[test]
fn badge_uses_lowercased_code() {
    for code in ["ON-1", "On-1", "on-1"] {
        let (source, _) = Scripted::new(vec![ok(ON_1)]);
        let forecast = Forecast::with_source(code, Box::new(source)).unwrap();
        assert_eq!(forecast.location_code().as_str(), "on-1");
        assert_eq!(
            forecast.to_structure().unwrap()["meta"]["badge"],
            "https://weather.gc.ca/wxlink/wxlink.html?cityCode=on-1&lang=e"
        );
    }
}

#[test]
fn invalid_code_never_fetches() {
    for code in ["ontario", "on-1234", "o-1", "on_1", ""] {
        let (source, calls) = Scripted::new(vec![ok(ON_1)]);
        let err = Forecast::with_source(code, Box::new(source)).unwrap_err();
        assert!(matches!(err, Error::InvalidLocationCode(_)), "{code}: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "{code}");
    }
}

#[test]
fn text_is_indented_json_in_fixed_order() {
    let forecast = fixture();
    let text = forecast.to_text().unwrap();

    assert!(text.starts_with("{\n    \"meta\": {\n        \"lang\": \"en-ca\""));
    let at = |key: &str| text.find(&format!("\n    \"{key}\": ")).unwrap();
    assert!(at("meta") < at("Warnings and Watches"));
    assert!(at("Warnings and Watches") < at("Current Conditions"));
    assert!(at("Current Conditions") < at("Weather Forecasts"));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, forecast.to_structure().unwrap());
    assert_eq!(forecast.to_string(), text);
}

#[test]
fn serializes_like_its_structure() {
    let forecast = fixture();
    assert_eq!(
        serde_json::to_value(&forecast).unwrap(),
        forecast.to_structure().unwrap()
    );
}

#[test]
fn missing_categories_are_empty_lists() {
    let start = ON_1.find("    <entry>").unwrap();
    let end = ON_1.rfind("</entry>").unwrap() + "</entry>\n".len();
    let no_entries = format!("{}{}", &ON_1[..start], &ON_1[end..]);

    let (source, _) = Scripted::new(vec![ok(&no_entries)]);
    let forecast = Forecast::with_source("on-1", Box::new(source)).unwrap();
    let structure = forecast.to_structure().unwrap();

    assert_eq!(structure["Warnings and Watches"], json!([]));
    assert_eq!(structure["Current Conditions"], json!([]));
    assert_eq!(structure["Weather Forecasts"], json!([]));
    assert_eq!(structure["meta"]["rights"], "Copyright 2016, Environment Canada");
}

#[test]
fn refresh_replaces_snapshot() {
    let renamed = ON_1.replace("Algonquin Park (Brent) - Weather", "Brent - Weather");
    let (source, calls) = Scripted::new(vec![ok(ON_1), ok(&renamed)]);
    let mut forecast = Forecast::with_source("on-1", Box::new(source)).unwrap();
    let first_fetch = forecast.fetched_at();

    forecast.refresh().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        forecast.snapshot().meta()["title"],
        "Brent - Weather - Environment Canada"
    );
    assert!(forecast.fetched_at() >= first_fetch);
}

#[test]
fn refresh_of_identical_feed_is_idempotent() {
    let (source, _) = Scripted::new(vec![ok(ON_1), ok(ON_1)]);
    let mut forecast = Forecast::with_source("on-1", Box::new(source)).unwrap();
    let before = forecast.snapshot().clone();

    forecast.refresh().unwrap();

    assert_eq!(forecast.snapshot(), &before);
}

#[test]
fn unknown_category_fails_refresh_and_keeps_snapshot() {
    let bad = ON_1.replacen(
        "<category term=\"Weather Forecasts\"/>",
        "<category term=\"Almanac\"/>",
        1,
    );
    let (source, _) = Scripted::new(vec![ok(ON_1), ok(&bad)]);
    let mut forecast = Forecast::with_source("on-1", Box::new(source)).unwrap();
    let before = forecast.snapshot().clone();
    let fetched_at = forecast.fetched_at();

    let err = forecast.refresh().unwrap_err();
    let Error::SchemaViolation { path, received, .. } = err else {
        panic!("expected a schema violation, got {err:?}");
    };
    assert_eq!(path, "feed.entry[2].category.@term");
    assert_eq!(received, "\"Almanac\"");

    assert_eq!(forecast.snapshot(), &before);
    assert_eq!(forecast.fetched_at(), fetched_at);
    assert_eq!(forecast.snapshot().entries(Category::WeatherForecasts).len(), 13);
}

#[test]
fn fetch_failures_keep_snapshot() {
    let (source, _) = Scripted::new(vec![ok(ON_1), offline(), ok("<feed><entry></feed>")]);
    let mut forecast = Forecast::with_source("on-1", Box::new(source)).unwrap();
    let before = forecast.snapshot().clone();

    assert!(matches!(forecast.refresh(), Err(Error::Fetch(FetchError::Io(_)))));
    assert!(matches!(forecast.refresh(), Err(Error::Fetch(FetchError::Xml(_)))));
    assert_eq!(forecast.snapshot(), &before);
}

#[test]
fn construction_fails_on_bad_feed() {
    let (source, _) = Scripted::new(vec![offline()]);
    let err = Forecast::with_source("on-1", Box::new(source)).unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));

    let french = ON_1.replace("xml:lang=\"en-ca\"", "xml:lang=\"fr-ca\"");
    let (source, _) = Scripted::new(vec![ok(&french)]);
    let err = Forecast::with_source("on-1", Box::new(source)).unwrap_err();
    assert!(matches!(err, Error::SchemaViolation { ref path, .. } if path == "feed.@xml:lang"));
}

#[test]
fn non_atom_document_is_a_schema_violation() {
    let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>x</title></channel></rss>"#;
    let (source, _) = Scripted::new(vec![ok(rss)]);
    let err = Forecast::with_source("on-1", Box::new(source)).unwrap_err();
    assert!(err.is_schema_violation());
}

#[test]
fn missing_fixture_file_is_a_fetch_error() {
    let err = Forecast::with_source("on-999", Box::new(DirSource::new(data_dir()))).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Io(_))));
}

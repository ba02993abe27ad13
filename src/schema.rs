//! Declarative record schemas.
//!
//! A [`Schema`] is a list of [`Field`] directives plus a policy for keys it
//! does not mention. Schemas are plain `static` data: stateless, shared by
//! reference, and safe to use from any thread.
//!
//! Validation walks the input object in its own key order, so output keys
//! keep the position they had in the feed (a renamed key stays where the old
//! one was). Declared fields are required unless marked optional.
//!
//! The five schemas used by the pipeline are defined at the bottom:
//! [`META`], [`ENTRY`], [`WARNINGS`], [`CURRENT_CONDITIONS`] and
//! [`FORECASTS`].

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::html::html_to_map;
use crate::normalize::{normalize_degree, strip_forecast_boilerplate};
use crate::parse::Category;
use crate::tree::as_list;

/// A validated record: keys in feed order.
pub type Record = Map<String, Value>;

/// What to do with keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extra {
    Remove,
    Allow,
}

/// Value-level check applied to a declared field.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Any string.
    Text,
    /// Exactly this string.
    Exact(&'static str),
    /// One of these strings.
    OneOf(&'static [&'static str]),
    /// A list or an object, contents unchecked.
    ListOrObject,
    /// An object matching the nested schema; yields the validated object.
    Object(&'static Schema),
    /// One object or a list of objects, each matching the nested schema.
    OneOrMany(&'static Schema),
}

/// What happens to a declared field once found.
#[derive(Clone, Copy)]
pub enum Rule {
    /// Check and keep.
    Keep(Check),
    /// Check and drop from the output.
    Remove(Check),
    /// Validate a small wrapper object against the nested schema, then
    /// replace it by the concatenation of its remaining string values.
    Flatten(&'static Schema),
    /// Require a string and replace it by the converted value.
    Convert(fn(&str) -> Value),
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Rule::Keep(check) => f.debug_tuple("Keep").field(check).finish(),
            Rule::Remove(check) => f.debug_tuple("Remove").field(check).finish(),
            Rule::Flatten(wrapper) => f.debug_tuple("Flatten").field(wrapper).finish(),
            Rule::Convert(_) => f.write_str("Convert(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub rename: Option<&'static str>,
    pub rule: Rule,
    pub optional: bool,
}

impl Field {
    pub const fn keep(key: &'static str, check: Check) -> Self {
        Self {
            key,
            rename: None,
            rule: Rule::Keep(check),
            optional: false,
        }
    }

    pub const fn remove(key: &'static str, check: Check) -> Self {
        Self {
            key,
            rename: None,
            rule: Rule::Remove(check),
            optional: false,
        }
    }

    pub const fn flatten(key: &'static str, wrapper: &'static Schema) -> Self {
        Self {
            key,
            rename: None,
            rule: Rule::Flatten(wrapper),
            optional: false,
        }
    }

    pub const fn convert(key: &'static str, f: fn(&str) -> Value) -> Self {
        Self {
            key,
            rename: None,
            rule: Rule::Convert(f),
            optional: false,
        }
    }

    /// Relocate the output value under `to`.
    pub const fn rename_to(self, to: &'static str) -> Self {
        Self {
            rename: Some(to),
            ..self
        }
    }

    /// Accept the field's absence.
    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }

    fn output_key(&self) -> &'static str {
        self.rename.unwrap_or(self.key)
    }
}

#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
    pub extra: Extra,
}

impl Schema {
    /// Validate `value` as a top-level record.
    pub fn validate(&self, value: &Value) -> Result<Record> {
        self.validate_at(value, "")
    }

    /// Validate `value`, reporting violations relative to `path`.
    pub fn validate_at(&self, value: &Value, path: &str) -> Result<Record> {
        let Value::Object(input) = value else {
            return Err(Error::violation(path, "expected an object", Some(value)));
        };

        let mut out = Record::new();
        for (key, value) in input {
            let Some(field) = self.field(key) else {
                if self.extra == Extra::Allow {
                    out.insert(key.clone(), value.clone());
                }
                continue;
            };
            let field_path = join(path, key);
            if let Some(kept) = field.rule.apply(value, &field_path)? {
                out.insert(field.output_key().to_string(), kept);
            }
        }

        if let Some(missing) = self.fields.iter().find(|f| !f.optional && !input.contains_key(f.key)) {
            return Err(Error::violation(
                join(path, missing.key),
                "required key not provided",
                None,
            ));
        }
        Ok(out)
    }

    fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }
}

impl Rule {
    /// `Ok(None)` means the field is dropped from the output.
    fn apply(&self, value: &Value, path: &str) -> Result<Option<Value>> {
        match self {
            Rule::Keep(check) => check.apply(value, path).map(Some),
            Rule::Remove(check) => check.apply(value, path).map(|_| None),
            Rule::Flatten(wrapper) => {
                let fields = wrapper.validate_at(value, path)?;
                let mut flat = String::new();
                for (key, part) in &fields {
                    let Value::String(part) = part else {
                        return Err(Error::violation(join(path, key), "expected text", Some(part)));
                    };
                    flat.push_str(part);
                }
                Ok(Some(Value::String(flat)))
            }
            Rule::Convert(f) => {
                let text = expect_text(value, path)?;
                Ok(Some(f(text)))
            }
        }
    }
}

impl Check {
    fn apply(&self, value: &Value, path: &str) -> Result<Value> {
        match self {
            Check::Text => expect_text(value, path).map(|_| value.clone()),
            Check::Exact(expected) => {
                if value.as_str() == Some(*expected) {
                    Ok(value.clone())
                } else {
                    Err(Error::violation(path, format!("expected {expected:?}"), Some(value)))
                }
            }
            Check::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| *a == s) => Ok(value.clone()),
                _ => Err(Error::violation(
                    path,
                    format!("expected one of {allowed:?}"),
                    Some(value),
                )),
            },
            Check::ListOrObject => match value {
                Value::Array(_) | Value::Object(_) => Ok(value.clone()),
                _ => Err(Error::violation(path, "expected a list or an object", Some(value))),
            },
            Check::Object(schema) => schema.validate_at(value, path).map(Value::Object),
            Check::OneOrMany(schema) => {
                let items = as_list(Some(value))
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        schema
                            .validate_at(item, &format!("{path}[{i}]"))
                            .map(Value::Object)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
        }
    }
}

fn expect_text<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::violation(path, "expected text", Some(value)))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

// ---------------------------------------------------------------------------
// Feed schemas
// ---------------------------------------------------------------------------

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

static AUTHOR: Schema = Schema {
    fields: &[
        Field::keep("name", Check::Exact("Environment Canada")),
        Field::keep("uri", Check::Exact("http://www.weather.gc.ca")),
    ],
    extra: Extra::Remove,
};

/// Everything under `feed` except the entries: a known Environment Canada
/// English feed or nothing.
pub static META: Schema = Schema {
    fields: &[
        Field::keep("@xml:lang", Check::Exact("en-ca")).rename_to("lang"),
        Field::remove("@xmlns", Check::Exact(ATOM_NAMESPACE)),
        Field::keep("author", Check::Object(&AUTHOR)),
        Field::keep("logo", Check::Text),
        Field::keep("rights", Check::Text),
        Field::keep("title", Check::Text),
        Field::keep("updated", Check::Text),
        Field::remove("entry", Check::ListOrObject).optional(),
    ],
    extra: Extra::Remove,
};

static CATEGORY_TERM: Schema = Schema {
    fields: &[Field::keep("@term", Check::OneOf(&Category::TERMS))],
    extra: Extra::Remove,
};

static ENTRY_LINK: Schema = Schema {
    fields: &[
        Field::keep("@href", Check::Text),
        Field::keep("@type", Check::Exact("text/html")),
    ],
    extra: Extra::Remove,
};

static HTML_SUMMARY: Schema = Schema {
    fields: &[
        Field::keep("#text", Check::Text),
        Field::remove("@type", Check::Exact("html")),
    ],
    extra: Extra::Remove,
};

/// One member of the feed's entry list, flattened to plain strings.
pub static ENTRY: Schema = Schema {
    fields: &[
        Field::flatten("category", &CATEGORY_TERM),
        Field::remove("id", Check::Text),
        Field::remove("link", Check::OneOrMany(&ENTRY_LINK)),
        Field::keep("published", Check::Text),
        Field::flatten("summary", &HTML_SUMMARY),
        Field::keep("title", Check::Text),
        Field::keep("updated", Check::Text),
    ],
    extra: Extra::Remove,
};

/// Warnings and Watches entries pass through without their category.
pub static WARNINGS: Schema = Schema {
    fields: &[Field::remove("category", Check::Text)],
    extra: Extra::Allow,
};

/// Current Conditions: the HTML summary becomes a `data` mapping.
pub static CURRENT_CONDITIONS: Schema = Schema {
    fields: &[
        Field::remove("category", Check::Text),
        Field::convert("summary", observation_data).rename_to("data"),
        Field::convert("title", degree_free_text),
    ],
    extra: Extra::Allow,
};

/// Weather Forecasts: the summary loses its issue-time trailer.
pub static FORECASTS: Schema = Schema {
    fields: &[
        Field::remove("category", Check::Text),
        Field::convert("summary", forecast_text),
    ],
    extra: Extra::Allow,
};

fn observation_data(summary: &str) -> Value {
    Value::Object(html_to_map(&normalize_degree(summary)))
}

fn degree_free_text(text: &str) -> Value {
    Value::String(normalize_degree(text))
}

fn forecast_text(summary: &str) -> Value {
    Value::String(strip_forecast_boilerplate(summary))
}

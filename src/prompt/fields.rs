use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys that steer compilation instead of being listed as content.
pub const RESERVED_KEYS: &[&str] = &["occasion", "theme", "title", "email", "sub_type"];
pub const SPECIFIC_FIELDS_KEY: &str = "specific_fields";
/// Placeholder some front-ends send for unset occasion fields.
pub const UNDEFINED_SENTINEL: &str = "undefined";

/// Ordered field-set submitted by structured forms.
///
/// Deserializes from a flat JSON object; the `specific_fields` entry (when it
/// is an object) becomes the nested occasion-specific mapping. Document order
/// is preserved everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Value>", into = "IndexMap<String, Value>")]
pub struct StructuredFieldSet {
    fields: IndexMap<String, Value>,
    specific: IndexMap<String, Value>,
}

impl StructuredFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_specific(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.specific.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(render_value)
    }

    pub fn occasion(&self) -> Option<String> {
        self.get_text("occasion")
    }

    pub fn theme(&self) -> Option<String> {
        self.get_text("theme")
    }

    pub fn title(&self) -> Option<String> {
        self.get_text("title")
    }

    pub fn sub_type(&self) -> Option<String> {
        self.get_text("sub_type")
    }

    /// Non-reserved fields with a truthy value, in insertion order.
    pub fn content_entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .filter_map(|(key, value)| render_value(value).map(|text| (key.as_str(), text)))
    }

    /// Occasion-specific fields, skipping empty values and the sentinel.
    pub fn specific_entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.specific
            .iter()
            .filter_map(|(key, value)| render_value(value).map(|text| (key.as_str(), text)))
            .filter(|(_, text)| text != UNDEFINED_SENTINEL)
    }

    /// Every user-supplied value, reserved ones included.
    pub fn all_values(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .values()
            .chain(self.specific.values())
            .filter_map(render_value)
    }
}

impl From<IndexMap<String, Value>> for StructuredFieldSet {
    fn from(mut map: IndexMap<String, Value>) -> Self {
        let specific = match map.shift_remove(SPECIFIC_FIELDS_KEY) {
            Some(Value::Object(object)) => object.into_iter().collect(),
            _ => IndexMap::new(),
        };
        Self { fields: map, specific }
    }
}

impl From<StructuredFieldSet> for IndexMap<String, Value> {
    fn from(set: StructuredFieldSet) -> Self {
        let mut map = set.fields;
        if !set.specific.is_empty() {
            let object: serde_json::Map<String, Value> = set.specific.into_iter().collect();
            map.insert(SPECIFIC_FIELDS_KEY.to_string(), Value::Object(object));
        }
        map
    }
}

/// Renders a field value as prompt text. Falsy values render as `None`.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(object) if object.is_empty() => None,
        Value::Object(_) => Some(value.to_string()),
    }
}

/// `event_date` → `Event Date`. Every alphabetic run gets an upper-case
/// first letter and lower-case rest.
pub fn humanize_key(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

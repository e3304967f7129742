//! The render context handed to templates and context-aware filters.
//!
//! A [`TemplateContext`] is a plain key-unique map of template variables.
//! Assembly during a render starts from the caller's values and only ever
//! fills in missing keys, so caller-supplied values always take precedence
//! over application globals and context-processor output.

use std::collections::HashMap;

use minijinja::Value;
use serde::Serialize;

use crate::error::QuireError;

/// Template variables for a single render.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: HashMap<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from any serializable map-like value.
    ///
    /// `()`/`null` yield an empty context; other non-map values are an error.
    ///
    /// ```rust
    /// use quire::TemplateContext;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Page { name: String }
    ///
    /// let ctx = TemplateContext::from_serialize(&Page { name: "Rudolf".into() }).unwrap();
    /// assert_eq!(ctx.get("name").unwrap().as_str(), Some("Rudolf"));
    /// ```
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, QuireError> {
        match serde_json::to_value(data)? {
            serde_json::Value::Null => Ok(Self::new()),
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, Value::from_serialize(&value)))
                .collect()),
            other => Err(QuireError::Context(format!(
                "context must be a map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Inserts a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value only if the key is absent. Returns whether it was
    /// inserted.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self.values.entry(key.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Inserts every entry of `other`, replacing existing values.
    pub fn extend(&mut self, other: TemplateContext) {
        self.values.extend(other.values);
    }

    /// Fills every key of `other` that is absent here.
    pub fn merge_absent(&mut self, other: TemplateContext) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The underlying map, suitable as a MiniJinja render context.
    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.values
    }
}

impl From<HashMap<String, Value>> for TemplateContext {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for TemplateContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a map",
    }
}

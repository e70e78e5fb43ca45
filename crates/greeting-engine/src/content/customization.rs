use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::error::ContentError;

/// Reserved key whose value is an image URI for the element with that id.
pub const IMAGE_KEY: &str = "imagePath";

/// Where customization values land. Implemented by the web bridge over the
/// real document, and by fakes in tests.
pub trait ContentTarget {
    /// Replace the text content of the element with id `id`.
    /// Returns false if no such element exists.
    fn set_text(&mut self, id: &str, text: &str) -> bool;

    /// Set an attribute on the element with id `id`.
    /// Returns false if no such element exists.
    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> bool;
}

/// Personalization values keyed by element id. Loaded from a flat JSON
/// object; strings are kept as-is, numbers and booleans are stringified,
/// anything else is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Customization {
    entries: BTreeMap<String, String>,
}

impl From<BTreeMap<String, Value>> for Customization {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let entries = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((key, text))
            })
            .collect();
        Self { entries }
    }
}

impl Customization {
    /// Parse a customization document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every non-empty value onto `target`. `imagePath` sets `src`,
    /// other keys set text. Missing elements are skipped. Returns how many
    /// entries were applied.
    pub fn apply(&self, target: &mut impl ContentTarget) -> usize {
        let mut applied = 0;
        for (key, value) in &self.entries {
            if value.is_empty() {
                continue;
            }
            let hit = if key == IMAGE_KEY {
                target.set_attribute(key, "src", value)
            } else {
                target.set_text(key, value)
            };
            if hit {
                applied += 1;
            } else {
                log::debug!("no element with id {:?}; skipping", key);
            }
        }
        applied
    }
}

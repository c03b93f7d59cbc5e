//! Analytics events and their property values

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A primitive property value attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Free text
    String(String),
}

impl PropertyValue {
    /// Get the value as a string slice, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is a whole number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&String> for PropertyValue {
    fn from(value: &String) -> Self {
        PropertyValue::String(value.clone())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        PropertyValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u8> for PropertyValue {
    fn from(value: u8) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

/// Open property map carried by an event
///
/// Ordered so that serialized payloads are stable.
pub type Properties = BTreeMap<String, PropertyValue>;

/// An analytics event
///
/// Events are built once by the dispatcher and then only read. Nothing keeps
/// them after delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,
    /// snake_case event name
    pub name: String,
    /// Event dimensions
    pub properties: Properties,
    /// Emission time
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create a new event stamped with the given time
    pub fn new(name: impl Into<String>, properties: Properties, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            properties,
            timestamp,
        }
    }

    /// Look up a property
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Look up a text property
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    /// Look up an integer property
    pub fn int_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(PropertyValue::as_i64)
    }

    /// One-line description used by console output
    pub fn description(&self) -> String {
        let props = self
            .properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        if props.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, props)
        }
    }
}

/// Build a property map from key/value pairs
///
/// ```ignore
/// let props = leadtrail_core::props! { "form_name" => "rfi", "step" => 2 };
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::event::Properties::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::event::Properties::new();
        $(map.insert($key.to_string(), $crate::event::PropertyValue::from($value));)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_values_serialize_as_plain_json() {
        let props = props! {
            "form_name" => "rfi",
            "count" => 3,
            "ratio" => 0.5,
            "submitted" => true,
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"count": 3, "form_name": "rfi", "ratio": 0.5, "submitted": true})
        );
    }

    #[test]
    fn test_property_values_deserialize_untagged() {
        let props: Properties =
            serde_json::from_str(r#"{"a": "x", "b": 7, "c": false, "d": 1.25}"#).unwrap();
        assert_eq!(props["a"], PropertyValue::String("x".to_string()));
        assert_eq!(props["b"], PropertyValue::Integer(7));
        assert_eq!(props["c"], PropertyValue::Bool(false));
        assert_eq!(props["d"], PropertyValue::Float(1.25));
    }

    #[test]
    fn test_event_accessors_and_description() {
        let event = Event::new("form_start", props! { "form_name" => "rfi", "step" => 1 }, Utc::now());
        assert_eq!(event.str_property("form_name"), Some("rfi"));
        assert_eq!(event.int_property("step"), Some(1));
        assert_eq!(event.str_property("step"), None);
        assert_eq!(event.description(), "form_start form_name=rfi step=1");
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::new("page_view", Properties::new(), Utc::now());
        let b = Event::new("page_view", Properties::new(), Utc::now());
        assert_ne!(a.id, b.id);
    }
}

//! Value trees produced by the PHP decoder.
//!
//! PHP does not distinguish sequential arrays from associative ones, so both
//! decode to an ordered list of `(key, value)` pairs. Key order is the order
//! in which the pairs were encountered in the input.

use std::fmt;

/// Array/object key. PHP only allows integer and string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

/// A decoded, not yet normalized, PHP value.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<(Key, SerializedValue)>),
    /// Named object: `O:<len>:"<class>":<count>:{...}`.
    Object {
        class: String,
        fields: Vec<(Key, SerializedValue)>,
    },
}

/// A sanitized value: the same tree with every named object flattened into
/// a plain [`Value::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<(Key, Value)>),
}

impl Value {
    pub fn as_list(&self) -> Option<&[(Key, Value)]> {
        match self {
            Value::List(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Looks up the first entry with the given key in a list.
    ///
    /// Returns `None` for leaves and for lists without the key.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        self.as_list()?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

impl SerializedValue {
    /// Class name for object nodes.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            SerializedValue::Object { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Key/value pairs of a list or object node.
    pub fn entries(&self) -> Option<&[(Key, SerializedValue)]> {
        match self {
            SerializedValue::List(entries) => Some(entries),
            SerializedValue::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<Value> for SerializedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SerializedValue::Null,
            Value::Bool(b) => SerializedValue::Bool(b),
            Value::Int(i) => SerializedValue::Int(i),
            Value::Float(f) => SerializedValue::Float(f),
            Value::Text(s) => SerializedValue::Text(s),
            Value::List(entries) => SerializedValue::List(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, SerializedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_finds_first_matching_key() {
        let value = Value::List(vec![
            (Key::Int(0), Value::from("zero")),
            (Key::from("funds"), Value::Int(1000)),
            (Key::from("funds"), Value::Int(2000)),
        ]);
        assert_eq!(value.get(0i64), Some(&Value::from("zero")));
        assert_eq!(value.get("funds").and_then(Value::as_i64), Some(1000));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Int(1).get(0i64), None);
    }

    #[test]
    fn lifting_a_sanitized_tree_keeps_shape() {
        let value = Value::List(vec![(
            Key::Int(0),
            Value::List(vec![(Key::from("a"), Value::Float(1.5))]),
        )]);
        let lifted = SerializedValue::from(value);
        assert_eq!(
            lifted,
            SerializedValue::List(vec![(
                Key::Int(0),
                SerializedValue::List(vec![(Key::from("a"), SerializedValue::Float(1.5))]),
            )])
        );
        assert_eq!(lifted.class_name(), None);
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::Int(-3).to_string(), "-3");
        assert_eq!(Key::from("units_x").to_string(), "units_x");
    }
}

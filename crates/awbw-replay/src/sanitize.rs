//! Flattening of PHP objects into plain lists.

use std::collections::BTreeSet;

use crate::{Key, SerializedValue, Value};

/// Distinct PHP class names seen while sanitizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeManifest(BTreeSet<String>);

impl TypeManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: impl Into<String>) -> bool {
        self.0.insert(class.into())
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class names in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TypeManifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Replaces every object node with its field list, recording class names.
///
/// Children are rebuilt before their parent, so classes at any depth end up
/// in the manifest. The class name itself is dropped from the tree; callers
/// that need to know which node had which class must inspect the
/// [`SerializedValue`] before sanitizing it.
pub fn sanitize(value: SerializedValue) -> (Value, TypeManifest) {
    let mut manifest = TypeManifest::new();
    let value = sanitize_into(value, &mut manifest);
    (value, manifest)
}

/// Like [`sanitize`], but leaves `value` intact.
///
/// Keys and leaves are cloned into the new tree; use this when the decoded
/// tree is kept alongside the sanitized one.
pub fn sanitize_ref(value: &SerializedValue) -> (Value, TypeManifest) {
    let mut manifest = TypeManifest::new();
    let value = sanitize_ref_into(value, &mut manifest);
    (value, manifest)
}

fn sanitize_ref_into(value: &SerializedValue, manifest: &mut TypeManifest) -> Value {
    match value {
        SerializedValue::Null => Value::Null,
        SerializedValue::Bool(b) => Value::Bool(*b),
        SerializedValue::Int(i) => Value::Int(*i),
        SerializedValue::Float(f) => Value::Float(*f),
        SerializedValue::Text(s) => Value::Text(s.clone()),
        SerializedValue::List(entries) => Value::List(sanitize_ref_entries(entries, manifest)),
        SerializedValue::Object { class, fields } => {
            let fields = sanitize_ref_entries(fields, manifest);
            if !manifest.contains(class) {
                manifest.insert(class.as_str());
            }
            Value::List(fields)
        }
    }
}

fn sanitize_ref_entries(
    entries: &[(Key, SerializedValue)],
    manifest: &mut TypeManifest,
) -> Vec<(Key, Value)> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), sanitize_ref_into(v, manifest)))
        .collect()
}

fn sanitize_into(value: SerializedValue, manifest: &mut TypeManifest) -> Value {
    match value {
        SerializedValue::Null => Value::Null,
        SerializedValue::Bool(b) => Value::Bool(b),
        SerializedValue::Int(i) => Value::Int(i),
        SerializedValue::Float(f) => Value::Float(f),
        SerializedValue::Text(s) => Value::Text(s),
        SerializedValue::List(entries) => Value::List(
            entries
                .into_iter()
                .map(|(k, v)| (k, sanitize_into(v, manifest)))
                .collect(),
        ),
        SerializedValue::Object { class, fields } => {
            let fields = fields
                .into_iter()
                .map(|(k, v)| (k, sanitize_into(v, manifest)))
                .collect();
            manifest.insert(class);
            Value::List(fields)
        }
    }
}

//! Hierarchical enrichment documents.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Serialize, Serializer};

/// A single field value inside a [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// UTF8 string, by far the most common leaf for object metadata.
    String(String),

    /// Boolean
    Bool(bool),

    /// Array
    Array(Vec<Value>),

    /// Nested document
    Object(Document),
}

impl Value {
    /// Returns the inner string if self is `Value::String`.
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns the nested document if self is `Value::Object`.
    pub fn as_object(&self) -> Option<&Document> {
        if let Self::Object(doc) = self {
            Some(doc)
        } else {
            None
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Self::Object(value)
    }
}

/// An ordered tree of metadata fields.
///
/// Keys are addressed with dot-delimited paths, each dot descending one
/// level of nesting. Generators build their output by `put`ting vendor
/// fields first and then folding normalized fields in with
/// [`Document::deep_update`], which makes the normalized side win on
/// conflicting leaves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Inserts `value` at the dot-delimited `path`, creating intermediate
    /// objects as needed. A non-object value sitting in the middle of the
    /// path is replaced by an object. Returns the previous leaf, if any.
    pub fn put(&mut self, path: &str, value: impl Into<Value>) -> Option<Value> {
        self.put_value(path, value.into())
    }

    fn put_value(&mut self, path: &str, value: Value) -> Option<Value> {
        let Some((head, rest)) = path.split_once('.') else {
            return self.fields.insert(path.to_string(), value);
        };

        let nested = self
            .fields
            .entry(head.to_string())
            .and_modify(|existing| {
                if !matches!(existing, Value::Object(_)) {
                    *existing = Value::Object(Self::new());
                }
            })
            .or_insert_with(|| Value::Object(Self::new()));

        if let Value::Object(doc) = nested {
            doc.put_value(rest, value)
        } else {
            None
        }
    }

    /// Inserts `value` under the literal `key`, without path splitting.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns the value at the dot-delimited `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((head, rest)) => match self.fields.get(head)? {
                Value::Object(doc) => doc.get(rest),
                _ => None,
            },
        }
    }

    /// Merges `other` into self. Nested objects are merged recursively,
    /// everything else is overwritten by the incoming value.
    pub fn deep_update(&mut self, other: Self) {
        for (key, value) in other.fields {
            match self.fields.entry(key) {
                Entry::Occupied(mut occupied) => match (occupied.get_mut(), value) {
                    (Value::Object(existing), Value::Object(incoming)) => {
                        existing.deep_update(incoming);
                    }
                    (existing, incoming) => *existing = incoming,
                },
                Entry::Vacant(vacant) => {
                    vacant.insert(value);
                }
            }
        }
    }

    /// Iterates over the top level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(&self.fields)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Array(array) => serializer.collect_seq(array),
            Value::Object(doc) => doc.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get() {
        let mut doc = Document::new();
        assert_eq!(doc.put("pod.ip", "10.0.0.5"), None);
        doc.put("replicaset.name", "rs-abc");
        doc.put("namespace", "kube-system");

        assert_eq!(doc.get("pod.ip"), Some(&Value::from("10.0.0.5")));
        assert_eq!(doc.get("replicaset.name"), Some(&Value::from("rs-abc")));
        assert_eq!(doc.get("namespace"), Some(&Value::from("kube-system")));
        assert_eq!(doc.get("pod.missing"), None);
        assert_eq!(doc.get("missing"), None);
        // descending into a leaf is not a match
        assert_eq!(doc.get("namespace.name"), None);
    }

    #[test]
    fn put_returns_previous() {
        let mut doc = Document::new();
        doc.put("deployment.name", "dep-1");
        let previous = doc.put("deployment.name", "dep-2");
        assert_eq!(previous, Some(Value::from("dep-1")));
        assert_eq!(doc.get("deployment.name"), Some(&Value::from("dep-2")));
    }

    #[test]
    fn put_replaces_scalar_intermediate() {
        let mut doc = Document::new();
        doc.put("node", "n1");
        doc.put("node.name", "n1");
        assert_eq!(doc.get("node.name"), Some(&Value::from("n1")));
    }

    #[test]
    fn insert_keeps_dots_literal() {
        let mut doc = Document::new();
        doc.insert("app.kubernetes.io/name", "web");

        // no nesting happened
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("app"), None);

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"app.kubernetes.io/name":"web"}"#);
    }

    #[test]
    fn deep_update_merges_objects() {
        let mut base = Document::new();
        base.put("node.name", "n1");
        base.put("node.uid", "uid-1");
        base.put("pod.ip", "10.0.0.5");

        let mut incoming = Document::new();
        incoming.put("node.name", "n2");
        incoming.put("node.hostname", "host-2");

        base.deep_update(incoming);

        assert_eq!(base.get("node.name"), Some(&Value::from("n2")));
        assert_eq!(base.get("node.uid"), Some(&Value::from("uid-1")));
        assert_eq!(base.get("node.hostname"), Some(&Value::from("host-2")));
        assert_eq!(base.get("pod.ip"), Some(&Value::from("10.0.0.5")));
    }

    #[test]
    fn deep_update_overwrites_scalars_with_objects() {
        let mut base = Document::new();
        base.put("namespace", "default");

        let mut incoming = Document::new();
        incoming.put("namespace.name", "default");

        base.deep_update(incoming);
        assert_eq!(base.get("namespace.name"), Some(&Value::from("default")));
    }

    // The merge-order contract the generators rely on: the vendor subtree
    // is built first, normalized fields are folded in afterwards and win on
    // overlapping paths.
    #[test]
    fn normalized_fields_win_over_vendor_fields() {
        let mut out = Document::new();
        out.put("kubernetes.pod.name", "vendor-name");
        out.put("orchestrator.cluster.name", "stale");

        let mut normalized = Document::new();
        normalized.put("orchestrator.cluster.name", "prod-1");
        normalized.put("kubernetes.pod.name", "normalized-name");

        out.deep_update(normalized);

        assert_eq!(
            out.get("orchestrator.cluster.name"),
            Some(&Value::from("prod-1"))
        );
        assert_eq!(
            out.get("kubernetes.pod.name"),
            Some(&Value::from("normalized-name"))
        );
    }

    #[test]
    fn serialize_to_json() {
        let mut doc = Document::new();
        doc.put("pod.ip", "10.0.0.5");
        doc.put("pod.ready", true);
        doc.insert(
            "ips",
            vec![Value::from("10.0.0.5"), Value::from("fd00::5")],
        );

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"ips":["10.0.0.5","fd00::5"],"pod":{"ip":"10.0.0.5","ready":true}}"#
        );
    }
}

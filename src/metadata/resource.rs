//! Base generator for the fields every object kind shares.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::Document;
use crate::resource::Resource;

use super::{Config, FieldOption};

/// Controller kinds surfaced as `<kind>.name` next to the object's own
/// identity.
const OWNER_KINDS: &[&str] = &[
    "Deployment",
    "ReplicaSet",
    "StatefulSet",
    "DaemonSet",
    "Job",
    "CronJob",
];

/// Generates the kind-independent part of the vendor metadata. The typed
/// generators wrap this with their kind specific fields.
pub struct ResourceGenerator {
    config: Arc<Config>,
}

impl ResourceGenerator {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Generates the full document for `resource` labeled as `kind`, with
    /// the normalized fields merged over the `kubernetes` subtree.
    pub fn generate(
        &self,
        kind: &str,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Document {
        let ecs = self.generate_ecs(resource);

        let mut out = Document::new();
        out.insert("kubernetes", self.generate_k8s(kind, resource, options));
        out.deep_update(ecs);
        out
    }

    /// Generates the vendor namespace fields shared by every object kind:
    /// identity, flat namespace, controlling owners, filtered labels and
    /// annotations. Field options run last, over the finished document.
    pub fn generate_k8s(
        &self,
        kind: &str,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Document {
        let metadata = resource.metadata();
        let mut out = Document::new();

        let kind = kind.to_lowercase();
        if let Some(name) = &metadata.name {
            out.put(&format!("{kind}.name"), name.as_str());
        }
        if let Some(uid) = &metadata.uid {
            out.put(&format!("{kind}.uid"), uid.as_str());
        }

        if let Some(namespace) = &metadata.namespace {
            if !namespace.is_empty() {
                out.put("namespace", namespace.as_str());
            }
        }

        for reference in metadata.owner_references.iter().flatten() {
            if reference.controller != Some(true) {
                continue;
            }

            if OWNER_KINDS.contains(&reference.kind.as_str()) {
                out.put(
                    &format!("{}.name", reference.kind.to_lowercase()),
                    reference.name.as_str(),
                );
            }
        }

        let labels = self.filter_labels(metadata.labels.as_ref());
        if !labels.is_empty() {
            out.insert("labels", labels);
        }

        let annotations = self.filter_annotations(metadata.annotations.as_ref());
        if !annotations.is_empty() {
            out.insert("annotations", annotations);
        }

        for option in options {
            option(&mut out);
        }

        out
    }

    /// Generates the normalized orchestrator fields from the configured
    /// cluster identity.
    pub fn generate_ecs(&self, _resource: &dyn Resource) -> Document {
        let cluster = &self.config.cluster;
        let mut out = Document::new();

        if !cluster.url.is_empty() {
            out.put("orchestrator.cluster.url", cluster.url.as_str());
        }
        if !cluster.name.is_empty() {
            out.put("orchestrator.cluster.name", cluster.name.as_str());
        }

        out
    }

    fn filter_labels(&self, labels: Option<&BTreeMap<String, String>>) -> Document {
        let mut out = Document::new();
        let Some(labels) = labels else { return out };

        for (key, value) in labels {
            if self.config.exclude_labels.contains(key) {
                continue;
            }
            if !self.config.include_labels.is_empty() && !self.config.include_labels.contains(key)
            {
                continue;
            }

            put_dedotted(&mut out, key, value, self.config.labels_dedot);
        }

        out
    }

    // annotations are opt-in, only explicitly included keys are copied
    fn filter_annotations(&self, annotations: Option<&BTreeMap<String, String>>) -> Document {
        let mut out = Document::new();
        let Some(annotations) = annotations else {
            return out;
        };

        for key in &self.config.include_annotations {
            if let Some(value) = annotations.get(key) {
                put_dedotted(&mut out, key, value, self.config.annotations_dedot);
            }
        }

        out
    }
}

fn put_dedotted(doc: &mut Document, key: &str, value: &str, dedot: bool) {
    if dedot {
        doc.insert(key.replace('.', "_"), value);
    } else {
        doc.put(key, value);
    }
}

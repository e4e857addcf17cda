//! Metadata generators for watched Kubernetes objects.
//!
//! Each generator turns one object kind into an enrichment document. They
//! share the [`MetaGen`] capability so composite generators can hold their
//! collaborators behind one interface, wiring in only the pieces the
//! deployment actually watches.

mod config;
mod namespace;
mod node;
mod pod;
mod resource;
mod service;

pub use config::{ClusterInfo, Config, ResourceMetadataConfig};
pub use namespace::NamespaceGenerator;
pub use node::NodeGenerator;
pub use pod::PodGenerator;
pub use resource::ResourceGenerator;
pub use service::ServiceGenerator;

use async_trait::async_trait;

use crate::document::{Document, Value};
use crate::resource::Resource;

/// Mutation applied to a generated document before it is returned.
///
/// A delegating generator forwards its options unchanged, so the whole
/// chain of one request runs with the same list.
pub type FieldOption = Box<dyn Fn(&mut Document) + Send + Sync>;

/// Puts `value` at `path` of the generated document.
pub fn with_fields(path: impl Into<String>, value: impl Into<Value>) -> FieldOption {
    let path = path.into();
    let value = value.into();

    Box::new(move |doc| {
        doc.put(&path, value.clone());
    })
}

/// Copies the generated `labels` subtree under `<kind>.labels`.
///
/// This is how a composite generator asks a collaborator for labels
/// already scoped under the collaborator's kind, ready for embedding.
pub fn with_labels(kind: &str) -> FieldOption {
    let path = format!("{}.labels", kind.to_lowercase());

    Box::new(move |doc| {
        if let Some(labels) = doc.get("labels").cloned() {
            doc.put(&path, labels);
        }
    })
}

/// The capability every metadata generator exposes.
///
/// Generation is async because some generators resolve owning workloads
/// through the API server. No operation fails: missing context only
/// narrows the output.
#[async_trait]
pub trait MetaGen: Send + Sync {
    /// Generates the full enrichment document: the vendor subtree under
    /// the fixed `kubernetes` key, then the normalized fields merged on
    /// top so they win on conflicting paths.
    async fn generate(&self, resource: &dyn Resource, options: &[FieldOption]) -> Document {
        let ecs = self.generate_ecs(resource);

        let mut out = Document::new();
        if let Some(k8s) = self.generate_k8s(resource, options).await {
            out.insert("kubernetes", k8s);
        }

        out.deep_update(ecs);
        out
    }

    /// Generates only the normalized fields.
    fn generate_ecs(&self, resource: &dyn Resource) -> Document;

    /// Generates the vendor namespace fields, or `None` when the object
    /// is not of the kind this generator handles.
    async fn generate_k8s(
        &self,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Option<Document>;

    /// Generates the vendor namespace fields for the object cached under
    /// `name`, or `None` when the lookup comes up empty.
    async fn generate_from_name(&self, name: &str, options: &[FieldOption]) -> Option<Document>;
}

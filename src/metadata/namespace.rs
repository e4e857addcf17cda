//! Namespace metadata generation.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use tracing::debug;

use crate::document::Document;
use crate::resource::Resource;
use crate::store::Store;

use super::{Config, FieldOption, MetaGen, ResourceGenerator};

pub struct NamespaceGenerator {
    resource: ResourceGenerator,
    store: Option<Arc<dyn Store>>,
}

impl NamespaceGenerator {
    pub fn new(config: Arc<Config>, store: Option<Arc<dyn Store>>) -> Self {
        Self {
            resource: ResourceGenerator::new(config),
            store,
        }
    }
}

#[async_trait]
impl MetaGen for NamespaceGenerator {
    fn generate_ecs(&self, resource: &dyn Resource) -> Document {
        self.resource.generate_ecs(resource)
    }

    async fn generate_k8s(
        &self,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Option<Document> {
        resource.downcast_ref::<Namespace>()?;

        let out = self.resource.generate_k8s("namespace", resource, options);
        flatten(out)
    }

    async fn generate_from_name(&self, name: &str, options: &[FieldOption]) -> Option<Document> {
        let store = self.store.as_ref()?;

        let obj = match store.get_by_key(name) {
            Ok(Some(obj)) => obj,
            Ok(None) => return None,
            Err(err) => {
                debug!(message = "Object store lookup failed.", name, ?err);
                return None;
            }
        };

        let namespace = obj.downcast_ref::<Namespace>()?;
        self.generate_k8s(namespace, options).await
    }
}

/// Flattens the generated document for embedding into another object's
/// document: the identity subtree becomes `namespace` and
/// `namespace_<field>`, labels and annotations move under
/// `namespace_labels` and `namespace_annotations`.
fn flatten(doc: Document) -> Option<Document> {
    let fields = doc.get("namespace")?.as_object()?.clone();

    let mut out = Document::new();
    for (key, value) in fields {
        if key == "name" {
            out.insert("namespace", value);
        } else {
            out.insert(format!("namespace_{key}"), value);
        }
    }

    if let Some(labels) = doc.get("labels") {
        out.insert("namespace_labels", labels.clone());
    }
    if let Some(annotations) = doc.get("annotations") {
        out.insert("namespace_annotations", annotations.clone());
    }

    Some(out)
}

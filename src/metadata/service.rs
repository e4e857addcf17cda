//! Service metadata generation.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use tracing::debug;

use crate::document::Document;
use crate::resource::Resource;
use crate::store::Store;

use super::{Config, FieldOption, MetaGen, ResourceGenerator};

pub struct ServiceGenerator {
    resource: ResourceGenerator,
    store: Option<Arc<dyn Store>>,
    namespace: Option<Arc<dyn MetaGen>>,
}

impl ServiceGenerator {
    pub fn new(
        config: Arc<Config>,
        store: Option<Arc<dyn Store>>,
        namespace: Option<Arc<dyn MetaGen>>,
    ) -> Self {
        Self {
            resource: ResourceGenerator::new(config),
            store,
            namespace,
        }
    }
}

#[async_trait]
impl MetaGen for ServiceGenerator {
    fn generate_ecs(&self, resource: &dyn Resource) -> Document {
        self.resource.generate_ecs(resource)
    }

    async fn generate_k8s(
        &self,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Option<Document> {
        let service = resource.downcast_ref::<Service>()?;
        let mut out = self.resource.generate_k8s("service", resource, options);

        if let Some(namespace_gen) = &self.namespace {
            let namespace = service.metadata.namespace.clone().unwrap_or_default();
            if let Some(meta) = namespace_gen.generate_from_name(&namespace, &[]).await {
                out.deep_update(meta);
            }
        }

        let selector = service
            .spec
            .as_ref()
            .and_then(|spec| spec.selector.as_ref());
        if let Some(selector) = selector {
            if !selector.is_empty() {
                let mut selectors = Document::new();
                for (key, value) in selector {
                    selectors.put(key, value.as_str());
                }
                out.put("selectors", selectors);
            }
        }

        Some(out)
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

        let service = obj.downcast_ref::<Service>()?;
        self.generate_k8s(service, options).await
    }
}

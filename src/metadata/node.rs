//! Node metadata generation.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use tracing::debug;

use crate::document::Document;
use crate::resource::Resource;
use crate::store::Store;

use super::{Config, FieldOption, MetaGen, ResourceGenerator};

pub struct NodeGenerator {
    resource: ResourceGenerator,
    store: Option<Arc<dyn Store>>,
}

impl NodeGenerator {
    pub fn new(config: Arc<Config>, store: Option<Arc<dyn Store>>) -> Self {
        Self {
            resource: ResourceGenerator::new(config),
            store,
        }
    }
}

#[async_trait]
impl MetaGen for NodeGenerator {
    fn generate_ecs(&self, resource: &dyn Resource) -> Document {
        self.resource.generate_ecs(resource)
    }

    async fn generate_k8s(
        &self,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Option<Document> {
        let node = resource.downcast_ref::<Node>()?;
        let mut out = self.resource.generate_k8s("node", resource, options);

        if let Some(hostname) = host_name(node) {
            out.put("node.hostname", hostname);
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

        let node = obj.downcast_ref::<Node>()?;
        self.generate_k8s(node, options).await
    }
}

/// Address the kubelet reports as the node's hostname.
fn host_name(node: &Node) -> Option<&str> {
    node.status
        .as_ref()?
        .addresses
        .iter()
        .flatten()
        .find(|address| address.type_ == "Hostname")
        .map(|address| address.address.as_str())
        .filter(|address| !address.is_empty())
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{NodeAddress, NodeStatus, Pod};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;
    use crate::document::Value;
    use crate::store::CacheStore;

    fn node() -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some("worker-1".into()),
                uid: Some("a5560ec4-292f-4e78-81a6-16e5d7d4b77f".into()),
                labels: Some([("zone".to_string(), "us-east-1a".to_string())].into()),
                ..Default::default()
            },
            status: Some(NodeStatus {
                addresses: Some(vec![
                    NodeAddress {
                        address: "10.0.0.8".into(),
                        type_: "InternalIP".into(),
                    },
                    NodeAddress {
                        address: "worker-1.example.com".into(),
                        type_: "Hostname".into(),
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn generator(store: Option<Arc<dyn Store>>) -> NodeGenerator {
        NodeGenerator::new(Arc::new(Config::default()), store)
    }

    #[tokio::test]
    async fn generates_identity_and_hostname() {
        let out = generator(None).generate_k8s(&node(), &[]).await.unwrap();

        assert_eq!(out.get("node.name"), Some(&Value::from("worker-1")));
        assert_eq!(
            out.get("node.uid"),
            Some(&Value::from("a5560ec4-292f-4e78-81a6-16e5d7d4b77f"))
        );
        assert_eq!(
            out.get("node.hostname"),
            Some(&Value::from("worker-1.example.com"))
        );
        assert_eq!(out.get("labels.zone"), Some(&Value::from("us-east-1a")));
    }

    #[tokio::test]
    async fn hostname_is_skipped_without_a_hostname_address() {
        let mut node = node();
        node.status = Some(NodeStatus::default());

        let out = generator(None).generate_k8s(&node, &[]).await.unwrap();
        assert_eq!(out.get("node.hostname"), None);
    }

    #[tokio::test]
    async fn rejects_foreign_kinds() {
        let pod = Pod::default();
        assert!(generator(None).generate_k8s(&pod, &[]).await.is_none());
    }

    #[tokio::test]
    async fn generate_from_name() {
        let store = CacheStore::new();
        store.insert(node());
        let generator = generator(Some(Arc::new(store)));

        let out = generator.generate_from_name("worker-1", &[]).await.unwrap();
        assert_eq!(out.get("node.name"), Some(&Value::from("worker-1")));

        assert!(generator.generate_from_name("worker-2", &[]).await.is_none());
    }
}

//! Pod metadata generation, the center of the enrichment pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use crate::client::Client;
use crate::document::{Document, Value};
use crate::resource::Resource;
use crate::store::Store;

use super::{Config, FieldOption, MetaGen, ResourceGenerator, ResourceMetadataConfig, with_labels};

/// Generates enrichment metadata for Pods.
///
/// Every collaborator is optional. A missing store, client or sub
/// generator narrows the output instead of failing the call, so the
/// generator stays usable in deployments that only watch a subset of the
/// object kinds.
pub struct PodGenerator {
    resource: ResourceGenerator,
    store: Option<Arc<dyn Store>>,
    client: Option<Arc<dyn Client>>,
    node: Option<Arc<dyn MetaGen>>,
    namespace: Option<Arc<dyn MetaGen>>,
    resource_metadata: ResourceMetadataConfig,
}

impl PodGenerator {
    pub fn new(
        config: Arc<Config>,
        store: Option<Arc<dyn Store>>,
        client: Option<Arc<dyn Client>>,
        node: Option<Arc<dyn MetaGen>>,
        namespace: Option<Arc<dyn MetaGen>>,
        resource_metadata: Option<ResourceMetadataConfig>,
    ) -> Self {
        Self {
            resource: ResourceGenerator::new(config),
            store,
            client,
            node,
            namespace,
            resource_metadata: resource_metadata.unwrap_or_default(),
        }
    }

    /// Name of the Deployment controlling the ReplicaSet `name`, resolved
    /// with a point read against the API server.
    async fn replica_set_deployment(&self, name: &str, namespace: &str) -> Option<String> {
        let client = self.client.as_ref()?;

        let rs = match client.replica_set(namespace, name).await {
            Ok(rs) => rs,
            Err(err) => {
                debug!(
                    message = "Fetch replicaset failed, skipping deployment resolution.",
                    name,
                    namespace,
                    ?err
                );

                return None;
            }
        };

        controller_name(&rs.metadata, "Deployment")
    }

    /// Name of the CronJob controlling the Job `name`.
    async fn job_cronjob(&self, name: &str, namespace: &str) -> Option<String> {
        let client = self.client.as_ref()?;

        let job = match client.job(namespace, name).await {
            Ok(job) => job,
            Err(err) => {
                debug!(
                    message = "Fetch job failed, skipping cronjob resolution.",
                    name,
                    namespace,
                    ?err
                );

                return None;
            }
        };

        controller_name(&job.metadata, "CronJob")
    }
}

#[async_trait]
impl MetaGen for PodGenerator {
    fn generate_ecs(&self, resource: &dyn Resource) -> Document {
        self.resource.generate_ecs(resource)
    }

    async fn generate_k8s(
        &self,
        resource: &dyn Resource,
        options: &[FieldOption],
    ) -> Option<Document> {
        let pod = resource.downcast_ref::<Pod>()?;
        let mut out = self.resource.generate_k8s("pod", resource, options);

        let namespace = pod.metadata.namespace.clone().unwrap_or_default();

        // a Pod handled by a ReplicaSet may ultimately be controlled by a
        // Deployment, which only the ReplicaSet's own owners reveal
        if self.resource_metadata.deployment {
            let rs_name = out
                .get("replicaset.name")
                .and_then(Value::as_str)
                .map(String::from);

            if let Some(rs_name) = rs_name {
                if let Some(deployment) = self.replica_set_deployment(&rs_name, &namespace).await
                {
                    out.put("deployment.name", deployment);
                }
            }
        }

        if self.resource_metadata.cronjob {
            let job_name = out
                .get("job.name")
                .and_then(Value::as_str)
                .map(String::from);

            if let Some(job_name) = job_name {
                if let Some(cronjob) = self.job_cronjob(&job_name, &namespace).await {
                    out.put("cronjob.name", cronjob);
                }
            }
        }

        let node_name = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.node_name.clone())
            .unwrap_or_default();
        let node_meta = match &self.node {
            Some(node) => node
                .generate_from_name(&node_name, &[with_labels("node")])
                .await
                .and_then(|meta| meta.get("node").cloned()),
            None => None,
        };
        match node_meta {
            Some(subtree) => {
                out.put("node", subtree);
            }
            None => {
                out.put("node.name", node_name.as_str());
            }
        }

        if let Some(namespace_gen) = &self.namespace {
            if let Some(meta) = namespace_gen.generate_from_name(&namespace, &[]).await {
                out.deep_update(meta);
            }
        }

        if let Some(ip) = pod.status.as_ref().and_then(|status| status.pod_ip.as_deref()) {
            if !ip.is_empty() {
                out.put("pod.ip", ip);
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

        let pod = obj.downcast_ref::<Pod>()?;
        self.generate_k8s(pod, options).await
    }
}

/// Name of the first controlling owner of the wanted kind. Controlling
/// owners of other kinds do not end the scan.
fn controller_name(metadata: &ObjectMeta, kind: &str) -> Option<String> {
    metadata
        .owner_references
        .iter()
        .flatten()
        .filter(|reference| reference.controller == Some(true))
        .find(|reference| reference.kind == kind)
        .map(|reference| reference.name.clone())
        .filter(|name| !name.is_empty())
}

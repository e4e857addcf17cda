//! Point reads against the Kubernetes API server.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::batch::v1::Job;
use kube::Api;

use crate::Result;

/// The point reads workload resolution needs.
///
/// No retry and no timeout here; bounding lookup latency is the caller's
/// responsibility.
#[async_trait]
pub trait Client: Send + Sync {
    async fn replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet>;

    async fn job(&self, namespace: &str, name: &str) -> Result<Job>;
}

#[async_trait]
impl Client for kube::Client {
    async fn replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet> {
        let api: Api<ReplicaSet> = Api::namespaced(self.clone(), namespace);
        let rs = api.get(name).await?;
        Ok(rs)
    }

    async fn job(&self, namespace: &str, name: &str) -> Result<Job> {
        let api: Api<Job> = Api::namespaced(self.clone(), namespace);
        let job = api.get(name).await?;
        Ok(job)
    }
}

//! Object-safe access to watched Kubernetes objects.

use std::any::Any;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// A window over any watched Kubernetes object.
///
/// Generators accept `&dyn Resource` and guard on the concrete type they
/// handle, so a shared store can hold mixed object kinds without the
/// callers caring.
pub trait Resource: Any + Send + Sync {
    fn metadata(&self) -> &ObjectMeta;
}

impl dyn Resource {
    /// Downcast to the concrete object type.
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }
}

macro_rules! impl_resource {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Resource for $ty {
                fn metadata(&self) -> &ObjectMeta {
                    &self.metadata
                }
            }
        )+
    }
}

impl_resource!(
    Pod,
    Node,
    Namespace,
    Service,
    ReplicaSet,
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_guards_on_concrete_type() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("nginx".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let resource: &dyn Resource = &pod;
        assert_eq!(resource.metadata().name.as_deref(), Some("nginx"));
        assert!(resource.downcast_ref::<Pod>().is_some());
        assert!(resource.downcast_ref::<Node>().is_none());
        assert!(resource.downcast_ref::<Namespace>().is_none());
    }
}

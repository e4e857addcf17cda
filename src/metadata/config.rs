use serde::{Deserialize, Serialize};

/// Identity of the cluster the watched objects live in.
///
/// Resolving the cluster name or API server URL takes provider specific
/// calls, so the embedder resolves them up front and passes the result in.
/// Constructing generators never performs I/O.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClusterInfo {
    /// Name of the cluster.
    pub name: String,
    /// URL of the API server.
    pub url: String,
}

/// Configuration shared by all metadata generators.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Labels to copy into the generated metadata. Empty means all labels.
    pub include_labels: Vec<String>,
    /// Labels dropped from the generated metadata.
    pub exclude_labels: Vec<String>,
    /// Annotations to copy into the generated metadata. Annotations are
    /// opt-in, empty means none.
    pub include_annotations: Vec<String>,
    /// Replace dots in label keys with underscores. When disabled, dotted
    /// keys produce nested objects instead.
    pub labels_dedot: bool,
    /// Replace dots in annotation keys with underscores.
    pub annotations_dedot: bool,
    /// Cluster identity for the normalized orchestrator fields.
    pub cluster: ClusterInfo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_labels: vec![],
            exclude_labels: vec![],
            include_annotations: vec![],
            labels_dedot: true,
            annotations_dedot: true,
            cluster: ClusterInfo::default(),
        }
    }
}

/// Toggles for metadata of the workloads owning a Pod.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ResourceMetadataConfig {
    /// Resolve the Deployment behind the Pod's ReplicaSet.
    pub deployment: bool,
    /// Resolve the CronJob behind the Pod's Job.
    pub cronjob: bool,
}

impl Default for ResourceMetadataConfig {
    fn default() -> Self {
        Self {
            deployment: true,
            cronjob: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.include_labels.is_empty());
        assert!(config.include_annotations.is_empty());
        assert!(config.labels_dedot);
        assert!(config.annotations_dedot);
        assert_eq!(config.cluster, ClusterInfo::default());

        let resource_metadata = ResourceMetadataConfig::default();
        assert!(resource_metadata.deployment);
        assert!(resource_metadata.cronjob);
    }

    #[test]
    fn deserialize_partial() {
        let config = serde_yaml::from_str::<Config>(
            r#"
include_labels:
- app
labels_dedot: false
cluster:
  name: prod-1
"#,
        )
        .unwrap();

        assert_eq!(config.include_labels, vec!["app".to_string()]);
        assert!(!config.labels_dedot);
        // untouched fields keep their defaults
        assert!(config.annotations_dedot);
        assert_eq!(config.cluster.name, "prod-1");
        assert_eq!(config.cluster.url, "");
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let result = serde_yaml::from_str::<ResourceMetadataConfig>("unknown: true");
        assert!(result.is_err());
    }
}

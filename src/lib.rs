pub mod client;
pub mod document;
pub mod metadata;
pub mod resource;
pub mod store;

pub use client::Client;
pub use document::{Document, Value};
pub use metadata::{
    ClusterInfo, Config, FieldOption, MetaGen, NamespaceGenerator, NodeGenerator, PodGenerator,
    ResourceGenerator, ResourceMetadataConfig, ServiceGenerator, with_fields, with_labels,
};
pub use resource::Resource;
pub use store::{Applier, CacheStore, CacheWriter, Store, reflector};

/// Basic error type, dynamically dispatched and safe to send across threads.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Basic result type, defined in terms of [`Error`] and generic over `T`.
pub type Result<T> = std::result::Result<T, Error>;

use crate::backend::types::{GeocodeOutcome, ImageFile, ProgressReporter};
use crate::models::{Document, Identity};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// Session source for the whole application
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user right now, if any
    fn current_identity(&self) -> Option<Identity>;

    /// Change notifications; the receiver always holds the latest session
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Key-value document access by collection and identifier
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Create or overwrite the document
    async fn set(&self, collection: &str, id: &str, payload: Document) -> Result<()>;

    /// Merge the given fields into an existing document. Fails if it does not exist.
    /// A `null` value removes the field.
    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<()>;
}

/// Binary object storage that hands back publicly resolvable URLs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `image` under `key`; resolves to the download URL once complete
    async fn put(&self, key: &str, image: &ImageFile, progress: &ProgressReporter)
        -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Free-text address resolution
/// This allows swapping the HTTP service for a fixed table in tests
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<GeocodeOutcome>;

    /// Get the name of the geocoding source
    fn source_name(&self) -> &'static str;
}

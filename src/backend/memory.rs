//! In-process collaborators for the demo binary and the test suite.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::backend::traits::{BlobStore, DocumentStore, Geocoder, IdentityProvider};
use crate::backend::types::{
    GeocodeOutcome, ImageFile, ProgressReporter, UploadProgress, UploadState,
};
use crate::models::{Document, Identity, ServerTimestamp};

/// Identity provider whose session is switched by hand
pub struct MemoryIdentity {
    tx: watch::Sender<Option<Identity>>,
}

impl MemoryIdentity {
    pub fn signed_out() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn signed_in(identity: Identity) -> Self {
        let (tx, _) = watch::channel(Some(identity));
        Self { tx }
    }

    pub fn sign_in(&self, identity: Identity) {
        info!("Signed in as {}", identity.uid);
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        info!("Signed out");
        self.tx.send_replace(None);
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

/// Document store keeping everything in a map keyed by `(collection, id)`
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Document>>,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write
    pub async fn insert(&self, collection: &str, id: &str, document: Document) {
        let mut documents = self.documents.write().await;
        documents.insert((collection.to_string(), id.to_string()), resolve_server_values(document));
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

/// Replace server-value sentinels with the store's clock
fn resolve_server_values(mut document: Document) -> Document {
    let now = Utc::now().to_rfc3339();
    for value in document.values_mut() {
        if ServerTimestamp::is_sentinel(value) {
            *value = Value::String(now.clone());
        }
    }
    document
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, payload: Document) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.write().await;
        documents.insert(
            (collection.to_string(), id.to_string()),
            resolve_server_values(payload),
        );
        debug!("Stored {}/{}", collection, id);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| anyhow!("No document to update at {}/{}", collection, id))?;

        for (field, value) in resolve_server_values(partial) {
            if value.is_null() {
                existing.remove(&field);
            } else {
                existing.insert(field, value);
            }
        }
        debug!("Updated {}/{}", collection, id);
        Ok(())
    }
}

/// Blob store keeping uploads in memory; can be told to fail specific files
pub struct MemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    failing: HashSet<String>,
    latency: Duration,
    puts: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: RwLock::new(HashMap::new()),
            failing: HashSet::new(),
            latency: Duration::ZERO,
            puts: AtomicUsize::new(0),
        }
    }

    /// Uploads of a file with this original name are rejected
    pub fn failing_on(mut self, file_name: impl Into<String>) -> Self {
        self.failing.insert(file_name.into());
        self
    }

    /// Every upload takes this long to complete
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn keys(&self) -> Vec<String> {
        let blobs = self.blobs.read().await;
        let mut keys: Vec<String> = blobs.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/o/{}?alt=media", self.base_url, key.replace('/', "%2F"))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        image: &ImageFile,
        progress: &ProgressReporter,
    ) -> Result<String> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let total_bytes = image.len();

        progress.report(UploadProgress {
            bytes_transferred: 0,
            total_bytes,
            state: UploadState::Running,
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing.contains(&image.name) {
            return Err(anyhow!("Storage rejected {}", image.name));
        }

        self.blobs
            .write()
            .await
            .insert(key.to_string(), image.bytes.clone());

        progress.report(UploadProgress {
            bytes_transferred: total_bytes,
            total_bytes,
            state: UploadState::Running,
        });

        Ok(self.url_for(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.write().await.remove(key);
        debug!("Deleted blob {}", key);
        Ok(())
    }
}

/// Geocoder answering from a fixed address table
#[derive(Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodeOutcome>,
    lookups: AtomicUsize,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: impl Into<String>, outcome: GeocodeOutcome) -> Self {
        self.entries.insert(address.into(), outcome);
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn lookup(&self, address: &str) -> Result<GeocodeOutcome> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .get(address)
            .cloned()
            .unwrap_or(GeocodeOutcome::ZeroResults))
    }

    fn source_name(&self) -> &'static str {
        "Static table"
    }
}

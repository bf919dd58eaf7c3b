use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{BlobStore, DocumentStore, Geocoder, IdentityProvider};
use crate::models::GeoLocation;

/// A file picked in the image input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name, e.g. `kitchen.jpg`
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).map(str::to_string);
        Self {
            name,
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Only the formats the image input accepts
fn content_type_for(name: &str) -> Option<&'static str> {
    let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Running,
    Paused,
}

/// Snapshot emitted by the blob store while an upload is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub state: UploadState,
}

impl UploadProgress {
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.bytes_transferred as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Receives progress snapshots for one upload. Diagnostic only.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    key: String,
}

impl ProgressReporter {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn report(&self, snapshot: UploadProgress) {
        match snapshot.state {
            UploadState::Paused => debug!("Upload {} is paused", self.key),
            UploadState::Running => {
                debug!("Upload {} is {:.0}% done", self.key, snapshot.percent())
            }
        }
    }
}

/// Result of resolving a free-text address
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Match {
        formatted_address: String,
        location: GeoLocation,
    },
    ZeroResults,
}

/// Handles to every external collaborator the listing pages talk to
#[derive(Clone)]
pub struct Services {
    pub identity: Arc<dyn IdentityProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// `None` disables geolocation lookup; coordinates come from the form
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

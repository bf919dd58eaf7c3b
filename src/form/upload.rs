use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use futures_util::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::types::{ImageFile, ProgressReporter};
use crate::backend::BlobStore;
use crate::config::RollbackPolicy;
use crate::error::ListingError;

/// Cancels in-flight uploads when the page goes away
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Storage key for one image: `{prefix}{userId}-{fileName}-{random}`
pub fn blob_key(prefix: &str, user_id: &str, file_name: &str) -> String {
    format!("{prefix}{user_id}-{file_name}-{}", Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub key: String,
    pub url: String,
}

/// Uploads every image of one submission concurrently
pub struct ImageUploader<'a> {
    blobs: &'a dyn BlobStore,
    prefix: &'a str,
    rollback: RollbackPolicy,
}

impl<'a> ImageUploader<'a> {
    pub fn new(blobs: &'a dyn BlobStore, prefix: &'a str, rollback: RollbackPolicy) -> Self {
        Self {
            blobs,
            prefix,
            rollback,
        }
    }

    /// All-or-nothing: the URLs in selection order, or an error if any upload failed
    pub async fn upload_all(
        &self,
        owner: &str,
        images: &[ImageFile],
        cancel: &CancelToken,
    ) -> Result<Vec<String>, ListingError> {
        if cancel.is_cancelled() {
            return Err(ListingError::Cancelled);
        }

        info!("Uploading {} images for {}", images.len(), owner);

        let uploads = images
            .iter()
            .map(|image| self.upload_one(owner, image, cancel));
        let results = join_all(uploads).await;

        let total = results.len();
        let mut uploaded = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(image) => uploaded.push(image),
                Err(err) => failures.push(err),
            }
        }

        if failures.is_empty() {
            return Ok(uploaded.into_iter().map(|image| image.url).collect());
        }

        warn!(
            "{} of {} image uploads failed, aborting submission",
            failures.len(),
            total
        );
        self.roll_back(&uploaded).await;

        if cancel.is_cancelled() {
            return Err(ListingError::Cancelled);
        }

        Err(ListingError::Upload {
            failed: failures.len(),
            total,
            reason: format!("{:#}", failures[0]),
        })
    }

    async fn upload_one(
        &self,
        owner: &str,
        image: &ImageFile,
        cancel: &CancelToken,
    ) -> Result<UploadedImage> {
        let key = blob_key(self.prefix, owner, &image.name);
        let progress = ProgressReporter::new(key.clone());

        tokio::select! {
            _ = cancel.cancelled() => Err(anyhow!("Upload of {} cancelled", image.name)),
            url = self.blobs.put(&key, image, &progress) => {
                let url = url.with_context(|| format!("Failed to upload {}", image.name))?;
                debug!("Uploaded {} to {}", image.name, url);
                Ok(UploadedImage { key, url })
            }
        }
    }

    async fn roll_back(&self, uploaded: &[UploadedImage]) {
        if uploaded.is_empty() {
            return;
        }

        match self.rollback {
            RollbackPolicy::Keep => {
                info!(
                    "Keeping {} already uploaded images in storage",
                    uploaded.len()
                );
            }
            RollbackPolicy::DeleteUploaded => {
                for image in uploaded {
                    if let Err(err) = self.blobs.delete(&image.key).await {
                        warn!("Failed to delete orphaned blob {}: {:#}", image.key, err);
                    }
                }
                info!("Deleted {} orphaned images", uploaded.len());
            }
        }
    }
}

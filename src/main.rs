use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use listing_portal::app::{Navbar, Navigator, Route, Toasts};
use listing_portal::backend::memory::{MemoryBlobStore, MemoryDocumentStore, MemoryIdentity};
use listing_portal::backend::{
    DocumentStore, Geocoder, GoogleGeocoder, IdentityProvider, ImageFile, Services,
};
use listing_portal::config::Config;
use listing_portal::form::{ListingFormPage, SubmitSettings};
use listing_portal::models::{Identity, LISTINGS_COLLECTION};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: listing-portal <draft.json> [image ...]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(draft_path) = args.get(1) else {
        bail!(USAGE);
    };

    info!("🏠 Listing Portal - create listing");

    let config = Config::load()?;

    let destination = Route::CreateListing;
    let identity = match std::env::var("LISTING_USER") {
        Ok(uid) => MemoryIdentity::signed_in(Identity {
            uid,
            email: std::env::var("LISTING_EMAIL").ok(),
        }),
        Err(_) if destination.is_protected() => {
            bail!("{destination} requires a signed-in user, set LISTING_USER")
        }
        Err(_) => MemoryIdentity::signed_out(),
    };
    if let Some(owner) = identity.current_identity() {
        info!(
            "Signed in as {}",
            owner.email.as_deref().unwrap_or(owner.uid.as_str())
        );
    }

    let documents = Arc::new(MemoryDocumentStore::new());
    let geocoder = match config.geocode_params() {
        Some(params) => {
            Some(Arc::new(GoogleGeocoder::with_params(params)?) as Arc<dyn Geocoder>)
        }
        None => None,
    };
    let services = Services {
        identity: Arc::new(identity),
        documents: documents.clone(),
        blobs: Arc::new(MemoryBlobStore::new("https://storage.local")),
        geocoder,
    };

    let (toasts, mut toast_rx) = Toasts::channel();
    let (navigator, mut route_rx) = Navigator::channel();

    let mut page = ListingFormPage::create(
        services,
        SubmitSettings::from(&config),
        toasts,
        navigator.clone(),
    );

    let draft = tokio::fs::read_to_string(draft_path)
        .await
        .with_context(|| format!("Failed to read draft {draft_path}"))?;
    let draft: serde_json::Map<String, Value> =
        serde_json::from_str(&draft).context("Draft must be a JSON object of form fields")?;

    for (field_id, value) in &draft {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        page.mutate_field(field_id, &raw)?;
    }

    let mut images = Vec::new();
    for path in &args[2..] {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {path}"))?;
        let name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        images.push(ImageFile::new(name, bytes));
    }
    page.select_images(images)?;

    let cancel = page.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling uploads");
            cancel.cancel();
        }
    });

    let result = page.submit().await;
    interrupt.abort();

    while let Ok(toast) = toast_rx.try_recv() {
        println!("[{:?}] {}", toast.level, toast.message);
    }

    let route = match result {
        Ok(route) => route,
        Err(err) => {
            warn!("Listing was not saved");
            return Err(err.into());
        }
    };

    let mut current = Route::Explore;
    while let Ok(next) = route_rx.try_recv() {
        current = next;
    }
    println!("{}", Navbar::new(navigator).render(&current.path()));

    let Route::Listing { listing_id, .. } = &route else {
        bail!("Unexpected destination {route}");
    };
    let stored = documents
        .get(LISTINGS_COLLECTION, listing_id)
        .await?
        .context("Saved listing is missing from the store")?;

    let json = serde_json::to_string_pretty(&stored)?;
    println!("{json}");

    tokio::fs::create_dir_all("saved_listings").await?;
    let filename = format!("saved_listings/{listing_id}.json");
    tokio::fs::write(&filename, json).await?;
    info!("💾 Saved listing to {}", filename);

    Ok(())
}

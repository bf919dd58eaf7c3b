#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use listing_portal::app::{Navigator, Route, Toast, ToastLevel, Toasts};
use listing_portal::backend::memory::{
    MemoryBlobStore, MemoryDocumentStore, MemoryIdentity, StaticGeocoder,
};
use listing_portal::backend::{GeocodeOutcome, Geocoder, ImageFile, Services};
use listing_portal::form::{ListingFormPage, SubmitSettings};
use listing_portal::models::{Document, GeoLocation, Identity, LISTINGS_COLLECTION};

pub const OWNER: &str = "user-a";
pub const OTHER_USER: &str = "user-b";
pub const KNOWN_ADDRESS: &str = "221B Baker Street";
pub const RESOLVED_ADDRESS: &str = "221B Baker St, London NW1 6XE, UK";

pub struct Harness {
    pub identity: Arc<MemoryIdentity>,
    pub documents: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub geocoder: Arc<StaticGeocoder>,
    pub settings: SubmitSettings,
    pub toasts: Toasts,
    pub toast_rx: UnboundedReceiver<Toast>,
    pub navigator: Navigator,
    pub route_rx: UnboundedReceiver<Route>,
}

impl Harness {
    pub fn signed_in_as(uid: &str) -> Self {
        Self::build(
            MemoryIdentity::signed_in(Identity::new(uid)),
            MemoryBlobStore::new("https://blobs.test"),
        )
    }

    pub fn signed_out() -> Self {
        Self::build(
            MemoryIdentity::signed_out(),
            MemoryBlobStore::new("https://blobs.test"),
        )
    }

    pub fn with_blobs(uid: &str, blobs: MemoryBlobStore) -> Self {
        Self::build(MemoryIdentity::signed_in(Identity::new(uid)), blobs)
    }

    fn build(identity: MemoryIdentity, blobs: MemoryBlobStore) -> Self {
        let geocoder = StaticGeocoder::new().with_entry(
            KNOWN_ADDRESS,
            GeocodeOutcome::Match {
                formatted_address: RESOLVED_ADDRESS.to_string(),
                location: GeoLocation {
                    lat: 51.5237,
                    lng: -0.1585,
                },
            },
        );
        let (toasts, toast_rx) = Toasts::channel();
        let (navigator, route_rx) = Navigator::channel();

        Self {
            identity: Arc::new(identity),
            documents: Arc::new(MemoryDocumentStore::new()),
            blobs: Arc::new(blobs),
            geocoder: Arc::new(geocoder),
            settings: SubmitSettings::default(),
            toasts,
            toast_rx,
            navigator,
            route_rx,
        }
    }

    pub fn without_geolocation(mut self) -> Self {
        self.settings.geolocation_enabled = false;
        self
    }

    pub fn services(&self) -> Services {
        Services {
            identity: self.identity.clone(),
            documents: self.documents.clone(),
            blobs: self.blobs.clone(),
            geocoder: Some(self.geocoder.clone() as Arc<dyn Geocoder>),
        }
    }

    pub fn create_page(&self) -> ListingFormPage {
        ListingFormPage::create(
            self.services(),
            self.settings.clone(),
            self.toasts.clone(),
            self.navigator.clone(),
        )
    }

    pub fn edit_page(&self, listing_id: &str) -> ListingFormPage {
        ListingFormPage::edit(
            listing_id,
            self.services(),
            self.settings.clone(),
            self.toasts.clone(),
            self.navigator.clone(),
        )
    }

    pub async fn seed_listing(&self, id: &str, owner: &str) {
        self.documents
            .insert(LISTINGS_COLLECTION, id, stored_listing(owner))
            .await;
    }

    pub async fn stored(&self, id: &str) -> Document {
        use listing_portal::backend::DocumentStore;

        self.documents
            .get(LISTINGS_COLLECTION, id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("listing {id} not stored"))
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = self.toast_rx.try_recv() {
            toasts.push(toast);
        }
        toasts
    }

    pub fn drain_routes(&mut self) -> Vec<Route> {
        let mut routes = Vec::new();
        while let Ok(route) = self.route_rx.try_recv() {
            routes.push(route);
        }
        routes
    }

    pub async fn next_route(&mut self) -> Option<Route> {
        tokio::time::timeout(Duration::from_secs(1), self.route_rx.recv())
            .await
            .ok()
            .flatten()
    }
}

pub fn error_toast(message: &str) -> Toast {
    Toast {
        level: ToastLevel::Error,
        message: message.to_string(),
    }
}

pub fn images(count: usize) -> Vec<ImageFile> {
    (0..count)
        .map(|i| ImageFile::new(format!("photo-{i}.jpg"), vec![i as u8; 16]))
        .collect()
}

/// Fill the form with a listing that passes every check
pub fn fill_valid_form(page: &mut ListingFormPage) {
    let fields = [
        ("type", "sale"),
        ("name", "Bright family home"),
        ("bedrooms", "3"),
        ("bathrooms", "2"),
        ("parking", "true"),
        ("furnished", "false"),
        ("address", KNOWN_ADDRESS),
        ("offer", "false"),
        ("regularPrice", "200"),
    ];
    for (id, value) in fields {
        page.mutate_field(id, value).unwrap();
    }
    page.select_images(images(2)).unwrap();
}

pub fn stored_listing(owner: &str) -> Document {
    let value = json!({
        "type": "rent",
        "name": "Studio near the park",
        "bedrooms": 1,
        "bathrooms": 1,
        "parking": false,
        "furnished": true,
        "location": KNOWN_ADDRESS,
        "offer": false,
        "regularPrice": 950.0,
        "imgUrls": ["https://blobs.test/o/images%2Fold.jpg?alt=media"],
        "geolocation": { "lat": 51.5237, "lng": -0.1585 },
        "userRef": owner,
        "timestamp": "2026-01-04T22:15:06Z"
    });
    match value {
        Value::Object(document) => document,
        _ => unreachable!(),
    }
}

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Collection that holds every listing document
pub const LISTINGS_COLLECTION: &str = "listings";

/// Upper bound on images attached to a single listing
pub const MAX_IMAGES: usize = 6;

/// Key of the server-value sentinel understood by the document store
pub const SERVER_VALUE_KEY: &str = ".sv";

/// A stored document: a JSON object keyed by field name
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Whether a property is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    #[default]
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latitude/longitude pair for a property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// An authenticated user as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}

/// Listing attributes shared by the stored document and the write payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingFields {
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub name: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: bool,
    pub furnished: bool,
    pub location: String,
    pub offer: bool,
    pub regular_price: f64,
    /// Only present while `offer` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
    #[serde(rename = "imgUrls", default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub geolocation: GeoLocation,
    #[serde(rename = "userRef")]
    pub owner_ref: String,
}

/// A listing as read back from the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    #[serde(flatten)]
    pub fields: ListingFields,
    /// Assigned by the store on every write
    #[serde(rename = "timestamp", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn from_document(document: Document) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::Value::Object(document))
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.fields.owner_ref == identity.uid
    }
}

/// Placeholder the document store replaces with its own clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerTimestamp;

impl ServerTimestamp {
    pub fn is_sentinel(value: &serde_json::Value) -> bool {
        value
            .as_object()
            .and_then(|object| object.get(SERVER_VALUE_KEY))
            .and_then(|kind| kind.as_str())
            == Some("timestamp")
    }
}

impl Serialize for ServerTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(SERVER_VALUE_KEY, "timestamp")?;
        map.end()
    }
}

/// The shape written to the document store on create or edit
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingPayload {
    #[serde(flatten)]
    pub fields: ListingFields,
    pub timestamp: ServerTimestamp,
}

impl ListingPayload {
    pub fn into_document(self) -> serde_json::Result<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(document) => Ok(document),
            other => Err(serde::ser::Error::custom(format!(
                "listing payload serialized to {other}, expected an object"
            ))),
        }
    }

    /// Document for merging into an existing listing. Unset optional fields
    /// are written as `null` so the merge clears any stored value.
    pub fn into_update(self) -> serde_json::Result<Document> {
        let mut document = self.into_document()?;
        document
            .entry("discountedPrice")
            .or_insert(serde_json::Value::Null);
        Ok(document)
    }
}

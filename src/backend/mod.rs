pub mod geocode;
pub mod memory;
pub mod traits;
pub mod types;

pub use geocode::GoogleGeocoder;
pub use traits::{BlobStore, DocumentStore, Geocoder, IdentityProvider};
pub use types::{GeocodeOutcome, ImageFile, Services};

use tracing::{info, warn};
use uuid::Uuid;

use crate::app::routes::Route;
use crate::backend::types::{GeocodeOutcome, Services};
use crate::backend::Geocoder;
use crate::config::{Config, RollbackPolicy};
use crate::error::{ListingError, ValidationError};
use crate::form::state::{FormMode, FormState};
use crate::form::upload::{CancelToken, ImageUploader};
use crate::models::{
    GeoLocation, Identity, ListingFields, ListingPayload, ServerTimestamp, LISTINGS_COLLECTION,
    MAX_IMAGES,
};

pub const MAX_NAME_LEN: usize = 32;

/// Marker the geocoder leaves in addresses it could not fully resolve
const UNRESOLVED_PLACEHOLDER: &str = "undefined";

/// Knobs of the submission workflow
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub geolocation_enabled: bool,
    pub image_prefix: String,
    pub rollback: RollbackPolicy,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SubmitSettings {
    fn from(config: &Config) -> Self {
        Self {
            geolocation_enabled: config.geolocation_enabled,
            image_prefix: config.image_prefix.clone(),
            rollback: config.upload_rollback,
        }
    }
}

/// Checks that need no backend, in the order they are reported
pub fn validate(form: &FormState, mode: &FormMode) -> Result<(), ValidationError> {
    if form.offer && form.discounted_price >= form.regular_price {
        return Err(ValidationError::PriceOrdering);
    }

    if form.images.len() > MAX_IMAGES {
        return Err(ValidationError::TooManyImages {
            count: form.images.len(),
        });
    }
    if let Some(image) = form.images.iter().find(|image| image.content_type.is_none()) {
        return Err(ValidationError::UnsupportedImage {
            name: image.name.clone(),
        });
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
    }
    if form.bedrooms < 1 {
        return Err(ValidationError::Bedrooms);
    }
    if form.bathrooms < 1 {
        return Err(ValidationError::Bathrooms);
    }
    if form.regular_price <= 0.0 {
        return Err(ValidationError::RegularPrice);
    }
    if form.address.trim().is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    if *mode == FormMode::Create && form.images.is_empty() {
        return Err(ValidationError::MissingImages);
    }

    Ok(())
}

/// Accept a geocoder answer only if it names a fully resolved address
pub fn check_resolved_address(
    outcome: GeocodeOutcome,
) -> Result<(String, GeoLocation), ValidationError> {
    match outcome {
        GeocodeOutcome::Match {
            formatted_address,
            location,
        } if !formatted_address.contains(UNRESOLVED_PLACEHOLDER) => {
            Ok((formatted_address, location))
        }
        _ => Err(ValidationError::InvalidAddress),
    }
}

/// The stored `location` string and coordinates for this form
pub async fn resolve_location(
    form: &FormState,
    geocoder: Option<&dyn Geocoder>,
) -> Result<(String, GeoLocation), ListingError> {
    match geocoder {
        Some(geocoder) => {
            let outcome = geocoder.lookup(form.address.trim()).await?;
            let resolved = check_resolved_address(outcome)?;
            info!(
                "{} resolved '{}' to '{}'",
                geocoder.source_name(),
                form.address,
                resolved.0
            );
            Ok(resolved)
        }
        None => Ok((
            form.address.clone(),
            GeoLocation {
                lat: form.latitude,
                lng: form.longitude,
            },
        )),
    }
}

/// Merge the form with the upload and geocoding results into the stored shape.
/// The raw file list, address and manual coordinates are not persisted.
pub fn build_payload(
    form: &FormState,
    image_urls: Vec<String>,
    location: String,
    geolocation: GeoLocation,
    owner: &Identity,
) -> ListingPayload {
    ListingPayload {
        fields: ListingFields {
            kind: form.kind,
            name: form.name.trim().to_string(),
            bedrooms: form.bedrooms,
            bathrooms: form.bathrooms,
            parking: form.parking,
            furnished: form.furnished,
            location,
            offer: form.offer,
            regular_price: form.regular_price,
            discounted_price: form.offer.then_some(form.discounted_price),
            image_urls,
            geolocation,
            owner_ref: owner.uid.clone(),
        },
        timestamp: ServerTimestamp,
    }
}

/// Run the whole submission. Steps run in order; only the uploads overlap.
/// Nothing is written unless every step before the write succeeded.
pub async fn submit_listing(
    form: &FormState,
    mode: &FormMode,
    services: &Services,
    settings: &SubmitSettings,
    owner: &Identity,
    cancel: &CancelToken,
) -> Result<Route, ListingError> {
    validate(form, mode)?;

    let geocoder = if settings.geolocation_enabled {
        services.geocoder.as_deref()
    } else {
        None
    };
    let (location, geolocation) = resolve_location(form, geocoder).await?;

    let image_urls = if form.images.is_empty() {
        form.existing_image_urls.clone()
    } else {
        ImageUploader::new(
            services.blobs.as_ref(),
            &settings.image_prefix,
            settings.rollback,
        )
        .upload_all(&owner.uid, &form.images, cancel)
        .await?
    };

    if cancel.is_cancelled() {
        warn!("Submission cancelled before saving");
        return Err(ListingError::Cancelled);
    }

    let payload = build_payload(form, image_urls, location, geolocation, owner);
    let kind = payload.fields.kind;

    let listing_id = match mode {
        FormMode::Create => {
            let listing_id = Uuid::new_v4().simple().to_string();
            let document = payload
                .into_document()
                .map_err(|err| ListingError::Backend(err.into()))?;
            services
                .documents
                .set(LISTINGS_COLLECTION, &listing_id, document)
                .await?;
            listing_id
        }
        FormMode::Edit { listing_id } => {
            let document = payload
                .into_update()
                .map_err(|err| ListingError::Backend(err.into()))?;
            services
                .documents
                .update(LISTINGS_COLLECTION, listing_id, document)
                .await?;
            listing_id.clone()
        }
    };

    info!("Saved listing {}", listing_id);

    Ok(Route::Listing {
        category: kind.as_str().to_string(),
        listing_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::ImageFile;

    fn valid_form() -> FormState {
        FormState {
            name: "Garden flat".into(),
            address: "12 High St".into(),
            regular_price: 200.0,
            images: vec![ImageFile::new("a.jpg", vec![1])],
            ..FormState::default()
        }
    }

    #[test]
    fn price_ordering_only_checked_for_offers() {
        let mut form = valid_form();
        form.discounted_price = 500.0;
        assert_eq!(validate(&form, &FormMode::Create), Ok(()));

        form.offer = true;
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::PriceOrdering)
        );

        form.discounted_price = 200.0;
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::PriceOrdering)
        );

        form.discounted_price = 199.0;
        assert_eq!(validate(&form, &FormMode::Create), Ok(()));
    }

    #[test]
    fn price_ordering_is_reported_before_image_count() {
        let mut form = valid_form();
        form.offer = true;
        form.discounted_price = 300.0;
        form.images = vec![ImageFile::new("x.jpg", vec![]); 7];
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::PriceOrdering)
        );
    }

    #[test]
    fn more_than_six_images_rejected() {
        let mut form = valid_form();
        form.images = vec![ImageFile::new("x.jpg", vec![]); 6];
        assert_eq!(validate(&form, &FormMode::Create), Ok(()));

        form.images.push(ImageFile::new("y.jpg", vec![]));
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::TooManyImages { count: 7 })
        );
    }

    #[test]
    fn only_jpeg_and_png_images_accepted() {
        let mut form = valid_form();
        form.images.push(ImageFile::new("floorplan.PNG", vec![2]));
        form.images.push(ImageFile::new("porch.jpeg", vec![3]));
        assert_eq!(validate(&form, &FormMode::Create), Ok(()));

        form.images.push(ImageFile::new("tour.gif", vec![4]));
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::UnsupportedImage {
                name: "tour.gif".into()
            })
        );
    }

    #[test]
    fn create_needs_an_image_but_edit_does_not() {
        let mut form = valid_form();
        form.images.clear();
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::MissingImages)
        );
        assert_eq!(
            validate(
                &form,
                &FormMode::Edit {
                    listing_id: "x".into()
                }
            ),
            Ok(())
        );
    }

    #[test]
    fn field_rules() {
        let mut form = valid_form();
        form.name = "   ".into();
        assert_eq!(validate(&form, &FormMode::Create), Err(ValidationError::EmptyName));

        form.name = "x".repeat(33);
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::NameTooLong { max: 32 })
        );

        let mut form = valid_form();
        form.bedrooms = 0;
        assert_eq!(validate(&form, &FormMode::Create), Err(ValidationError::Bedrooms));

        let mut form = valid_form();
        form.regular_price = 0.0;
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::RegularPrice)
        );

        let mut form = valid_form();
        form.address = String::new();
        assert_eq!(
            validate(&form, &FormMode::Create),
            Err(ValidationError::EmptyAddress)
        );
    }

    #[test]
    fn unresolved_addresses_rejected() {
        assert_eq!(
            check_resolved_address(GeocodeOutcome::ZeroResults),
            Err(ValidationError::InvalidAddress)
        );
        assert_eq!(
            check_resolved_address(GeocodeOutcome::Match {
                formatted_address: "undefined, undefined".into(),
                location: GeoLocation::default(),
            }),
            Err(ValidationError::InvalidAddress)
        );
        assert!(check_resolved_address(GeocodeOutcome::Match {
            formatted_address: "12 High St, Oxford".into(),
            location: GeoLocation { lat: 51.7, lng: -1.2 },
        })
        .is_ok());
    }

    #[test]
    fn payload_drops_discount_without_offer() {
        let mut form = valid_form();
        form.discounted_price = 150.0;
        let owner = Identity::new("owner-1");

        let payload = build_payload(&form, vec![], "12 High St".into(), GeoLocation::default(), &owner);
        assert_eq!(payload.fields.discounted_price, None);
        assert_eq!(payload.fields.owner_ref, "owner-1");

        form.offer = true;
        let payload = build_payload(&form, vec![], "12 High St".into(), GeoLocation::default(), &owner);
        assert_eq!(payload.fields.discounted_price, Some(150.0));
    }

    #[tokio::test]
    async fn manual_coordinates_without_geocoder() {
        let mut form = valid_form();
        form.latitude = 48.85;
        form.longitude = 2.35;

        let (location, geolocation) = resolve_location(&form, None).await.unwrap();
        assert_eq!(location, "12 High St");
        assert_eq!(geolocation, GeoLocation { lat: 48.85, lng: 2.35 });
    }
}

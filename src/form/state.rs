use crate::app::routes::Route;
use crate::backend::types::ImageFile;
use crate::form::fields::FieldUpdate;
use crate::models::{Listing, ListingType};

/// Whether the page creates a new listing or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { listing_id: String },
}

/// Page-local copy of the listing being edited, plus the raw file selection
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub kind: ListingType,
    pub name: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: bool,
    pub furnished: bool,
    pub address: String,
    pub offer: bool,
    pub regular_price: f64,
    pub discounted_price: f64,
    /// Manual coordinates, used when geolocation lookup is off
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<ImageFile>,
    /// URLs already stored on the listing (edit mode)
    pub existing_image_urls: Vec<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            kind: ListingType::Rent,
            name: String::new(),
            bedrooms: 1,
            bathrooms: 1,
            parking: false,
            furnished: false,
            address: String::new(),
            offer: false,
            regular_price: 0.0,
            discounted_price: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            images: Vec::new(),
            existing_image_urls: Vec::new(),
        }
    }
}

impl FormState {
    pub fn from_listing(listing: &Listing) -> Self {
        let fields = &listing.fields;
        Self {
            kind: fields.kind,
            name: fields.name.clone(),
            bedrooms: fields.bedrooms,
            bathrooms: fields.bathrooms,
            parking: fields.parking,
            furnished: fields.furnished,
            address: fields.location.clone(),
            offer: fields.offer,
            regular_price: fields.regular_price,
            discounted_price: fields.discounted_price.unwrap_or_default(),
            latitude: fields.geolocation.lat,
            longitude: fields.geolocation.lng,
            images: Vec::new(),
            existing_image_urls: fields.image_urls.clone(),
        }
    }

    pub fn apply(mut self, update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Type(kind) => self.kind = kind,
            FieldUpdate::Name(name) => self.name = name,
            FieldUpdate::Bedrooms(n) => self.bedrooms = n,
            FieldUpdate::Bathrooms(n) => self.bathrooms = n,
            FieldUpdate::Parking(v) => self.parking = v,
            FieldUpdate::Furnished(v) => self.furnished = v,
            FieldUpdate::Address(address) => self.address = address,
            FieldUpdate::Offer(v) => self.offer = v,
            FieldUpdate::RegularPrice(price) => self.regular_price = price,
            FieldUpdate::DiscountedPrice(price) => self.discounted_price = price,
            FieldUpdate::Latitude(lat) => self.latitude = lat,
            FieldUpdate::Longitude(lng) => self.longitude = lng,
        }
        self
    }
}

/// Lifecycle of the listing form page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageStatus {
    #[default]
    Idle,
    /// Fetching the listing to edit
    Loading,
    /// Form is editable
    Ready,
    /// Form is disabled while the submission runs
    Submitting,
    /// Saved; the page navigates to the route
    Success(Route),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageState {
    pub status: PageStatus,
    pub form: FormState,
    /// Message of the last failed submission
    pub last_error: Option<String>,
    /// `userRef` of the listing loaded for editing
    pub owner_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Create mode: the empty form is shown immediately
    Opened,
    LoadStarted,
    Loaded(Box<Listing>),
    LoadFailed,
    FieldChanged(FieldUpdate),
    FilesChanged(Vec<ImageFile>),
    SubmitStarted,
    SubmitSucceeded(Route),
    SubmitFailed(String),
}

/// Pure transition function for the page. Actions that do not apply to the
/// current status leave the state untouched.
pub fn reduce(state: PageState, action: Action) -> PageState {
    use PageStatus::*;

    let status = state.status.clone();
    match (status, action) {
        (Idle, Action::Opened) => PageState {
            status: Ready,
            ..state
        },
        (Idle, Action::LoadStarted) => PageState {
            status: Loading,
            ..state
        },
        (Loading, Action::Loaded(listing)) => PageState {
            status: Ready,
            form: FormState::from_listing(&listing),
            last_error: None,
            owner_ref: Some(listing.fields.owner_ref),
        },
        (Loading, Action::LoadFailed) => PageState {
            status: Idle,
            ..state
        },
        (Ready, Action::FieldChanged(update)) => PageState {
            form: state.form.apply(update),
            ..state
        },
        (Ready, Action::FilesChanged(images)) => PageState {
            form: FormState {
                images,
                ..state.form
            },
            ..state
        },
        (Ready, Action::SubmitStarted) => PageState {
            status: Submitting,
            last_error: None,
            ..state
        },
        (Submitting, Action::SubmitSucceeded(route)) => PageState {
            status: Success(route),
            ..state
        },
        (Submitting, Action::SubmitFailed(message)) => PageState {
            status: Ready,
            last_error: Some(message),
            ..state
        },
        _ => state,
    }
}

use thiserror::Error;

use crate::app::routes::Route;
use crate::models::MAX_IMAGES;

/// Form contents rejected before anything is sent to the backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Discounted price needs to be less than regular price")]
    PriceOrdering,

    #[error("Max {} images", MAX_IMAGES)]
    TooManyImages { count: usize },

    #[error("Only .jpg, .jpeg and .png images are allowed")]
    UnsupportedImage { name: String },

    #[error("Please select at least one image")]
    MissingImages,

    #[error("Please enter a correct address")]
    InvalidAddress,

    #[error("Please enter an address")]
    EmptyAddress,

    #[error("Please enter a name for the listing")]
    EmptyName,

    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("Bedrooms must be at least 1")]
    Bedrooms,

    #[error("Bathrooms must be at least 1")]
    Bathrooms,

    #[error("Regular price must be greater than 0")]
    RegularPrice,
}

/// A raw form value that could not be turned into a typed field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Unknown form field '{0}'")]
    UnknownField(String),

    #[error("Expected \"true\" or \"false\" for {field}, got '{value}'")]
    InvalidBool { field: &'static str, value: String },

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown listing type '{0}'")]
    UnknownListingType(String),
}

/// Everything the listing form page can fail with.
///
/// The `Display` text is what the user sees in the toast.
#[derive(Error, Debug)]
pub enum ListingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("You can not edit that listing")]
    Forbidden { listing_id: String },

    #[error("Listing does not exist")]
    NotFound { listing_id: String },

    #[error("Please sign in to continue")]
    Unauthenticated,

    #[error("Images not uploaded")]
    Upload {
        failed: usize,
        total: usize,
        reason: String,
    },

    #[error("Image upload cancelled")]
    Cancelled,

    #[error("The form is busy, please wait")]
    Busy,

    #[error("Something went wrong: {0}")]
    Backend(anyhow::Error),
}

impl From<anyhow::Error> for ListingError {
    fn from(err: anyhow::Error) -> Self {
        ListingError::Backend(err)
    }
}

impl ListingError {
    /// Where the page sends the user after this error, if it leaves the form
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ListingError::Forbidden { .. } | ListingError::NotFound { .. } => Some(Route::Explore),
            ListingError::Unauthenticated => Some(Route::SignIn),
            _ => None,
        }
    }

    /// Problems with what the user entered, as opposed to backend or access failures
    pub fn is_validation(&self) -> bool {
        matches!(self, ListingError::Validation(_) | ListingError::Field(_))
    }
}

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod models;

pub use error::{FieldError, ListingError, ValidationError};

use std::str::FromStr;

use crate::error::FieldError;
use crate::models::ListingType;

/// Ids of the inputs on the listing form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Type,
    Name,
    Bedrooms,
    Bathrooms,
    Parking,
    Furnished,
    Address,
    Offer,
    RegularPrice,
    DiscountedPrice,
    Latitude,
    Longitude,
}

impl FieldId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Type => "type",
            FieldId::Name => "name",
            FieldId::Bedrooms => "bedrooms",
            FieldId::Bathrooms => "bathrooms",
            FieldId::Parking => "parking",
            FieldId::Furnished => "furnished",
            FieldId::Address => "address",
            FieldId::Offer => "offer",
            FieldId::RegularPrice => "regularPrice",
            FieldId::DiscountedPrice => "discountedPrice",
            FieldId::Latitude => "latitude",
            FieldId::Longitude => "longitude",
        }
    }
}

impl FromStr for FieldId {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "type" => FieldId::Type,
            "name" => FieldId::Name,
            "bedrooms" => FieldId::Bedrooms,
            "bathrooms" => FieldId::Bathrooms,
            "parking" => FieldId::Parking,
            "furnished" => FieldId::Furnished,
            "address" => FieldId::Address,
            "offer" => FieldId::Offer,
            "regularPrice" => FieldId::RegularPrice,
            "discountedPrice" => FieldId::DiscountedPrice,
            "latitude" => FieldId::Latitude,
            "longitude" => FieldId::Longitude,
            other => return Err(FieldError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// A typed change to one form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Type(ListingType),
    Name(String),
    Bedrooms(u32),
    Bathrooms(u32),
    Parking(bool),
    Furnished(bool),
    Address(String),
    Offer(bool),
    RegularPrice(f64),
    DiscountedPrice(f64),
    Latitude(f64),
    Longitude(f64),
}

/// Only the literals `true` and `false` are booleans
pub fn parse_bool(field: FieldId, raw: &str) -> Result<bool, FieldError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(FieldError::InvalidBool {
            field: field.as_str(),
            value: other.to_string(),
        }),
    }
}

pub fn parse_listing_type(raw: &str) -> Result<ListingType, FieldError> {
    match raw {
        "sale" => Ok(ListingType::Sale),
        "rent" => Ok(ListingType::Rent),
        other => Err(FieldError::UnknownListingType(other.to_string())),
    }
}

fn parse_count(field: FieldId, raw: &str) -> Result<u32, FieldError> {
    raw.trim().parse().map_err(|_| FieldError::InvalidNumber {
        field: field.as_str(),
        value: raw.to_string(),
    })
}

fn parse_decimal(field: FieldId, raw: &str) -> Result<f64, FieldError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FieldError::InvalidNumber {
            field: field.as_str(),
            value: raw.to_string(),
        })
}

/// Turn a raw `(element id, value)` pair from the form into a typed update
pub fn parse_field(field_id: &str, raw: &str) -> Result<FieldUpdate, FieldError> {
    let field: FieldId = field_id.parse()?;

    let update = match field {
        FieldId::Type => FieldUpdate::Type(parse_listing_type(raw)?),
        FieldId::Name => FieldUpdate::Name(raw.to_string()),
        FieldId::Bedrooms => FieldUpdate::Bedrooms(parse_count(field, raw)?),
        FieldId::Bathrooms => FieldUpdate::Bathrooms(parse_count(field, raw)?),
        FieldId::Parking => FieldUpdate::Parking(parse_bool(field, raw)?),
        FieldId::Furnished => FieldUpdate::Furnished(parse_bool(field, raw)?),
        FieldId::Address => FieldUpdate::Address(raw.to_string()),
        FieldId::Offer => FieldUpdate::Offer(parse_bool(field, raw)?),
        FieldId::RegularPrice => FieldUpdate::RegularPrice(parse_decimal(field, raw)?),
        FieldId::DiscountedPrice => FieldUpdate::DiscountedPrice(parse_decimal(field, raw)?),
        FieldId::Latitude => FieldUpdate::Latitude(parse_decimal(field, raw)?),
        FieldId::Longitude => FieldUpdate::Longitude(parse_decimal(field, raw)?),
    };

    Ok(update)
}

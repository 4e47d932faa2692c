use std::ops::RangeInclusive;

use crate::error::ValidationError;

pub const MAX_LABEL_LENGTH: usize = 255;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Validate that a label is 1 to `MAX_LABEL_LENGTH` characters long.
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    let len = label.chars().count();
    if len == 0 || len > MAX_LABEL_LENGTH {
        return Err(ValidationError::field(
            "label",
            format!("must be 1-{MAX_LABEL_LENGTH} characters"),
        ));
    }
    Ok(())
}

pub fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    validate_range("latitude", latitude, LATITUDE_RANGE)
}

pub fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    validate_range("longitude", longitude, LONGITUDE_RANGE)
}

/// Validate a search radius. NaN fails the comparison and is rejected.
pub fn validate_distance_km(distance_km: f64) -> Result<(), ValidationError> {
    if distance_km > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::field(
            "distance_km",
            "must be greater than 0",
        ))
    }
}

/// Validate list pagination: `skip >= 0` and `limit` in `[1, MAX_LIMIT]`.
pub fn validate_pagination(skip: i64, limit: i64) -> Result<(), ValidationError> {
    if skip < 0 {
        return Err(ValidationError::field("skip", "must be >= 0"));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ValidationError::field(
            "limit",
            format!("must be between 1 and {MAX_LIMIT}"),
        ));
    }
    Ok(())
}

fn validate_range(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::field(
        field,
        format!("must be between {} and {}", range.start(), range.end()),
    ))
}

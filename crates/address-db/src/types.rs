use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ValidationError;
use crate::validation::{
    validate_distance_km, validate_label, validate_latitude, validate_longitude,
};

/// Address row returned from SELECT queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: i64,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewAddress {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_label(&self.label)?;
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)?;
        Ok(())
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    pub label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.latitude.is_none() && self.longitude.is_none()
    }

    /// Validate only the supplied fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(label) = &self.label {
            validate_label(label)?;
        }
        if let Some(latitude) = self.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(longitude) = self.longitude {
            validate_longitude(longitude)?;
        }
        Ok(())
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.label.is_some() {
            fields.push("label");
        }
        if self.latitude.is_some() {
            fields.push("latitude");
        }
        if self.longitude.is_some() {
            fields.push("longitude");
        }
        fields
    }

    /// Overwrite the supplied fields on `address`. Timestamps are not touched.
    pub fn apply_to(&self, address: &mut Address) {
        if let Some(label) = &self.label {
            address.label = label.clone();
        }
        if let Some(latitude) = self.latitude {
            address.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            address.longitude = longitude;
        }
    }
}

/// Center point and radius for a nearby search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

impl NearbyQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)?;
        validate_distance_km(self.distance_km)?;
        Ok(())
    }
}

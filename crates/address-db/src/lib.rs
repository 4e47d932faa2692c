pub mod addresses;
pub mod error;
pub mod geo;
pub mod nearby;
pub mod store;
pub mod types;
pub mod validation;

pub use error::{Result, StoreError, ValidationError};
pub use nearby::find_nearby;
pub use store::AddressStore;
pub use types::*;

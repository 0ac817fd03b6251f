//! Products module - the slice of the external Product Registry that deals
//! with generation bindings.

mod products_model;
mod products_traits;

pub use products_model::{BoundProduct, ProductStatus};
pub use products_traits::ProductRegistryTrait;

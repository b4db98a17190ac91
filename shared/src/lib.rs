//! Shared types and farming logic for CropMagix
//!
//! This crate contains the domain models and the pure advice aggregation
//! used by the backend, and by the browser through the WASM bindings.

pub mod advisor;
pub mod i18n;
pub mod models;
pub mod types;
pub mod validation;

pub use advisor::*;
pub use models::*;
pub use types::*;
pub use validation::*;

//! Structural model of a C++ header, as consumed by the binding emitters.
//!
//! The model is deliberately flat: classes keep only their public methods and
//! enums, parameters carry both the declared and the "raw" type text. Base
//! classes are recorded but never consulted during emission.

mod types;
mod item;
mod header;
pub mod adapt;

pub use types::{split_declared_type, DeclaredType};
pub use item::*;
pub use header::HeaderModel;

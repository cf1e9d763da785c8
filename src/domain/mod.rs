//! Domain layer: society entities and the edit pass
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod plan;

pub use entities::*;
pub use error::DomainError;
pub use plan::{ArgumentPatch, EditPlan, EditReport};

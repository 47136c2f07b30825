//! # Model Inventory
//!
//! Discovers the classification executables in the models directory and
//! keeps `models.json` in step with them.
//!
//! ## Key Components
//!
//! - `InventoryBuilder`: enumerates executables, probes them, builds the index
//!   and validates their introspection output
//! - `Prober` / `ProcessProber`: how a single executable is asked to describe itself
//! - `IndexStore`: the index artifact on disk
//! - `ModelIndex`, `ModelDetails`, `ValidationResult`: the data exchanged with consumers
//!
//! ## Naming convention
//!
//! An executable's identifier is its filename without extension. Identifiers
//! starting with `root_` form the first tier, `leaves_` the second. Anything
//! else belongs to neither tier.

mod builder;
mod error;
pub mod parse;
mod probe;
mod scan;
mod store;
mod types;

pub use builder::{InventoryBuilder, InventoryConfig};
pub use error::InventoryError;
pub use probe::{ProcessProber, Prober};
pub use scan::enumerate;
pub use store::IndexStore;
pub use types::{
    Candidate, ModelDetails, ModelIndex, ScanSummary, Tier, ValidationResult,
    LEAVES_PREFIX, NOT_AVAILABLE, ROOT_PREFIX, UNKNOWN_DISPLAY_NAME,
};

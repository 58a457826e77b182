//! # Repository Module
//!
//! Repository contracts for units and hubs, and the in-memory adapter.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryHubRepository, InMemoryUnitRepository};
pub use traits::{HubRepository, UnitRepository};

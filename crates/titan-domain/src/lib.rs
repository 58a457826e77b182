//! # Titan Watch - Domain Model
//!
//! Entities, value objects, domain events and rule services for tracking
//! combat units, their pilots and the hubs that house them. These types are
//! the single source of truth across all layers: persistence, use-cases and
//! API adapters.
//!
//! The core is synchronous and performs no I/O. A use-case loads an entity
//! through a repository, calls business methods on it, persists it, and only
//! then publishes whatever domain events the hub buffered.
//!
//! ```text
//!   IntegrityLevel  Mark  Capacity  Coordinates/Location
//!          \         |        \          /
//!           Unit ── Pilot      Hub ── Commander
//!                               |
//!                          DomainEvent
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod error;
pub mod events;
pub mod hub;
pub mod pilot;
pub mod services;
pub mod unit;
pub mod value_objects;
pub mod views;

pub use error::{DomainError, ErrorKind, Result};
pub use events::{DomainEvent, HubEventKind};
pub use hub::{Commander, CommanderRank, Hub, HubProps, HubSpec, HubStatus};
pub use pilot::{Pilot, PilotProps, PilotRank, PilotSpec, PilotStatus};
pub use services::ValidationResult;
pub use unit::{Unit, UnitProps, UnitSpec, UnitStatus};
pub use value_objects::{Capacity, Coordinates, IntegrityLevel, IntegrityStatus, Location, Mark};
pub use views::{CapacityView, HubView, PilotView, UnitView};

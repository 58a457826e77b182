//! # Titan Service
//!
//! Use-case layer for the Titan Watch domain.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 API adapter / titan-ops                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ServiceContext                            │
//! │      (UnitService, HubService, event broadcast channel)      │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      titan-domain       │   │      titan-persistence       │
//! │  (rules, hub events)    │   │  (repositories, version CAS) │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Flow
//!
//! Each mutation loads the entity, applies one domain method, persists it
//! under the optimistic version check and only then publishes the hub's
//! buffered events. Subscribers get events through
//! [`ServiceContext::subscribe`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod context;
pub mod drill;
pub mod error;
pub mod usecases;

pub use config::{Config, LogFormat};
pub use context::ServiceContext;
pub use drill::{DrillPlan, DrillReport, run_drill};
pub use error::{ServiceError, ServiceResult};
pub use usecases::{CreateHubInput, CreateUnitInput, HubService, UnitService, UpdateUnitInput};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

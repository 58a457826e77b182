//! # Titan Persistence Library
//!
//! Persistence contracts for the Titan Watch domain, plus an in-memory
//! adapter that honours the same concurrency discipline a database-backed
//! one must.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Use-Case Layer                            │
//! │         (load → domain method → persist → publish)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Repository Traits                          │
//! │               (UnitRepository, HubRepository)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  In-Memory Adapter                           │
//! │   JSON documents · unique name index · version CAS writes    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every stored record carries a version. `update` only succeeds when the
//! caller's copy has the version currently stored, so two use-cases racing
//! on the same hub cannot both commit an allocation against the same free
//! slot. The loser gets [`PersistenceError::WriteConflict`] and is expected
//! to reload and retry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use titan_persistence::{HubRepository, InMemoryHubRepository};
//!
//! let hubs = InMemoryHubRepository::new();
//! let mut hub = hubs.create(&Hub::create(spec)?).await?;
//! hub.activate()?;
//! let hub = hubs.update(&hub).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod query;
pub mod repository;

// Re-export commonly used types
pub use error::{PersistenceError, Result};
pub use query::{HubFilters, PaginatedResult, Pagination, UnitFilters};
pub use repository::{HubRepository, InMemoryHubRepository, InMemoryUnitRepository, UnitRepository};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

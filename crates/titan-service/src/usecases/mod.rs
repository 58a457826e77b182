//! # Use-Cases
//!
//! Application services driving the domain: load an entity through its
//! repository, run the business method, persist under the optimistic
//! version check, then publish whatever events the hub buffered.
//!
//! Every mutation runs as a load-modify-save loop. A
//! [`WriteConflict`](titan_persistence::PersistenceError::WriteConflict)
//! means another writer got there first, so the entity is reloaded and the
//! operation replayed against fresh state, up to `write_retry_limit` times.

pub mod hubs;
pub mod units;

pub use hubs::{CreateHubInput, HubService};
pub use units::{CreateUnitInput, UnitService, UpdateUnitInput};

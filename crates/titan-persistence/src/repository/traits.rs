//! # Repository Traits
//!
//! Abstract repository interfaces for units and hubs.
//! Implementations can be swapped for different backends (SQL, document
//! store, in-memory, etc.)
//!
//! Single-entity lookups return `Ok(None)` when nothing matches; turning that
//! into a not-found error is the use-case layer's job.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::query::{HubFilters, PaginatedResult, Pagination, UnitFilters};
use titan_domain::{Hub, Unit, UnitStatus};

// =============================================================================
// UNIT REPOSITORY
// =============================================================================

/// Repository for Unit entity operations
#[async_trait]
pub trait UnitRepository: Send + Sync {
    /// Store a new unit, assigning its id. Fails on a taken name.
    async fn create(&self, unit: &Unit) -> Result<Unit>;

    /// Get unit by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Unit>>;

    /// Get unit by its unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<Unit>>;

    /// Filtered, paginated listing
    async fn find_all(
        &self,
        filters: &UnitFilters,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Unit>>;

    /// Persist changes. Fails with a write conflict if the stored version
    /// moved since `unit` was loaded.
    async fn update(&self, unit: &Unit) -> Result<Unit>;

    /// Delete unit
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check whether a unit name is taken
    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// Count units matching the filters
    async fn count(&self, filters: &UnitFilters) -> Result<u64>;

    /// Get units stationed at a base
    async fn find_by_base_location(&self, base_location: &str) -> Result<Vec<Unit>>;

    /// Get units by status
    async fn find_by_status(&self, status: UnitStatus) -> Result<Vec<Unit>>;

    /// Get units that pass `Unit::can_deploy`
    async fn find_deployable(&self) -> Result<Vec<Unit>>;

    /// Get units that pass `Unit::needs_maintenance`
    async fn find_needing_maintenance(&self) -> Result<Vec<Unit>>;
}

// =============================================================================
// HUB REPOSITORY
// =============================================================================

/// Repository for Hub aggregate operations.
///
/// Domain events are not persisted; a loaded hub has an empty event buffer.
#[async_trait]
pub trait HubRepository: Send + Sync {
    /// Store a new hub, assigning its id. Fails on a taken name.
    async fn create(&self, hub: &Hub) -> Result<Hub>;

    /// Get hub by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hub>>;

    /// Get hub by its unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<Hub>>;

    /// Filtered listing
    async fn find_all(&self, filters: &HubFilters) -> Result<Vec<Hub>>;

    /// Persist changes under the optimistic version check
    async fn update(&self, hub: &Hub) -> Result<Hub>;

    /// Delete hub
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check whether a hub name is taken
    async fn exists_by_name(&self, name: &str) -> Result<bool>;
}

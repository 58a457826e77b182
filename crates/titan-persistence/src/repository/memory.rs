//! In-memory repository implementation.
//!
//! Records are kept as JSON text of the entity's stored form and
//! reconstituted on every read, so each load crosses the same mapping
//! boundary a real database adapter would. Writes go through an optimistic
//! version check and a unique-name index, both evaluated under one write
//! lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{PersistenceError, Result};
use crate::query::{HubFilters, PaginatedResult, Pagination, UnitFilters};
use crate::repository::traits::{HubRepository, UnitRepository};
use titan_domain::{Hub, HubProps, Unit, UnitProps, UnitStatus};

const UNIT: &str = "Unit";
const HUB: &str = "Hub";

// =============================================================================
// DOCUMENT TABLE
// =============================================================================

#[derive(Debug, Clone)]
struct Row {
    name: String,
    version: u64,
    created_at: DateTime<Utc>,
    doc: String,
}

/// Rows keyed by id plus a unique index on name
#[derive(Debug, Default)]
struct Table {
    rows: HashMap<Uuid, Row>,
    names: HashMap<String, Uuid>,
}

impl Table {
    fn insert(&mut self, entity_type: &str, id: Uuid, row: Row) -> Result<()> {
        if self.names.contains_key(&row.name) {
            return Err(PersistenceError::UniqueViolation {
                entity_type: entity_type.to_string(),
                name: row.name,
            });
        }
        if self.rows.contains_key(&id) {
            return Err(PersistenceError::UniqueViolation {
                entity_type: entity_type.to_string(),
                name: id.to_string(),
            });
        }
        self.names.insert(row.name.clone(), id);
        self.rows.insert(id, row);
        Ok(())
    }

    /// Compare-and-swap on the stored version
    fn replace(&mut self, entity_type: &str, id: Uuid, expected: u64, row: Row) -> Result<()> {
        let current = self
            .rows
            .get(&id)
            .ok_or_else(|| PersistenceError::not_found(entity_type, id))?;

        if current.version != expected {
            return Err(PersistenceError::WriteConflict {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                expected,
                actual: current.version,
            });
        }

        if current.name != row.name {
            if self.names.get(&row.name).is_some_and(|owner| *owner != id) {
                return Err(PersistenceError::UniqueViolation {
                    entity_type: entity_type.to_string(),
                    name: row.name,
                });
            }
            let old_name = current.name.clone();
            self.names.remove(&old_name);
            self.names.insert(row.name.clone(), id);
        }

        self.rows.insert(id, row);
        Ok(())
    }

    fn remove(&mut self, entity_type: &str, id: Uuid) -> Result<()> {
        let row = self
            .rows
            .remove(&id)
            .ok_or_else(|| PersistenceError::not_found(entity_type, id))?;
        self.names.remove(&row.name);
        Ok(())
    }

    fn by_name(&self, name: &str) -> Option<&Row> {
        self.names.get(name).and_then(|id| self.rows.get(id))
    }

    /// Rows in insertion-time order, ties broken by id
    fn ordered(&self) -> Vec<(&Uuid, &Row)> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|(a_id, a), (b_id, b)| {
            a.created_at.cmp(&b.created_at).then_with(|| a_id.cmp(b_id))
        });
        rows
    }
}

fn decode_unit(doc: &str) -> Result<Unit> {
    let props: UnitProps = serde_json::from_str(doc)?;
    Ok(Unit::reconstitute(props)?)
}

fn decode_hub(doc: &str) -> Result<Hub> {
    let props: HubProps = serde_json::from_str(doc)?;
    Ok(Hub::reconstitute(props)?)
}

fn never_persisted(entity_type: &str) -> PersistenceError {
    PersistenceError::InvalidQuery(format!("{entity_type} has not been persisted yet"))
}

// =============================================================================
// UNIT REPOSITORY
// =============================================================================

/// In-memory [`UnitRepository`]
#[derive(Debug, Default)]
pub struct InMemoryUnitRepository {
    table: RwLock<Table>,
}

impl InMemoryUnitRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn scan(&self, filters: &UnitFilters) -> Result<Vec<Unit>> {
        let now = Utc::now();
        let table = self.table.read().await;
        let mut units = Vec::new();
        for (_, row) in table.ordered() {
            let unit = decode_unit(&row.doc)?;
            if filters.matches(&unit, now) {
                units.push(unit);
            }
        }
        Ok(units)
    }
}

#[async_trait]
impl UnitRepository for InMemoryUnitRepository {
    async fn create(&self, unit: &Unit) -> Result<Unit> {
        let mut props = unit.to_props();
        let id = props.id.unwrap_or_else(Uuid::now_v7);
        props.id = Some(id);
        props.version = 1;

        let row = Row {
            name: props.name.clone(),
            version: props.version,
            created_at: props.created_at,
            doc: serde_json::to_string(&props)?,
        };
        let stored = decode_unit(&row.doc)?;

        self.table.write().await.insert(UNIT, id, row)?;
        debug!(unit_id = %id, name = %props.name, "Unit stored");
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Unit>> {
        let table = self.table.read().await;
        table.rows.get(&id).map(|row| decode_unit(&row.doc)).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Unit>> {
        let table = self.table.read().await;
        table.by_name(name).map(|row| decode_unit(&row.doc)).transpose()
    }

    async fn find_all(
        &self,
        filters: &UnitFilters,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Unit>> {
        pagination.validate()?;
        let matching = self.scan(filters).await?;
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit as usize)
            .collect();
        Ok(PaginatedResult::new(page, total, pagination))
    }

    async fn update(&self, unit: &Unit) -> Result<Unit> {
        let id = unit.id().ok_or_else(|| never_persisted(UNIT))?;
        let mut props = unit.to_props();
        let expected = props.version;
        props.version = expected + 1;

        let row = Row {
            name: props.name.clone(),
            version: props.version,
            created_at: props.created_at,
            doc: serde_json::to_string(&props)?,
        };
        let stored = decode_unit(&row.doc)?;

        self.table.write().await.replace(UNIT, id, expected, row)?;
        debug!(unit_id = %id, version = props.version, "Unit updated");
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.table.write().await.remove(UNIT, id)?;
        debug!(unit_id = %id, "Unit deleted");
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.table.read().await.names.contains_key(name))
    }

    async fn count(&self, filters: &UnitFilters) -> Result<u64> {
        Ok(self.scan(filters).await?.len() as u64)
    }

    async fn find_by_base_location(&self, base_location: &str) -> Result<Vec<Unit>> {
        self.scan(&UnitFilters {
            base_location: Some(base_location.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn find_by_status(&self, status: UnitStatus) -> Result<Vec<Unit>> {
        self.scan(&UnitFilters {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    async fn find_deployable(&self) -> Result<Vec<Unit>> {
        self.scan(&UnitFilters {
            can_deploy: Some(true),
            ..Default::default()
        })
        .await
    }

    async fn find_needing_maintenance(&self) -> Result<Vec<Unit>> {
        self.scan(&UnitFilters {
            needs_maintenance: Some(true),
            ..Default::default()
        })
        .await
    }
}

// =============================================================================
// HUB REPOSITORY
// =============================================================================

/// In-memory [`HubRepository`]
#[derive(Debug, Default)]
pub struct InMemoryHubRepository {
    table: RwLock<Table>,
}

impl InMemoryHubRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HubRepository for InMemoryHubRepository {
    async fn create(&self, hub: &Hub) -> Result<Hub> {
        let mut props = hub.to_props();
        let id = props.id.unwrap_or_else(Uuid::now_v7);
        props.id = Some(id);
        props.version = 1;

        let row = Row {
            name: props.name.clone(),
            version: props.version,
            created_at: props.created_at,
            doc: serde_json::to_string(&props)?,
        };
        let stored = decode_hub(&row.doc)?;

        self.table.write().await.insert(HUB, id, row)?;
        debug!(hub_id = %id, name = %props.name, "Hub stored");
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hub>> {
        let table = self.table.read().await;
        table.rows.get(&id).map(|row| decode_hub(&row.doc)).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Hub>> {
        let table = self.table.read().await;
        table.by_name(name).map(|row| decode_hub(&row.doc)).transpose()
    }

    async fn find_all(&self, filters: &HubFilters) -> Result<Vec<Hub>> {
        let table = self.table.read().await;
        let mut hubs = Vec::new();
        for (_, row) in table.ordered() {
            let hub = decode_hub(&row.doc)?;
            if filters.matches(&hub) {
                hubs.push(hub);
            }
        }
        Ok(hubs)
    }

    async fn update(&self, hub: &Hub) -> Result<Hub> {
        let id = hub.id().ok_or_else(|| never_persisted(HUB))?;
        let mut props = hub.to_props();
        let expected = props.version;
        props.version = expected + 1;

        let row = Row {
            name: props.name.clone(),
            version: props.version,
            created_at: props.created_at,
            doc: serde_json::to_string(&props)?,
        };
        let stored = decode_hub(&row.doc)?;

        self.table.write().await.replace(HUB, id, expected, row)?;
        debug!(
            hub_id = %id,
            version = props.version,
            allocated = props.allocated_units.len(),
            "Hub updated"
        );
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.table.write().await.remove(HUB, id)?;
        debug!(hub_id = %id, "Hub deleted");
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.table.read().await.names.contains_key(name))
    }
}

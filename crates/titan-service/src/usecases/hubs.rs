//! Hub use-cases: founding, lifecycle and unit allocation.
//!
//! Allocation events leave the service only after the hub write that
//! produced them has committed. The one exception is
//! `CapacityExceeded`, which describes a rejected attempt: nothing is
//! written, so it is published as soon as the rejection happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use titan_domain::services::allocation;
use titan_domain::{
    Commander, Coordinates, DomainError, Hub, HubSpec, Location, UnitStatus, ValidationResult,
};
use titan_persistence::HubFilters;

/// Inputs for founding a hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHubInput {
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_capacity: u32,
    #[serde(default)]
    pub commander: Option<Commander>,
    /// Defaults to now
    #[serde(default)]
    pub established_date: Option<DateTime<Utc>>,
}

/// Hub application service
#[derive(Debug, Clone)]
pub struct HubService {
    ctx: ServiceContext,
}

impl HubService {
    pub const fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Found a hub under construction.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Conflict`] if the name is taken
    /// - validation errors for coordinates, location, capacity or name
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_hub(&self, input: CreateHubInput) -> ServiceResult<Hub> {
        if self.ctx.hubs.exists_by_name(&input.name).await? {
            return Err(DomainError::Conflict(format!(
                "Hub with name {} already exists",
                input.name
            ))
            .into());
        }

        let coordinates = Coordinates::new(input.latitude, input.longitude)?;
        let location = Location::new(input.city, input.country, coordinates)?;
        let hub = Hub::create(HubSpec {
            name: input.name,
            location,
            total_capacity: input.total_capacity,
            commander: input.commander,
            established_date: input.established_date.unwrap_or_else(Utc::now),
        })?;

        let hub = self.ctx.hubs.create(&hub).await?;
        info!(
            hub_id = ?hub.id(),
            location = %hub.location(),
            capacity = hub.capacity().total(),
            "Hub founded"
        );
        Ok(hub)
    }

    #[tracing::instrument(skip(self))]
    pub async fn activate_hub(&self, id: Uuid) -> ServiceResult<Hub> {
        self.modify(id, Hub::activate).await
    }

    /// # Errors
    ///
    /// [`DomainError::Precondition`] while units are still allocated.
    #[tracing::instrument(skip(self))]
    pub async fn decommission_hub(&self, id: Uuid) -> ServiceResult<Hub> {
        self.modify(id, Hub::decommission).await
    }

    #[tracing::instrument(skip(self, commander), fields(commander_name = %commander.name))]
    pub async fn assign_commander(&self, id: Uuid, commander: Commander) -> ServiceResult<Hub> {
        self.modify(id, |hub| {
            hub.assign_commander(commander.clone());
            Ok(())
        })
        .await
    }

    /// Give `unit_id` a slot at the hub.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] for an unknown unit or hub
    /// - [`DomainError::InvalidState`] for a decommissioned unit or an
    ///   inactive hub
    /// - [`DomainError::Conflict`] if the unit is already allocated here
    /// - [`DomainError::Capacity`] when the hub is full; a
    ///   `CapacityExceeded` event is published first
    #[tracing::instrument(skip(self))]
    pub async fn allocate_unit(&self, hub_id: Uuid, unit_id: Uuid) -> ServiceResult<Hub> {
        self.check_unit(unit_id).await?;

        let result = self.modify(hub_id, |hub| hub.allocate_unit(unit_id)).await;

        if let Err(ServiceError::Domain(e)) = &result {
            warn!(hub_id = %hub_id, unit_id = %unit_id, error = %e, "Allocation rejected");
        }
        result
    }

    /// # Errors
    ///
    /// [`DomainError::NotFound`] if the unit holds no slot at the hub.
    #[tracing::instrument(skip(self))]
    pub async fn deallocate_unit(&self, hub_id: Uuid, unit_id: Uuid) -> ServiceResult<Hub> {
        self.modify(hub_id, |hub| hub.deallocate_unit(unit_id)).await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id.
    pub async fn get_hub(&self, id: Uuid) -> ServiceResult<Hub> {
        self.load(id).await
    }

    pub async fn list_hubs(&self, filters: HubFilters) -> ServiceResult<Vec<Hub>> {
        Ok(self.ctx.hubs.find_all(&filters).await?)
    }

    /// Would [`Self::allocate_unit`] accept this unit right now? Writes
    /// nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown unit or hub; every
    /// rule failure is reported in the returned verdict instead.
    pub async fn preflight_allocation(
        &self,
        hub_id: Uuid,
        unit_id: Uuid,
    ) -> ServiceResult<ValidationResult> {
        if let Err(err) = self.check_unit(unit_id).await {
            return match err {
                ServiceError::Domain(e) => Ok(ValidationResult::invalid(e.reason())),
                other => Err(other),
            };
        }
        let hub = self.load(hub_id).await?;
        Ok(allocation::can_allocate(&hub, unit_id))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn load(&self, id: Uuid) -> ServiceResult<Hub> {
        self.ctx
            .hubs
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Hub", id))
    }

    /// The unit must exist and still be in service
    async fn check_unit(&self, unit_id: Uuid) -> ServiceResult<()> {
        let unit = self
            .ctx
            .units
            .find_by_id(unit_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Unit", unit_id))?;

        if unit.status() == UnitStatus::Decommissioned {
            return Err(DomainError::invalid_state(format!(
                "Unit {unit_id} is decommissioned"
            ))
            .into());
        }
        Ok(())
    }

    /// Load, apply `op`, save, publish; replay from a fresh load on a write
    /// conflict. Events of a discarded attempt are dropped with it.
    async fn modify<F>(&self, id: Uuid, op: F) -> ServiceResult<Hub>
    where
        F: Fn(&mut Hub) -> titan_domain::Result<()> + Send + Sync,
    {
        let limit = self.ctx.config.write_retry_limit;
        let mut attempt = 0;
        loop {
            let mut hub = self.load(id).await?;
            if let Err(e) = op(&mut hub) {
                self.ctx.publish(hub.take_domain_events());
                return Err(e.into());
            }
            let events = hub.take_domain_events();

            match self.ctx.hubs.update(&hub).await {
                Ok(saved) => {
                    info!(
                        hub_id = %id,
                        status = saved.status().as_str(),
                        allocated = saved.capacity().current(),
                        events = events.len(),
                        "Hub updated"
                    );
                    self.ctx.publish(events);
                    return Ok(saved);
                }
                Err(e) if e.is_retryable() && attempt < limit => {
                    attempt += 1;
                    warn!(hub_id = %id, attempt, error = %e, "Write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::usecases::CreateUnitInput;
    use titan_domain::{CommanderRank, ErrorKind, HubEventKind, HubStatus};

    fn hub_input(name: &str, capacity: u32) -> CreateHubInput {
        CreateHubInput {
            name: name.to_string(),
            city: "Hong Kong".to_string(),
            country: "China".to_string(),
            latitude: 22.3,
            longitude: 114.2,
            total_capacity: capacity,
            commander: None,
            established_date: None,
        }
    }

    fn unit_input(name: &str) -> CreateUnitInput {
        CreateUnitInput {
            name: name.to_string(),
            mark: 3,
            height: 76.0,
            weight: 1_980.0,
            power_core: "Nuclear Vortex Turbine".to_string(),
            weapons: vec![],
            base_location: "Hong Kong".to_string(),
        }
    }

    async fn active_hub(ctx: &ServiceContext, capacity: u32) -> Uuid {
        let hubs = ctx.hub_service();
        let id = hubs
            .create_hub(hub_input("Harbour Base", capacity))
            .await
            .unwrap()
            .id()
            .unwrap();
        hubs.activate_hub(id).await.unwrap();
        id
    }

    async fn unit(ctx: &ServiceContext, name: &str) -> Uuid {
        ctx.unit_service()
            .create_unit(unit_input(name))
            .await
            .unwrap()
            .id()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_hub_starts_under_construction() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub = hubs.create_hub(hub_input("Lima Base", 4)).await.unwrap();

        assert_eq!(hub.status(), HubStatus::UnderConstruction);
        assert_eq!(hub.capacity().available(), 4);
        assert!(!hub.can_allocate_unit());

        let err = hubs.create_hub(hub_input("Lima Base", 2)).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::Conflict));

        let mut bad = hub_input("Nowhere", 2);
        bad.latitude = 120.0;
        assert!(hubs.create_hub(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_allocate_publishes_after_persist() {
        let ctx = ServiceContext::in_memory(Config::default());
        let mut rx = ctx.subscribe();
        let hub_id = active_hub(&ctx, 2).await;
        let unit_id = unit(&ctx, "Gipsy Danger").await;

        let hub = ctx.hub_service().allocate_unit(hub_id, unit_id).await.unwrap();
        assert!(hub.is_allocated(unit_id));
        assert!(hub.domain_events().is_empty());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, HubEventKind::UnitAllocated { unit_id });
        assert_eq!(event.hub_id, Some(hub_id));

        let stored = ctx.hub_service().get_hub(hub_id).await.unwrap();
        assert_eq!(stored.capacity().current(), 1);
    }

    #[tokio::test]
    async fn test_full_hub_rejects_and_publishes_capacity_exceeded() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = active_hub(&ctx, 1).await;
        let first = unit(&ctx, "Striker Eureka").await;
        let second = unit(&ctx, "Crimson Typhoon").await;

        hubs.allocate_unit(hub_id, first).await.unwrap();
        let mut rx = ctx.subscribe();

        let err = hubs.allocate_unit(hub_id, second).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::Capacity));
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.kind,
            HubEventKind::CapacityExceeded {
                attempted_unit_id: second
            }
        );

        let stored = hubs.get_hub(hub_id).await.unwrap();
        assert_eq!(stored.allocated_units(), &[first]);
    }

    #[tokio::test]
    async fn test_allocation_guards() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = active_hub(&ctx, 3).await;
        let unit_id = unit(&ctx, "Cherno Alpha").await;

        let err = hubs.allocate_unit(hub_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        let err = hubs.allocate_unit(Uuid::new_v4(), unit_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        hubs.allocate_unit(hub_id, unit_id).await.unwrap();
        let err = hubs.allocate_unit(hub_id, unit_id).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::Conflict));

        let retired = unit(&ctx, "Brawler Yukon").await;
        ctx.unit_service().decommission_unit(retired).await.unwrap();
        let err = hubs.allocate_unit(hub_id, retired).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::InvalidState));
    }

    #[tokio::test]
    async fn test_inactive_hub_rejects_allocation() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = hubs.create_hub(hub_input("Anchorage", 2)).await.unwrap().id().unwrap();
        let unit_id = unit(&ctx, "Echo Saber").await;

        let err = hubs.allocate_unit(hub_id, unit_id).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::InvalidState));

        let verdict = hubs.preflight_allocation(hub_id, unit_id).await.unwrap();
        assert!(!verdict.valid);
        assert_eq!(verdict.reason.as_deref(), Some("Hub is not active"));
    }

    #[tokio::test]
    async fn test_deallocate_and_decommission() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = active_hub(&ctx, 2).await;
        let unit_id = unit(&ctx, "Eden Assault").await;
        hubs.allocate_unit(hub_id, unit_id).await.unwrap();

        let err = hubs.decommission_hub(hub_id).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::Precondition));

        let mut rx = ctx.subscribe();
        let hub = hubs.deallocate_unit(hub_id, unit_id).await.unwrap();
        assert_eq!(hub.capacity().current(), 0);
        assert_eq!(
            rx.recv().await.unwrap().kind,
            HubEventKind::UnitDeallocated { unit_id }
        );

        let err = hubs.deallocate_unit(hub_id, unit_id).await.unwrap_err();
        assert_eq!(err.domain_kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.status_code(), 404);

        let hub = hubs.decommission_hub(hub_id).await.unwrap();
        assert_eq!(hub.status(), HubStatus::Decommissioned);
    }

    #[tokio::test]
    async fn test_preflight_writes_nothing() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = active_hub(&ctx, 1).await;
        let unit_id = unit(&ctx, "Saber Athena").await;
        let before = hubs.get_hub(hub_id).await.unwrap().version();

        let verdict = hubs.preflight_allocation(hub_id, unit_id).await.unwrap();
        assert!(verdict.valid);
        assert_eq!(hubs.get_hub(hub_id).await.unwrap().version(), before);

        ctx.unit_service().decommission_unit(unit_id).await.unwrap();
        let verdict = hubs.preflight_allocation(hub_id, unit_id).await.unwrap();
        assert!(!verdict.valid);
    }

    #[tokio::test]
    async fn test_assign_commander_and_list() {
        let ctx = ServiceContext::in_memory(Config::default());
        let hubs = ctx.hub_service();
        let hub_id = active_hub(&ctx, 2).await;
        hubs.create_hub(hub_input("Panama Base", 1)).await.unwrap();

        let commander =
            Commander::new(Uuid::new_v4(), "Herc Hansen", CommanderRank::Marshal, 22).unwrap();
        let hub = hubs.assign_commander(hub_id, commander.clone()).await.unwrap();
        assert_eq!(hub.commander(), Some(&commander));

        let active = hubs
            .list_hubs(HubFilters {
                status: Some(HubStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(hubs.list_hubs(HubFilters::default()).await.unwrap().len(), 2);
    }
}

//! Unit use-cases.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use titan_domain::services::validation;
use titan_domain::{DomainError, ErrorKind, IntegrityLevel, Mark, Pilot, Unit, UnitSpec};
use titan_persistence::{PaginatedResult, Pagination, UnitFilters};

/// Inputs for commissioning a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUnitInput {
    pub name: String,
    pub mark: u8,
    pub height: f64,
    pub weight: f64,
    pub power_core: String,
    #[serde(default)]
    pub weapons: Vec<String>,
    pub base_location: String,
}

/// Partial update of a unit's specification. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUnitInput {
    pub id: Uuid,
    pub power_core: Option<String>,
    pub weapons: Option<Vec<String>>,
    pub base_location: Option<String>,
}

/// Unit application service
#[derive(Debug, Clone)]
pub struct UnitService {
    ctx: ServiceContext,
}

impl UnitService {
    pub const fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// - validation errors for a bad name, out-of-range specs or mark
    /// - [`DomainError::Conflict`] if the name is taken
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_unit(&self, input: CreateUnitInput) -> ServiceResult<Unit> {
        validation::validate_unit_name(&input.name).into_result(ErrorKind::Validation)?;

        if self.ctx.units.exists_by_name(&input.name).await? {
            return Err(DomainError::Conflict(format!(
                "Unit with name {} already exists",
                input.name
            ))
            .into());
        }

        validation::validate_unit_specs(input.height, input.weight)
            .into_result(ErrorKind::Validation)?;

        let unit = Unit::create(UnitSpec {
            name: input.name,
            mark: Mark::new(input.mark)?,
            height: input.height,
            weight: input.weight,
            power_core: input.power_core,
            weapons: input.weapons,
            base_location: input.base_location,
        })?;

        let unit = self.ctx.units.create(&unit).await?;
        info!(unit_id = ?unit.id(), mark = %unit.mark(), "Unit commissioned");
        Ok(unit)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_unit(&self, id: Uuid) -> ServiceResult<()> {
        self.load(id).await?;
        self.ctx.units.delete(id).await?;
        info!(unit_id = %id, "Unit deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id, or a validation
    /// error for a blank replacement value.
    #[tracing::instrument(skip(self, input), fields(unit_id = %input.id))]
    pub async fn update_unit(&self, input: UpdateUnitInput) -> ServiceResult<Unit> {
        self.modify(input.id, |unit| {
            unit.update_details(
                input.power_core.clone(),
                input.weapons.clone(),
                input.base_location.clone(),
            )
        })
        .await
    }

    /// Set integrity to `value` (0-100), downgrading status as needed.
    ///
    /// # Errors
    ///
    /// Validation error for an out-of-range value.
    #[tracing::instrument(skip(self))]
    pub async fn update_integrity(&self, id: Uuid, value: f64) -> ServiceResult<Unit> {
        let level = IntegrityLevel::new(value)?;
        let unit = self
            .modify(id, |unit| {
                unit.update_integrity(level);
                Ok(())
            })
            .await?;
        if level.is_critical() {
            warn!(unit_id = %id, integrity = %level, "Unit integrity critical");
        }
        Ok(unit)
    }

    /// Replace the crew. An empty list stands the crew down.
    ///
    /// # Errors
    ///
    /// Validation error with the crew rule's reason when the pilots cannot
    /// serve together, or an invalid-state error if one is not active.
    #[tracing::instrument(skip(self, pilots), fields(crew = pilots.len()))]
    pub async fn assign_pilots(&self, id: Uuid, pilots: Vec<Pilot>) -> ServiceResult<Unit> {
        validation::validate_pilot_crew(&pilots).into_result(ErrorKind::Validation)?;

        self.modify(id, |unit| {
            let crew = pilots
                .iter()
                .cloned()
                .map(|mut pilot| -> titan_domain::Result<Pilot> {
                    pilot.assign_to_unit(id)?;
                    Ok(pilot)
                })
                .collect::<titan_domain::Result<Vec<_>>>()?;
            unit.assign_pilots(crew)
        })
        .await
    }

    /// Send the unit out, bumping its deployment counter.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidState`] listing every reason the unit cannot
    /// deploy.
    #[tracing::instrument(skip(self))]
    pub async fn deploy_unit(&self, id: Uuid) -> ServiceResult<Unit> {
        self.modify(id, |unit| {
            validation::can_deploy(unit).into_result(ErrorKind::InvalidState)?;
            unit.record_deployment();
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn record_kill(&self, id: Uuid) -> ServiceResult<Unit> {
        self.modify(id, |unit| {
            unit.record_kill();
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn start_maintenance(&self, id: Uuid) -> ServiceResult<Unit> {
        self.modify(id, Unit::start_maintenance).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn complete_maintenance(&self, id: Uuid, integrity: f64) -> ServiceResult<Unit> {
        let level = IntegrityLevel::new(integrity)?;
        self.modify(id, |unit| unit.complete_maintenance(level)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn decommission_unit(&self, id: Uuid) -> ServiceResult<Unit> {
        self.modify(id, |unit| {
            unit.decommission();
            Ok(())
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown id.
    pub async fn get_unit(&self, id: Uuid) -> ServiceResult<Unit> {
        self.load(id).await
    }

    /// Filtered listing. Without pagination the configured default page size
    /// applies; any limit is capped at the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an invalid-query error for page or limit zero.
    pub async fn list_units(
        &self,
        filters: UnitFilters,
        pagination: Option<Pagination>,
    ) -> ServiceResult<PaginatedResult<Unit>> {
        let config = &self.ctx.config;
        let mut pagination =
            pagination.unwrap_or_else(|| Pagination::new(1, config.default_page_size));
        pagination.limit = pagination.limit.min(config.max_page_size);
        Ok(self.ctx.units.find_all(&filters, pagination).await?)
    }

    pub async fn find_deployable(&self) -> ServiceResult<Vec<Unit>> {
        Ok(self.ctx.units.find_deployable().await?)
    }

    pub async fn find_needing_maintenance(&self) -> ServiceResult<Vec<Unit>> {
        Ok(self.ctx.units.find_needing_maintenance().await?)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn load(&self, id: Uuid) -> ServiceResult<Unit> {
        self.ctx
            .units
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Unit", id))
    }

    /// Load, apply `op`, save; replay from a fresh load on a write conflict
    async fn modify<F>(&self, id: Uuid, op: F) -> ServiceResult<Unit>
    where
        F: Fn(&mut Unit) -> titan_domain::Result<()> + Send + Sync,
    {
        let limit = self.ctx.config.write_retry_limit;
        let mut attempt = 0;
        loop {
            let mut unit = self.load(id).await?;
            op(&mut unit)?;

            match self.ctx.units.update(&unit).await {
                Ok(saved) => {
                    info!(unit_id = %id, status = saved.status().as_str(), "Unit updated");
                    return Ok(saved);
                }
                Err(e) if e.is_retryable() && attempt < limit => {
                    attempt += 1;
                    warn!(unit_id = %id, attempt, error = %e, "Write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

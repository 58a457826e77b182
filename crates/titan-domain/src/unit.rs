//! Unit entity: a combat machine with integrity, crew and service record.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, Result};
use crate::pilot::{Pilot, PilotProps};
use crate::value_objects::{IntegrityLevel, Mark};

/// Maximum crew size of a unit
pub const MAX_PILOTS: usize = 2;
/// Days a unit may go without maintenance before it is flagged
pub const MAINTENANCE_INTERVAL_DAYS: i64 = 30;
/// Every this many deployments a unit is due for a service
pub const DEPLOYMENTS_PER_SERVICE: i32 = 5;

const CRITICAL_INTEGRITY: f64 = 30.0;
const DEPLOYABLE_INTEGRITY: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Active,
    Maintenance,
    Damaged,
    Decommissioned,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Damaged => "damaged",
            Self::Decommissioned => "decommissioned",
        }
    }
}

/// Inputs for commissioning a new unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub mark: Mark,
    pub height: f64,
    pub weight: f64,
    pub power_core: String,
    pub weapons: Vec<String>,
    pub base_location: String,
}

/// Stored form of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProps {
    pub id: Option<Uuid>,
    pub name: String,
    pub mark: Mark,
    pub status: UnitStatus,
    pub integrity_level: IntegrityLevel,
    pub height: f64,
    pub weight: f64,
    pub power_core: String,
    pub weapons: Vec<String>,
    pub base_location: String,
    pub pilots: Vec<PilotProps>,
    pub deployment_count: i32,
    pub kill_count: i32,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unit entity - a combat machine and its assigned crew
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: Option<Uuid>,
    name: String,
    mark: Mark,
    status: UnitStatus,
    integrity_level: IntegrityLevel,
    height: f64,
    weight: f64,
    power_core: String,
    weapons: Vec<String>,
    base_location: String,
    pilots: Vec<Pilot>,
    deployment_count: i32,
    kill_count: i32,
    last_maintenance: Option<DateTime<Utc>>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Unit {
    /// Commission a new unit at full integrity, active, with no service record.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for the first violated field rule.
    pub fn create(spec: UnitSpec) -> Result<Self> {
        let now = Utc::now();
        Self::reconstitute(UnitProps {
            id: None,
            name: spec.name,
            mark: spec.mark,
            status: UnitStatus::Active,
            integrity_level: IntegrityLevel::full(),
            height: spec.height,
            weight: spec.weight,
            power_core: spec.power_core,
            weapons: spec.weapons,
            base_location: spec.base_location,
            pilots: Vec::new(),
            deployment_count: 0,
            kill_count: 0,
            last_maintenance: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a unit from its stored form, re-running every field rule.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for the first violated field rule,
    /// including any rule of an embedded pilot.
    pub fn reconstitute(props: UnitProps) -> Result<Self> {
        validate(&props)?;
        let pilots = props
            .pilots
            .into_iter()
            .map(Pilot::reconstitute)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: props.id,
            name: props.name,
            mark: props.mark,
            status: props.status,
            integrity_level: props.integrity_level,
            height: props.height,
            weight: props.weight,
            power_core: props.power_core,
            weapons: props.weapons,
            base_location: props.base_location,
            pilots,
            deployment_count: props.deployment_count,
            kill_count: props.kill_count,
            last_maintenance: props.last_maintenance,
            version: props.version,
            created_at: props.created_at,
            updated_at: props.updated_at,
        })
    }

    #[must_use]
    pub fn to_props(&self) -> UnitProps {
        UnitProps {
            id: self.id,
            name: self.name.clone(),
            mark: self.mark,
            status: self.status,
            integrity_level: self.integrity_level,
            height: self.height,
            weight: self.weight,
            power_core: self.power_core.clone(),
            weapons: self.weapons.clone(),
            base_location: self.base_location.clone(),
            pilots: self.pilots.iter().map(Pilot::to_props).collect(),
            deployment_count: self.deployment_count,
            kill_count: self.kill_count,
            last_maintenance: self.last_maintenance,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    pub fn integrity_level(&self) -> IntegrityLevel {
        self.integrity_level
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn power_core(&self) -> &str {
        &self.power_core
    }

    pub fn weapons(&self) -> &[String] {
        &self.weapons
    }

    pub fn base_location(&self) -> &str {
        &self.base_location
    }

    pub fn pilots(&self) -> &[Pilot] {
        &self.pilots
    }

    pub fn deployment_count(&self) -> i32 {
        self.deployment_count
    }

    pub fn kill_count(&self) -> i32 {
        self.kill_count
    }

    pub fn last_maintenance(&self) -> Option<DateTime<Utc>> {
        self.last_maintenance
    }

    /// Persistence version, managed by the repository adapter
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // -------------------------------------------------------------------------
    // Business methods
    // -------------------------------------------------------------------------

    /// Replace integrity and downgrade status to match.
    ///
    /// Below 30 the unit is forced to damaged. Below 70 an active unit drops
    /// to maintenance; other statuses are left alone.
    pub fn update_integrity(&mut self, level: IntegrityLevel) {
        self.integrity_level = level;
        if level.value() < CRITICAL_INTEGRITY {
            self.status = UnitStatus::Damaged;
        } else if level.value() < DEPLOYABLE_INTEGRITY && self.status == UnitStatus::Active {
            self.status = UnitStatus::Maintenance;
        }
        self.touch();
    }

    /// Replace the crew. Compatibility is checked by the validation service,
    /// not here.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Capacity`] for more than two pilots.
    pub fn assign_pilots(&mut self, pilots: Vec<Pilot>) -> Result<()> {
        if pilots.len() > MAX_PILOTS {
            return Err(DomainError::Capacity(format!(
                "A unit can have maximum {MAX_PILOTS} pilots"
            )));
        }
        self.pilots = pilots;
        self.touch();
        Ok(())
    }

    pub fn record_deployment(&mut self) {
        self.deployment_count = self.deployment_count.saturating_add(1);
        self.touch();
    }

    pub fn record_kill(&mut self) {
        self.kill_count = self.kill_count.saturating_add(1);
        self.touch();
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] for a decommissioned unit.
    pub fn start_maintenance(&mut self) -> Result<()> {
        if self.status == UnitStatus::Decommissioned {
            return Err(DomainError::invalid_state(
                "Cannot maintain a decommissioned unit",
            ));
        }
        let now = Utc::now();
        self.status = UnitStatus::Maintenance;
        self.last_maintenance = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the unit is in maintenance.
    pub fn complete_maintenance(&mut self, level: IntegrityLevel) -> Result<()> {
        if self.status != UnitStatus::Maintenance {
            return Err(DomainError::invalid_state("Unit is not in maintenance"));
        }
        self.integrity_level = level;
        self.status = UnitStatus::Active;
        self.touch();
        Ok(())
    }

    /// Retire the unit from any status and release its crew
    pub fn decommission(&mut self) {
        self.status = UnitStatus::Decommissioned;
        self.pilots.clear();
        self.touch();
    }

    /// Replace the mutable specification fields that were supplied.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if a supplied power core or base
    /// location is blank; nothing is changed in that case.
    pub fn update_details(
        &mut self,
        power_core: Option<String>,
        weapons: Option<Vec<String>>,
        base_location: Option<String>,
    ) -> Result<()> {
        if power_core.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(DomainError::validation("Unit power core is required"));
        }
        if base_location.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(DomainError::validation("Unit base location is required"));
        }
        if let Some(power_core) = power_core {
            self.power_core = power_core;
        }
        if let Some(weapons) = weapons {
            self.weapons = weapons;
        }
        if let Some(base_location) = base_location {
            self.base_location = base_location;
        }
        self.touch();
        Ok(())
    }

    #[must_use]
    pub fn can_deploy(&self) -> bool {
        self.status == UnitStatus::Active
            && self.integrity_level.value() >= DEPLOYABLE_INTEGRITY
            && !self.pilots.is_empty()
    }

    #[must_use]
    pub fn needs_maintenance(&self) -> bool {
        self.needs_maintenance_at(Utc::now())
    }

    /// [`Self::needs_maintenance`] evaluated against a fixed clock
    #[must_use]
    pub fn needs_maintenance_at(&self, now: DateTime<Utc>) -> bool {
        let never_serviced_but_deployed =
            self.last_maintenance.is_none() && self.deployment_count > 0;
        let overdue = self.last_maintenance.is_some_and(|last| {
            now - last > TimeDelta::days(MAINTENANCE_INTERVAL_DAYS)
        });
        let service_due = self.deployment_count > 0
            && self.deployment_count % DEPLOYMENTS_PER_SERVICE == 0;

        never_serviced_but_deployed
            || overdue
            || self.integrity_level.value() < DEPLOYABLE_INTEGRITY
            || service_due
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate(props: &UnitProps) -> Result<()> {
    if props.name.trim().is_empty() {
        return Err(DomainError::validation("Unit name is required"));
    }
    if props.height.is_nan() || props.height <= 0.0 {
        return Err(DomainError::validation(
            "Unit height must be greater than 0",
        ));
    }
    if props.weight.is_nan() || props.weight <= 0.0 {
        return Err(DomainError::validation(
            "Unit weight must be greater than 0",
        ));
    }
    if props.power_core.trim().is_empty() {
        return Err(DomainError::validation("Unit power core is required"));
    }
    if props.base_location.trim().is_empty() {
        return Err(DomainError::validation("Unit base location is required"));
    }
    if props.deployment_count < 0 {
        return Err(DomainError::validation(
            "Deployment count cannot be negative",
        ));
    }
    if props.kill_count < 0 {
        return Err(DomainError::validation("Kill count cannot be negative"));
    }
    if props.pilots.len() > MAX_PILOTS {
        return Err(DomainError::Validation(format!(
            "A unit can have maximum {MAX_PILOTS} pilots"
        )));
    }
    Ok(())
}

//! Pilot entity: rank, status and drift compatibility of a crew member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Combat hours a cadet needs before promotion to ranger
pub const RANGER_HOURS: f64 = 100.0;
/// Combat hours a ranger needs before promotion to marshal
pub const MARSHAL_HOURS: f64 = 500.0;

const MIN_PILOTING_COMPATIBILITY: f64 = 50.0;
const MIN_PAIR_COMPATIBILITY: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PilotRank {
    Cadet,
    Ranger,
    Marshal,
}

impl PilotRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cadet => "cadet",
            Self::Ranger => "ranger",
            Self::Marshal => "marshal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PilotStatus {
    Active,
    Injured,
    Retired,
    Kia, // Killed in Action
}

impl PilotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Injured => "injured",
            Self::Retired => "retired",
            Self::Kia => "kia",
        }
    }
}

/// Inputs for enlisting a new pilot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotSpec {
    pub name: String,
    pub rank: PilotRank,
    pub drift_compatibility: f64,
    pub nationality: String,
}

/// Stored form of a pilot, used to load it back from persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotProps {
    pub id: Option<Uuid>,
    pub name: String,
    pub rank: PilotRank,
    pub status: PilotStatus,
    pub drift_compatibility: f64,
    pub combat_hours: f64,
    pub kill_count: i32,
    pub nationality: String,
    pub unit_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A crew member able to operate a unit alongside a drift-compatible partner
#[derive(Debug, Clone, PartialEq)]
pub struct Pilot {
    props: PilotProps,
}

impl Pilot {
    /// Enlist a new active pilot with no combat record.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for the first violated field rule.
    pub fn create(spec: PilotSpec) -> Result<Self> {
        let now = Utc::now();
        Self::reconstitute(PilotProps {
            id: None,
            name: spec.name,
            rank: spec.rank,
            status: PilotStatus::Active,
            drift_compatibility: spec.drift_compatibility,
            combat_hours: 0.0,
            kill_count: 0,
            nationality: spec.nationality,
            unit_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a pilot from its stored form, re-running every field rule.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for the first violated field rule.
    pub fn reconstitute(props: PilotProps) -> Result<Self> {
        validate(&props)?;
        Ok(Self { props })
    }

    #[must_use]
    pub fn to_props(&self) -> PilotProps {
        self.props.clone()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Option<Uuid> {
        self.props.id
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn rank(&self) -> PilotRank {
        self.props.rank
    }

    pub fn status(&self) -> PilotStatus {
        self.props.status
    }

    pub fn drift_compatibility(&self) -> f64 {
        self.props.drift_compatibility
    }

    pub fn combat_hours(&self) -> f64 {
        self.props.combat_hours
    }

    pub fn kill_count(&self) -> i32 {
        self.props.kill_count
    }

    pub fn nationality(&self) -> &str {
        &self.props.nationality
    }

    pub fn unit_id(&self) -> Option<Uuid> {
        self.props.unit_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.props.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.props.updated_at
    }

    // -------------------------------------------------------------------------
    // Business methods
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the pilot is active.
    pub fn assign_to_unit(&mut self, unit_id: Uuid) -> Result<()> {
        if self.props.status != PilotStatus::Active {
            return Err(DomainError::invalid_state(
                "Only active pilots can be assigned to units",
            ));
        }
        self.props.unit_id = Some(unit_id);
        self.touch();
        Ok(())
    }

    pub fn unassign_from_unit(&mut self) {
        self.props.unit_id = None;
        self.touch();
    }

    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for negative or non-finite hours.
    pub fn record_combat_hours(&mut self, hours: f64) -> Result<()> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(DomainError::validation("Combat hours must be positive"));
        }
        self.props.combat_hours += hours;
        self.touch();
        Ok(())
    }

    pub fn record_kill(&mut self) {
        self.props.kill_count = self.props.kill_count.saturating_add(1);
        self.touch();
    }

    /// Cadet to ranger at 100 hours, ranger to marshal at 500.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Precondition`] when the hour requirement is not
    /// met, and always for marshals.
    pub fn promote(&mut self) -> Result<()> {
        let next = match self.props.rank {
            PilotRank::Cadet if self.props.combat_hours >= RANGER_HOURS => PilotRank::Ranger,
            PilotRank::Ranger if self.props.combat_hours >= MARSHAL_HOURS => PilotRank::Marshal,
            _ => {
                return Err(DomainError::Precondition(format!(
                    "Pilot does not meet promotion requirements (rank: {}, combat hours: {})",
                    self.props.rank.as_str(),
                    self.props.combat_hours
                )));
            }
        };
        self.props.rank = next;
        self.touch();
        Ok(())
    }

    pub fn injure(&mut self) {
        self.stand_down(PilotStatus::Injured);
    }

    pub fn retire(&mut self) {
        self.stand_down(PilotStatus::Retired);
    }

    pub fn mark_kia(&mut self) {
        self.stand_down(PilotStatus::Kia);
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the pilot is injured.
    pub fn recover(&mut self) -> Result<()> {
        if self.props.status != PilotStatus::Injured {
            return Err(DomainError::invalid_state("Only injured pilots can recover"));
        }
        self.props.status = PilotStatus::Active;
        self.touch();
        Ok(())
    }

    /// Two pilots can drift together when their average score is at least 70
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        (self.props.drift_compatibility + other.props.drift_compatibility) / 2.0
            >= MIN_PAIR_COMPATIBILITY
    }

    #[must_use]
    pub fn can_pilot(&self) -> bool {
        self.props.status == PilotStatus::Active
            && self.props.drift_compatibility >= MIN_PILOTING_COMPATIBILITY
    }

    fn stand_down(&mut self, status: PilotStatus) {
        self.props.status = status;
        self.props.unit_id = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.props.updated_at = Utc::now();
    }
}

fn validate(props: &PilotProps) -> Result<()> {
    if props.name.trim().is_empty() {
        return Err(DomainError::validation("Pilot name is required"));
    }
    if !(0.0..=100.0).contains(&props.drift_compatibility) {
        return Err(DomainError::validation(
            "Drift compatibility must be between 0 and 100",
        ));
    }
    if !props.combat_hours.is_finite() || props.combat_hours < 0.0 {
        return Err(DomainError::validation("Combat hours cannot be negative"));
    }
    if props.kill_count < 0 {
        return Err(DomainError::validation("Kill count cannot be negative"));
    }
    if props.nationality.trim().is_empty() {
        return Err(DomainError::validation("Pilot nationality is required"));
    }
    Ok(())
}

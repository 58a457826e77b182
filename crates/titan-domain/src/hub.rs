//! Hub aggregate root: a base with finite slots for units.
//!
//! The hub owns its [`Capacity`] and the ordered set of allocated unit ids.
//! Units are referenced by id only, so a hub and its units are persisted
//! independently. Allocation is only correct when the caller holds exclusive
//! access to this hub for the whole load-modify-save cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, Result};
use crate::events::{DomainEvent, HubEventKind};
use crate::value_objects::{Capacity, Location};

// =============================================================================
// COMMANDER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommanderRank {
    Marshal,
    General,
}

/// Officer in command of a hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commander {
    pub id: Uuid,
    pub name: String,
    pub rank: CommanderRank,
    pub years_of_service: u32,
}

impl Commander {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a blank name.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        rank: CommanderRank,
        years_of_service: u32,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Commander name is required"));
        }
        Ok(Self {
            id,
            name,
            rank,
            years_of_service,
        })
    }
}

// =============================================================================
// HUB
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    Active,
    UnderConstruction,
    Damaged,
    Decommissioned,
}

impl HubStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::UnderConstruction => "under_construction",
            Self::Damaged => "damaged",
            Self::Decommissioned => "decommissioned",
        }
    }
}

/// Inputs for founding a new hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubSpec {
    pub name: String,
    pub location: Location,
    pub total_capacity: u32,
    pub commander: Option<Commander>,
    pub established_date: DateTime<Utc>,
}

/// Stored form of a hub. Domain events are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubProps {
    pub id: Option<Uuid>,
    pub name: String,
    pub location: Location,
    pub capacity: Capacity,
    pub status: HubStatus,
    pub commander: Option<Commander>,
    pub allocated_units: Vec<Uuid>,
    pub established_date: DateTime<Utc>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hub aggregate root
#[derive(Debug, Clone)]
pub struct Hub {
    props: HubProps,
    events: Vec<DomainEvent>,
}

impl Hub {
    /// Found a hub under construction with every slot free.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a blank name or zero capacity.
    pub fn create(spec: HubSpec) -> Result<Self> {
        let now = Utc::now();
        Self::reconstitute(HubProps {
            id: None,
            name: spec.name,
            location: spec.location,
            capacity: Capacity::empty(spec.total_capacity)?,
            status: HubStatus::UnderConstruction,
            commander: spec.commander,
            allocated_units: Vec::new(),
            established_date: spec.established_date,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a hub from its stored form with an empty event buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a blank name, a duplicated
    /// allocated id, more allocations than slots, or a slot count that
    /// disagrees with the allocated list.
    pub fn reconstitute(props: HubProps) -> Result<Self> {
        validate(&props)?;
        Ok(Self {
            props,
            events: Vec::new(),
        })
    }

    #[must_use]
    pub fn to_props(&self) -> HubProps {
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

    pub fn location(&self) -> &Location {
        &self.props.location
    }

    pub fn capacity(&self) -> Capacity {
        self.props.capacity
    }

    pub fn status(&self) -> HubStatus {
        self.props.status
    }

    pub fn commander(&self) -> Option<&Commander> {
        self.props.commander.as_ref()
    }

    pub fn allocated_units(&self) -> &[Uuid] {
        &self.props.allocated_units
    }

    pub fn is_allocated(&self, unit_id: Uuid) -> bool {
        self.props.allocated_units.contains(&unit_id)
    }

    pub fn established_date(&self) -> DateTime<Utc> {
        self.props.established_date
    }

    /// Persistence version, managed by the repository adapter
    pub fn version(&self) -> u64 {
        self.props.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.props.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.props.updated_at
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Take a slot for `unit_id`.
    ///
    /// A full hub records a [`HubEventKind::CapacityExceeded`] event before
    /// failing, so the rejection is observable downstream.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidState`] if the hub is not active
    /// - [`DomainError::Conflict`] if the unit already holds a slot here
    /// - [`DomainError::Capacity`] if no slot is free
    pub fn allocate_unit(&mut self, unit_id: Uuid) -> Result<()> {
        if self.props.status != HubStatus::Active {
            return Err(DomainError::invalid_state(
                "Cannot allocate unit to inactive hub",
            ));
        }
        if self.is_allocated(unit_id) {
            return Err(DomainError::Conflict(format!(
                "Unit {unit_id} already allocated to this hub"
            )));
        }
        if !self.props.capacity.has_space() {
            self.record(HubEventKind::CapacityExceeded {
                attempted_unit_id: unit_id,
            });
            return Err(DomainError::Capacity(format!(
                "Hub capacity exceeded ({} of {} slots in use)",
                self.props.capacity.current(),
                self.props.capacity.total()
            )));
        }

        self.props.allocated_units.push(unit_id);
        self.props.capacity = self.props.capacity.increment();
        self.touch();
        self.record(HubEventKind::UnitAllocated { unit_id });
        Ok(())
    }

    /// Release the slot held by `unit_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the unit holds no slot here.
    pub fn deallocate_unit(&mut self, unit_id: Uuid) -> Result<()> {
        let Some(index) = self
            .props
            .allocated_units
            .iter()
            .position(|id| *id == unit_id)
        else {
            return Err(DomainError::not_found("AllocatedUnit", unit_id));
        };

        self.props.allocated_units.remove(index);
        self.props.capacity = self.props.capacity.decrement();
        self.touch();
        self.record(HubEventKind::UnitDeallocated { unit_id });
        Ok(())
    }

    #[must_use]
    pub fn can_allocate_unit(&self) -> bool {
        self.props.status == HubStatus::Active && self.props.capacity.has_space()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the hub is under
    /// construction.
    pub fn activate(&mut self) -> Result<()> {
        if self.props.status != HubStatus::UnderConstruction {
            return Err(DomainError::invalid_state(
                "Only hubs under construction can be activated",
            ));
        }
        self.props.status = HubStatus::Active;
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DomainError::Precondition`] while any unit is still
    /// allocated.
    pub fn decommission(&mut self) -> Result<()> {
        if !self.props.allocated_units.is_empty() {
            return Err(DomainError::Precondition(format!(
                "Cannot decommission hub with {} allocated units",
                self.props.allocated_units.len()
            )));
        }
        self.props.status = HubStatus::Decommissioned;
        self.touch();
        Ok(())
    }

    pub fn assign_commander(&mut self, commander: Commander) {
        self.props.commander = Some(commander);
        self.touch();
    }

    // -------------------------------------------------------------------------
    // Domain events
    // -------------------------------------------------------------------------

    pub fn domain_events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drain the buffer, leaving it empty
    pub fn take_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear_domain_events(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, kind: HubEventKind) {
        self.events.push(DomainEvent::new(self.props.id, kind));
    }

    fn touch(&mut self) {
        self.props.updated_at = Utc::now();
    }
}

fn validate(props: &HubProps) -> Result<()> {
    if props.name.trim().is_empty() {
        return Err(DomainError::validation("Hub name is required"));
    }

    let allocated = props.allocated_units.len();
    if allocated > props.capacity.total() as usize {
        return Err(DomainError::validation("Allocated units exceed capacity"));
    }
    if allocated != props.capacity.current() as usize {
        return Err(DomainError::Validation(format!(
            "Capacity in use ({}) does not match allocated units ({allocated})",
            props.capacity.current()
        )));
    }
    for (i, id) in props.allocated_units.iter().enumerate() {
        if props.allocated_units[..i].contains(id) {
            return Err(DomainError::Validation(format!(
                "Unit {id} is allocated more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value_objects::Coordinates;
    use fake::Fake;
    use fake::faker::company::en::CompanyName;

    fn location() -> Location {
        Location::new("Hong Kong", "China", Coordinates::new(22.3193, 114.1694).unwrap()).unwrap()
    }

    fn hub(total: u32) -> Hub {
        let mut props = Hub::create(HubSpec {
            name: CompanyName().fake(),
            location: location(),
            total_capacity: total,
            commander: None,
            established_date: Utc::now(),
        })
        .unwrap()
        .to_props();
        props.id = Some(Uuid::new_v4());
        let mut hub = Hub::reconstitute(props).unwrap();
        hub.activate().unwrap();
        hub
    }

    #[test]
    fn test_create_starts_under_construction() {
        let hub = Hub::create(HubSpec {
            name: "Hong Kong Hub".to_string(),
            location: location(),
            total_capacity: 4,
            commander: None,
            established_date: Utc::now(),
        })
        .unwrap();
        assert_eq!(hub.status(), HubStatus::UnderConstruction);
        assert_eq!(hub.capacity().current(), 0);
        assert!(hub.allocated_units().is_empty());
        assert!(!hub.can_allocate_unit());
    }

    #[test]
    fn test_create_rejects_zero_capacity() {
        let err = Hub::create(HubSpec {
            name: "Lima".to_string(),
            location: location(),
            total_capacity: 0,
            commander: None,
            established_date: Utc::now(),
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_activate_only_from_construction() {
        let mut h = hub(2);
        assert_eq!(h.activate().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_allocate_and_deallocate() {
        let mut h = hub(3);
        let unit = Uuid::new_v4();
        h.allocate_unit(unit).unwrap();
        assert_eq!(h.allocated_units(), [unit]);
        assert_eq!(h.capacity().current(), 1);
        assert_eq!(h.domain_events().len(), 1);
        assert_eq!(
            h.domain_events()[0].kind,
            HubEventKind::UnitAllocated { unit_id: unit }
        );
        assert_eq!(h.domain_events()[0].hub_id, h.id());

        h.deallocate_unit(unit).unwrap();
        assert!(h.allocated_units().is_empty());
        assert_eq!(h.capacity().current(), 0);
        let events = h.take_domain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, HubEventKind::UnitDeallocated { unit_id: unit });
        assert!(h.domain_events().is_empty());
    }

    #[test]
    fn test_allocate_beyond_capacity_emits_event() {
        let mut h = hub(5);
        for _ in 0..5 {
            h.allocate_unit(Uuid::new_v4()).unwrap();
        }
        h.clear_domain_events();

        let sixth = Uuid::new_v4();
        let err = h.allocate_unit(sixth).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(h.allocated_units().len(), 5);
        assert_eq!(h.capacity().current(), 5);

        let exceeded: Vec<_> = h
            .domain_events()
            .iter()
            .filter(|e| matches!(e.kind, HubEventKind::CapacityExceeded { .. }))
            .collect();
        assert_eq!(exceeded.len(), 1);
        assert_eq!(exceeded[0].unit_id(), sixth);
    }

    #[test]
    fn test_duplicate_allocation_conflicts() {
        let mut h = hub(5);
        let unit = Uuid::new_v4();
        h.allocate_unit(unit).unwrap();
        assert_eq!(h.allocate_unit(unit).unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(h.allocated_units(), [unit]);
        assert_eq!(h.capacity().current(), 1);
    }

    #[test]
    fn test_allocate_requires_active() {
        let mut h = hub(2);
        h.decommission().unwrap();
        assert_eq!(
            h.allocate_unit(Uuid::new_v4()).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        assert!(h.domain_events().is_empty());
    }

    #[test]
    fn test_deallocate_unknown_unit() {
        let mut h = hub(2);
        assert_eq!(
            h.deallocate_unit(Uuid::new_v4()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(h.domain_events().is_empty());
    }

    #[test]
    fn test_decommission_is_idempotent_when_empty() {
        let mut h = hub(2);
        h.decommission().unwrap();
        h.decommission().unwrap();
        assert_eq!(h.status(), HubStatus::Decommissioned);
    }

    #[test]
    fn test_decommission_blocked_by_allocations() {
        let mut h = hub(2);
        h.allocate_unit(Uuid::new_v4()).unwrap();
        for _ in 0..2 {
            assert_eq!(h.decommission().unwrap_err().kind(), ErrorKind::Precondition);
        }
        assert_eq!(h.status(), HubStatus::Active);
    }

    #[test]
    fn test_reconstitute_rejects_inconsistent_bookkeeping() {
        let mut h = hub(2);
        let unit = Uuid::new_v4();
        h.allocate_unit(unit).unwrap();

        let mut dup = h.to_props();
        dup.allocated_units.push(unit);
        dup.capacity = Capacity::new(2, 2).unwrap();
        assert!(Hub::reconstitute(dup).is_err());

        let mut drift = h.to_props();
        drift.capacity = Capacity::new(2, 0).unwrap();
        assert!(Hub::reconstitute(drift).is_err());

        let mut over = h.to_props();
        over.capacity = Capacity::new(1, 1).unwrap();
        over.allocated_units.push(Uuid::new_v4());
        assert!(Hub::reconstitute(over).is_err());
    }

    #[test]
    fn test_round_trip_drops_events() {
        let mut h = hub(3);
        h.allocate_unit(Uuid::new_v4()).unwrap();
        h.assign_commander(
            Commander::new(Uuid::new_v4(), "Stacker Pentecost", CommanderRank::Marshal, 20)
                .unwrap(),
        );

        let restored = Hub::reconstitute(h.to_props()).unwrap();
        assert_eq!(restored.to_props(), h.to_props());
        assert!(restored.domain_events().is_empty());
    }

    #[test]
    fn test_commander_requires_name() {
        assert!(Commander::new(Uuid::new_v4(), " ", CommanderRank::General, 3).is_err());
    }
}

//! Serialized representations for API responses.
//!
//! Each view is a flat snapshot of an entity's public attributes plus its
//! derived flags. Views are built on demand and never stored, so the flags
//! always reflect the entity at the moment of serialization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::hub::{Commander, Hub, HubStatus};
use crate::pilot::{Pilot, PilotRank, PilotStatus};
use crate::unit::{Unit, UnitStatus};
use crate::value_objects::{IntegrityStatus, Location};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PilotView {
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
    pub can_pilot: bool,
}

impl From<&Pilot> for PilotView {
    fn from(p: &Pilot) -> Self {
        Self {
            id: p.id(),
            name: p.name().to_string(),
            rank: p.rank(),
            status: p.status(),
            drift_compatibility: p.drift_compatibility(),
            combat_hours: p.combat_hours(),
            kill_count: p.kill_count(),
            nationality: p.nationality().to_string(),
            unit_id: p.unit_id(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
            can_pilot: p.can_pilot(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView {
    pub id: Option<Uuid>,
    pub name: String,
    /// Rendered as `"Mark-N"`
    pub mark: String,
    pub power_multiplier: f64,
    pub status: UnitStatus,
    pub integrity_level: f64,
    pub integrity_status: IntegrityStatus,
    pub height: f64,
    pub weight: f64,
    pub power_core: String,
    pub weapons: Vec<String>,
    pub base_location: String,
    pub pilots: Vec<PilotView>,
    pub deployment_count: i32,
    pub kill_count: i32,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub can_deploy: bool,
    pub needs_maintenance: bool,
}

impl From<&Unit> for UnitView {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id(),
            name: u.name().to_string(),
            mark: u.mark().to_string(),
            power_multiplier: u.mark().power_multiplier(),
            status: u.status(),
            integrity_level: u.integrity_level().value(),
            integrity_status: u.integrity_level().status(),
            height: u.height(),
            weight: u.weight(),
            power_core: u.power_core().to_string(),
            weapons: u.weapons().to_vec(),
            base_location: u.base_location().to_string(),
            pilots: u.pilots().iter().map(PilotView::from).collect(),
            deployment_count: u.deployment_count(),
            kill_count: u.kill_count(),
            last_maintenance: u.last_maintenance(),
            created_at: u.created_at(),
            updated_at: u.updated_at(),
            can_deploy: u.can_deploy(),
            needs_maintenance: u.needs_maintenance(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityView {
    pub total: u32,
    pub current: u32,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubView {
    pub id: Option<Uuid>,
    pub name: String,
    pub location: Location,
    pub capacity: CapacityView,
    pub status: HubStatus,
    pub commander: Option<Commander>,
    pub allocated_units: Vec<Uuid>,
    pub established_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub can_allocate_unit: bool,
}

impl From<&Hub> for HubView {
    fn from(h: &Hub) -> Self {
        let capacity = h.capacity();
        Self {
            id: h.id(),
            name: h.name().to_string(),
            location: h.location().clone(),
            capacity: CapacityView {
                total: capacity.total(),
                current: capacity.current(),
                available: capacity.available(),
            },
            status: h.status(),
            commander: h.commander().cloned(),
            allocated_units: h.allocated_units().to_vec(),
            established_date: h.established_date(),
            created_at: h.created_at(),
            updated_at: h.updated_at(),
            can_allocate_unit: h.can_allocate_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubSpec;
    use crate::pilot::PilotSpec;
    use crate::unit::UnitSpec;
    use crate::value_objects::{Coordinates, IntegrityLevel, Mark};

    fn unit() -> Unit {
        Unit::create(UnitSpec {
            name: "Crimson Typhoon".to_string(),
            mark: Mark::new(4).unwrap(),
            height: 76.0,
            weight: 1722.0,
            power_core: "Digital Plasma Cycle".to_string(),
            weapons: vec!["Thundercloud Formation".to_string()],
            base_location: "Hong Kong".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_unit_view_recomputes_flags() {
        let mut u = unit();
        let before = serde_json::to_value(UnitView::from(&u)).unwrap();
        assert_eq!(before["mark"], "Mark-4");
        assert_eq!(before["status"], "active");
        assert_eq!(before["integrity_status"], "excellent");
        assert_eq!(before["can_deploy"], false);
        assert_eq!(before["needs_maintenance"], false);

        u.assign_pilots(vec![
            Pilot::create(PilotSpec {
                name: "Cheung Wei".to_string(),
                rank: PilotRank::Ranger,
                drift_compatibility: 88.0,
                nationality: "China".to_string(),
            })
            .unwrap(),
        ])
        .unwrap();
        let after = serde_json::to_value(UnitView::from(&u)).unwrap();
        assert_eq!(after["can_deploy"], true);
        assert_eq!(after["pilots"][0]["can_pilot"], true);

        u.update_integrity(IntegrityLevel::new(40.0).unwrap());
        let damaged = UnitView::from(&u);
        assert!(!damaged.can_deploy);
        assert!(damaged.needs_maintenance);
        assert_eq!(damaged.status, UnitStatus::Maintenance);
    }

    #[test]
    fn test_hub_view_shape() {
        let mut hub = Hub::create(HubSpec {
            name: "Tokyo Hub".to_string(),
            location: Location::new("Tokyo", "Japan", Coordinates::new(35.68, 139.65).unwrap())
                .unwrap(),
            total_capacity: 2,
            commander: None,
            established_date: Utc::now(),
        })
        .unwrap();
        hub.activate().unwrap();
        hub.allocate_unit(Uuid::new_v4()).unwrap();

        let json = serde_json::to_value(HubView::from(&hub)).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["location"]["city"], "Tokyo");
        assert_eq!(json["location"]["coordinates"]["latitude"], 35.68);
        assert_eq!(json["capacity"]["available"], 1);
        assert_eq!(json["can_allocate_unit"], true);
        assert_eq!(json["allocated_units"].as_array().unwrap().len(), 1);
    }
}

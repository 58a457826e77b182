//! Domain events emitted by the hub aggregate.
//!
//! Events are buffered on the aggregate and drained by the calling use-case,
//! which publishes them once the surrounding write has committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the hub's allocation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubEventKind {
    UnitAllocated { unit_id: Uuid },
    UnitDeallocated { unit_id: Uuid },
    /// Emitted on the rejection path, before the capacity error is returned
    CapacityExceeded { attempted_unit_id: Uuid },
}

/// Immutable record of an allocation state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    /// `None` only when the hub has not been persisted yet
    pub hub_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
    pub kind: HubEventKind,
}

impl DomainEvent {
    #[must_use]
    pub fn new(hub_id: Option<Uuid>, kind: HubEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            hub_id,
            occurred_at: Utc::now(),
            kind,
        }
    }

    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self.kind {
            HubEventKind::UnitAllocated { .. } => "UnitAllocated",
            HubEventKind::UnitDeallocated { .. } => "UnitDeallocated",
            HubEventKind::CapacityExceeded { .. } => "CapacityExceeded",
        }
    }

    /// The unit the event concerns, whether it was allocated or turned away
    #[must_use]
    pub const fn unit_id(&self) -> Uuid {
        match self.kind {
            HubEventKind::UnitAllocated { unit_id } | HubEventKind::UnitDeallocated { unit_id } => {
                unit_id
            }
            HubEventKind::CapacityExceeded { attempted_unit_id } => attempted_unit_id,
        }
    }
}

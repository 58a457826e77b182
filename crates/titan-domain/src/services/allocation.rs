//! Pre-flight checks mirroring the hub's allocation guards without mutating.

use uuid::Uuid;

use super::ValidationResult;
use crate::hub::{Hub, HubStatus};

/// Same guards as [`Hub::allocate_unit`], in the same order, minus the
/// mutation and the capacity event
#[must_use]
pub fn can_allocate(hub: &Hub, unit_id: Uuid) -> ValidationResult {
    if hub.status() != HubStatus::Active {
        return ValidationResult::invalid("Hub is not active");
    }
    if hub.is_allocated(unit_id) {
        return ValidationResult::invalid("Unit already allocated");
    }
    if !hub.capacity().has_space() {
        return ValidationResult::invalid("No available capacity");
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_deallocation(hub: &Hub, unit_id: Uuid) -> ValidationResult {
    if hub.is_allocated(unit_id) {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid("Unit not allocated to this hub")
    }
}

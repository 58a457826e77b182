//! Unit and crew validation rules.

use super::ValidationResult;
use crate::pilot::Pilot;
use crate::unit::{MAX_PILOTS, Unit, UnitStatus};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;
pub const HEIGHT_RANGE: std::ops::RangeInclusive<f64> = 50.0..=300.0;
pub const WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 1000.0..=10_000.0;

/// 3 to 50 characters of letters, digits, spaces and hyphens
#[must_use]
pub fn validate_unit_name(name: &str) -> ValidationResult {
    if name.trim().is_empty() {
        return ValidationResult::invalid("Name cannot be empty");
    }

    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return ValidationResult::invalid("Name must be at least 3 characters long");
    }
    if len > NAME_MAX_LEN {
        return ValidationResult::invalid("Name cannot exceed 50 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    {
        return ValidationResult::invalid(
            "Name can only contain letters, numbers, spaces, and hyphens",
        );
    }
    ValidationResult::ok()
}

/// Height 50-300 meters, weight 1,000-10,000 tons
#[must_use]
pub fn validate_unit_specs(height: f64, weight: f64) -> ValidationResult {
    if !HEIGHT_RANGE.contains(&height) {
        return ValidationResult::invalid("Height must be between 50 and 300 meters");
    }
    if !WEIGHT_RANGE.contains(&weight) {
        return ValidationResult::invalid("Weight must be between 1,000 and 10,000 tons");
    }
    ValidationResult::ok()
}

/// Same verdict as [`Unit::can_deploy`], but lists every failing reason
#[must_use]
pub fn can_deploy(unit: &Unit) -> ValidationResult {
    if unit.can_deploy() {
        return ValidationResult::ok();
    }

    let mut reasons = Vec::new();
    if !unit.integrity_level().can_deploy() {
        reasons.push("Integrity level below 70%".to_string());
    }
    if unit.pilots().is_empty() {
        reasons.push("No pilots assigned".to_string());
    }
    if unit.status() != UnitStatus::Active {
        reasons.push(format!("Status is {}", unit.status().as_str()));
    }
    ValidationResult::invalid(reasons.join(", "))
}

/// Checks each pilot can pilot at all before checking the pair drifts
#[must_use]
pub fn validate_pilot_compatibility(first: &Pilot, second: &Pilot) -> ValidationResult {
    for pilot in [first, second] {
        if !pilot.can_pilot() {
            return cannot_pilot(pilot);
        }
    }
    if !first.is_compatible_with(second) {
        return ValidationResult::invalid("Pilots are not drift compatible");
    }
    ValidationResult::ok()
}

/// Whole-crew check ahead of [`Unit::assign_pilots`].
///
/// An empty crew is valid (it stands the unit down); a single pilot must be
/// able to pilot; a pair must also be drift compatible.
#[must_use]
pub fn validate_pilot_crew(pilots: &[Pilot]) -> ValidationResult {
    match pilots {
        [] => ValidationResult::ok(),
        [solo] if !solo.can_pilot() => cannot_pilot(solo),
        [_] => ValidationResult::ok(),
        [first, second] => validate_pilot_compatibility(first, second),
        _ => ValidationResult::invalid(format!(
            "A unit can have maximum {MAX_PILOTS} pilots"
        )),
    }
}

fn cannot_pilot(pilot: &Pilot) -> ValidationResult {
    ValidationResult::invalid(format!(
        "{} cannot pilot (status: {}, compatibility: {})",
        pilot.name(),
        pilot.status().as_str(),
        pilot.drift_compatibility()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pilot::{PilotRank, PilotSpec};
    use crate::unit::UnitSpec;
    use crate::value_objects::{IntegrityLevel, Mark};

    fn pilot(name: &str, drift: f64) -> Pilot {
        Pilot::create(PilotSpec {
            name: name.to_string(),
            rank: PilotRank::Ranger,
            drift_compatibility: drift,
            nationality: "Russia".to_string(),
        })
        .unwrap()
    }

    fn unit() -> Unit {
        Unit::create(UnitSpec {
            name: "Cherno Alpha".to_string(),
            mark: Mark::new(1).unwrap(),
            height: 85.0,
            weight: 2412.0,
            power_core: "Nuclear Reactor".to_string(),
            weapons: vec!["Tesla Fist".to_string()],
            base_location: "Vladivostok".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_name_rule() {
        assert!(validate_unit_name("Striker Eureka").valid);
        assert!(validate_unit_name("Mark-5 Type-2").valid);
        assert_eq!(
            validate_unit_name("  ").reason.as_deref(),
            Some("Name cannot be empty")
        );
        assert!(!validate_unit_name("Ab").valid);
        assert!(validate_unit_name("Abc").valid);
        assert!(validate_unit_name(&"x".repeat(50)).valid);
        assert!(!validate_unit_name(&"x".repeat(51)).valid);
        assert!(!validate_unit_name("Crimson_Typhoon").valid);
        assert!(!validate_unit_name("Horizon Brave!").valid);
    }

    #[test]
    fn test_spec_rule() {
        assert!(validate_unit_specs(50.0, 1000.0).valid);
        assert!(validate_unit_specs(300.0, 10_000.0).valid);
        assert!(validate_unit_specs(49.9, 2000.0).reason.unwrap().contains("Height"));
        assert!(validate_unit_specs(80.0, 10_001.0).reason.unwrap().contains("Weight"));
        assert!(!validate_unit_specs(f64::NAN, 2000.0).valid);
    }

    #[test]
    fn test_can_deploy_aggregates_reasons() {
        let mut u = unit();
        u.update_integrity(IntegrityLevel::new(20.0).unwrap());
        let result = can_deploy(&u);
        assert!(!result.valid);
        assert_eq!(
            result.reason.as_deref(),
            Some("Integrity level below 70%, No pilots assigned, Status is damaged")
        );

        let mut u = unit();
        u.assign_pilots(vec![pilot("Sasha", 80.0)]).unwrap();
        assert_eq!(can_deploy(&u), ValidationResult::ok());
    }

    #[test]
    fn test_compatibility_names_ineligible_pilot() {
        let good = pilot("Aleksis", 80.0);
        let weak = pilot("Sasha", 45.0);
        let reason = validate_pilot_compatibility(&good, &weak).reason.unwrap();
        assert!(reason.starts_with("Sasha cannot pilot"), "{reason}");

        let mut injured = pilot("Aleksis", 90.0);
        injured.injure();
        let reason = validate_pilot_compatibility(&injured, &weak).reason.unwrap();
        assert!(reason.contains("status: injured"), "{reason}");

        let a = pilot("Hu", 55.0);
        let b = pilot("Jin", 60.0);
        assert_eq!(
            validate_pilot_compatibility(&a, &b).reason.as_deref(),
            Some("Pilots are not drift compatible")
        );
        let strong = pilot("Raleigh", 90.0);
        assert!(validate_pilot_compatibility(&a, &strong).valid);
    }

    #[test]
    fn test_crew_rule() {
        assert!(validate_pilot_crew(&[]).valid);
        assert!(validate_pilot_crew(&[pilot("Solo", 60.0)]).valid);
        assert!(!validate_pilot_crew(&[pilot("Solo", 30.0)]).valid);
        assert!(!validate_pilot_crew(&[pilot("A", 90.0), pilot("B", 90.0), pilot("C", 90.0)]).valid);
    }
}

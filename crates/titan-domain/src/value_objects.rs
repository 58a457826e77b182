//! Bounded value objects: integrity, mark, capacity and geography.
//!
//! All of these are immutable. Operations that "change" a value return a new
//! instance, and construction is the only place bounds are checked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

// =============================================================================
// INTEGRITY LEVEL
// =============================================================================

/// Coarse band an [`IntegrityLevel`] falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Critical,
    Damaged,
    Operational,
    Excellent,
}

/// Structural integrity of a unit, as a percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct IntegrityLevel(f64);

impl IntegrityLevel {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    const CRITICAL_BELOW: f64 = 30.0;
    const DAMAGED_BELOW: f64 = 70.0;
    const OPERATIONAL_BELOW: f64 = 90.0;
    const OPERATE_THRESHOLD: f64 = 50.0;

    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when `value` is outside `[0, 100]`
    /// or not a finite number.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::validation(
                "Integrity level must be between 0 and 100",
            ));
        }
        Ok(Self(value))
    }

    /// Full integrity, the level every new unit starts at
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::MAX)
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn status(&self) -> IntegrityStatus {
        if self.0 < Self::CRITICAL_BELOW {
            IntegrityStatus::Critical
        } else if self.0 < Self::DAMAGED_BELOW {
            IntegrityStatus::Damaged
        } else if self.0 < Self::OPERATIONAL_BELOW {
            IntegrityStatus::Operational
        } else {
            IntegrityStatus::Excellent
        }
    }

    /// Dashboard colour: red, yellow or green
    #[must_use]
    pub fn color(&self) -> &'static str {
        if self.0 < Self::CRITICAL_BELOW {
            "red"
        } else if self.0 < Self::DAMAGED_BELOW {
            "yellow"
        } else {
            "green"
        }
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.0 < Self::CRITICAL_BELOW
    }

    #[must_use]
    pub fn can_operate(&self) -> bool {
        self.0 >= Self::OPERATE_THRESHOLD
    }

    #[must_use]
    pub fn can_deploy(&self) -> bool {
        self.0 >= Self::DAMAGED_BELOW
    }

    /// Raise by `amount`, saturating at 100
    #[must_use]
    pub fn increase(&self, amount: f64) -> Self {
        self.shifted(amount)
    }

    /// Lower by `amount`, saturating at 0
    #[must_use]
    pub fn decrease(&self, amount: f64) -> Self {
        self.shifted(-amount)
    }

    fn shifted(&self, delta: f64) -> Self {
        if !delta.is_finite() {
            return *self;
        }
        Self((self.0 + delta).clamp(Self::MIN, Self::MAX))
    }
}

impl TryFrom<f64> for IntegrityLevel {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<IntegrityLevel> for f64 {
    fn from(level: IntegrityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for IntegrityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// MARK
// =============================================================================

/// Unit generation, Mark-1 through Mark-7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mark(u8);

impl Mark {
    pub const VALID_MARKS: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for anything outside 1..=7.
    pub fn new(value: u8) -> Result<Self> {
        if Self::VALID_MARKS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::Validation(format!(
                "Invalid mark: {value}. Valid marks are: 1, 2, 3, 4, 5, 6, 7"
            )))
        }
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Each generation is roughly 20% stronger than the previous one
    #[must_use]
    pub fn power_multiplier(&self) -> f64 {
        1.0 + f64::from(self.0 - 1) * 0.2
    }

    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    #[must_use]
    pub fn is_older_than(&self, other: &Self) -> bool {
        self.0 < other.0
    }
}

impl TryFrom<u8> for Mark {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Mark> for u8 {
    fn from(mark: Mark) -> Self {
        mark.0
    }
}

/// Accepts `"Mark-3"`, `"Mark 3"` or `"3"`
impl FromStr for Mark {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        let value = digits
            .parse::<u8>()
            .map_err(|_| DomainError::Validation(format!("Invalid mark format: {s}")))?;
        Self::new(value)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mark-{}", self.0)
    }
}

// =============================================================================
// CAPACITY
// =============================================================================

#[derive(Deserialize)]
struct RawCapacity {
    total: u32,
    current: u32,
}

/// Slot bookkeeping for a hub: `0 <= current <= total`, `total > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCapacity")]
pub struct Capacity {
    total: u32,
    current: u32,
}

impl Capacity {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `total` is zero or `current`
    /// exceeds it.
    pub fn new(total: u32, current: u32) -> Result<Self> {
        if total == 0 {
            return Err(DomainError::validation(
                "Total capacity must be greater than 0",
            ));
        }
        if current > total {
            return Err(DomainError::validation(
                "Current capacity cannot exceed total",
            ));
        }
        Ok(Self { total, current })
    }

    /// Empty capacity of the given size
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `total` is zero.
    pub fn empty(total: u32) -> Result<Self> {
        Self::new(total, 0)
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn available(&self) -> u32 {
        self.total - self.current
    }

    #[must_use]
    pub fn utilization_percent(&self) -> f64 {
        f64::from(self.current) / f64::from(self.total) * 100.0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.total
    }

    #[must_use]
    pub const fn has_space(&self) -> bool {
        self.current < self.total
    }

    /// One more slot in use.
    ///
    /// Callers must check [`Self::has_space`] first; the owning aggregate is
    /// what guarantees this is never called on a full capacity.
    #[must_use]
    pub fn increment(&self) -> Self {
        debug_assert!(self.has_space(), "increment called on a full capacity");
        Self {
            total: self.total,
            current: (self.current + 1).min(self.total),
        }
    }

    /// One fewer slot in use, floored at zero
    #[must_use]
    pub const fn decrement(&self) -> Self {
        Self {
            total: self.total,
            current: self.current.saturating_sub(1),
        }
    }
}

impl TryFrom<RawCapacity> for Capacity {
    type Error = DomainError;

    fn try_from(raw: RawCapacity) -> Result<Self> {
        Self::new(raw.total, raw.current)
    }
}

// =============================================================================
// COORDINATES & LOCATION
// =============================================================================

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if latitude is outside `[-90, 90]`
    /// or longitude outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation("Latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation(
                "Longitude must be between -180 and 180",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Calculate great-circle distance to another point (Haversine formula)
    #[must_use]
    pub fn distance_to_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = DomainError;

    fn try_from(raw: RawCoordinates) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Deserialize)]
struct RawLocation {
    city: String,
    country: String,
    coordinates: Coordinates,
}

/// City, country and position of a hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    city: String,
    country: String,
    coordinates: Coordinates,
}

impl Location {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if city or country is blank.
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        coordinates: Coordinates,
    ) -> Result<Self> {
        let city = city.into();
        let country = country.into();
        if city.trim().is_empty() {
            return Err(DomainError::validation("City is required"));
        }
        if country.trim().is_empty() {
            return Err(DomainError::validation("Country is required"));
        }
        Ok(Self {
            city,
            country,
            coordinates,
        })
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub const fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }
}

impl TryFrom<RawLocation> for Location {
    type Error = DomainError;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Self::new(raw.city, raw.country, raw.coordinates)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_integrity_accepts_full_range() {
        for v in 0..=100 {
            let level = IntegrityLevel::new(f64::from(v)).unwrap();
            assert_eq!(level.value(), f64::from(v));
        }
    }

    #[test]
    fn test_integrity_rejects_out_of_range() {
        for v in [-0.5, -1.0, 100.1, 250.0, f64::NAN, f64::INFINITY] {
            let err = IntegrityLevel::new(v).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_integrity_status_bands() {
        let status = |v: f64| IntegrityLevel::new(v).unwrap().status();
        assert_eq!(status(0.0), IntegrityStatus::Critical);
        assert_eq!(status(29.9), IntegrityStatus::Critical);
        assert_eq!(status(30.0), IntegrityStatus::Damaged);
        assert_eq!(status(69.0), IntegrityStatus::Damaged);
        assert_eq!(status(70.0), IntegrityStatus::Operational);
        assert_eq!(status(89.0), IntegrityStatus::Operational);
        assert_eq!(status(90.0), IntegrityStatus::Excellent);
        assert_eq!(status(100.0), IntegrityStatus::Excellent);
    }

    #[test]
    fn test_integrity_increase_decrease_clamp() {
        let level = IntegrityLevel::new(80.0).unwrap();
        assert_eq!(level.increase(50.0).value(), 100.0);
        assert_eq!(level.decrease(95.0).value(), 0.0);
        assert_eq!(level.decrease(10.0).value(), 70.0);
        // original untouched
        assert_eq!(level.value(), 80.0);
    }

    #[test]
    fn test_integrity_helpers() {
        let level = IntegrityLevel::new(55.0).unwrap();
        assert!(level.can_operate());
        assert!(!level.can_deploy());
        assert!(!level.is_critical());
        assert_eq!(level.color(), "yellow");
        assert_eq!(level.to_string(), "55%");
        assert!(IntegrityLevel::new(10.0).unwrap() < level);
    }

    #[test]
    fn test_mark_bounds_and_multiplier() {
        assert!(Mark::new(0).is_err());
        assert!(Mark::new(8).is_err());
        let mark = Mark::new(3).unwrap();
        assert!((mark.power_multiplier() - 1.4).abs() < f64::EPSILON);
        assert!((Mark::new(1).unwrap().power_multiplier() - 1.0).abs() < f64::EPSILON);
        assert!(mark.is_newer_than(&Mark::new(2).unwrap()));
        assert!(mark.is_older_than(&Mark::new(5).unwrap()));
    }

    #[test]
    fn test_mark_parse() {
        assert_eq!("Mark-4".parse::<Mark>().unwrap().value(), 4);
        assert_eq!("Mark 5".parse::<Mark>().unwrap().value(), 5);
        assert_eq!("7".parse::<Mark>().unwrap().value(), 7);
        assert!("Mark-IX".parse::<Mark>().is_err());
        assert!("Mark-9".parse::<Mark>().is_err());
        assert_eq!(Mark::new(6).unwrap().to_string(), "Mark-6");
    }

    #[test]
    fn test_capacity_full() {
        let cap = Capacity::new(5, 5).unwrap();
        assert!(!cap.has_space());
        assert!(cap.is_full());
        assert_eq!(cap.available(), 0);
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(Capacity::new(0, 0).is_err());
        assert!(Capacity::new(3, 4).is_err());
        let cap = Capacity::empty(4).unwrap();
        assert_eq!(cap.increment().current(), 1);
        assert_eq!(cap.decrement().current(), 0);
        assert!((Capacity::new(4, 1).unwrap().utilization_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_deserialize_validates() {
        let ok: Capacity = serde_json::from_str(r#"{"total":3,"current":1}"#).unwrap();
        assert_eq!(ok.available(), 2);
        assert!(serde_json::from_str::<Capacity>(r#"{"total":3,"current":9}"#).is_err());
    }

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_coordinates_distance() {
        let hong_kong = Coordinates::new(22.3193, 114.1694).unwrap();
        let tokyo = Coordinates::new(35.6762, 139.6503).unwrap();
        let d = hong_kong.distance_to_km(&tokyo);
        assert!((2850.0..2950.0).contains(&d), "distance was {d}");
        assert!(hong_kong.distance_to_km(&hong_kong) < 1e-9);
    }

    #[test]
    fn test_location_requires_names() {
        let coords = Coordinates::new(22.3, 114.2).unwrap();
        assert!(Location::new("", "China", coords).is_err());
        assert!(Location::new("Hong Kong", "  ", coords).is_err());
        let loc = Location::new("Hong Kong", "China", coords).unwrap();
        assert_eq!(loc.to_string(), "Hong Kong, China");
    }
}

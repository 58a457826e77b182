//! Query filter and pagination types shared by repository implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};
use titan_domain::{Hub, HubStatus, Mark, Unit, UnitStatus};

// =============================================================================
// UNIT FILTERS
// =============================================================================

/// Unit query filters. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitFilters {
    pub status: Option<UnitStatus>,
    pub mark: Option<Mark>,
    pub base_location: Option<String>,
    pub min_integrity: Option<f64>,
    pub max_integrity: Option<f64>,
    pub can_deploy: Option<bool>,
    pub needs_maintenance: Option<bool>,
}

impl UnitFilters {
    /// Evaluate against a fixed clock so a whole page sees the same "now"
    #[must_use]
    pub fn matches(&self, unit: &Unit, now: DateTime<Utc>) -> bool {
        let integrity = unit.integrity_level().value();
        self.status.is_none_or(|s| unit.status() == s)
            && self.mark.is_none_or(|m| unit.mark() == m)
            && self
                .base_location
                .as_deref()
                .is_none_or(|b| unit.base_location() == b)
            && self.min_integrity.is_none_or(|min| integrity >= min)
            && self.max_integrity.is_none_or(|max| integrity <= max)
            && self.can_deploy.is_none_or(|d| unit.can_deploy() == d)
            && self
                .needs_maintenance
                .is_none_or(|m| unit.needs_maintenance_at(now) == m)
    }
}

// =============================================================================
// HUB FILTERS
// =============================================================================

/// Hub query filters. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubFilters {
    pub status: Option<HubStatus>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// `Some(true)` keeps hubs with a free slot, `Some(false)` full ones
    pub has_capacity: Option<bool>,
}

impl HubFilters {
    #[must_use]
    pub fn matches(&self, hub: &Hub) -> bool {
        self.status.is_none_or(|s| hub.status() == s)
            && self
                .city
                .as_deref()
                .is_none_or(|c| hub.location().city() == c)
            && self
                .country
                .as_deref()
                .is_none_or(|c| hub.location().country() == c)
            && self
                .has_capacity
                .is_none_or(|h| hub.capacity().has_space() == h)
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination parameters, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidQuery`] for a zero page or limit.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(PersistenceError::InvalidQuery(
                "page must be at least 1".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(PersistenceError::InvalidQuery(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

/// One page of results plus the totals needed to render a pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let limit = u64::from(pagination.limit.max(1));
        Self {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Convert every item, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_offset() {
        let p = Pagination::default();
        assert_eq!((p.page, p.limit), (1, 10));
        assert_eq!(p.offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_pagination_rejects_zero() {
        assert!(Pagination::new(0, 10).validate().is_err());
        assert!(Pagination::new(1, 0).validate().is_err());
        assert!(Pagination::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let r = PaginatedResult::new(vec![1, 2], 21, Pagination::new(1, 10));
        assert_eq!(r.total_pages, 3);
        let empty: PaginatedResult<i32> = PaginatedResult::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages, 0);
        assert_eq!(r.map(|x| x * 2).data, vec![2, 4]);
    }
}

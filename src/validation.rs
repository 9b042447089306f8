//! Validation of search query parameters.
//!
//! All parameter problems are rejected here, before any data access:
//! unknown status values, non-positive page or page_size. Oversized
//! page_size is clamped rather than rejected.

use crate::directory::EmployeeStatus;
use crate::error::{Error, Result};
use crate::search::SearchFilters;
use serde::Deserialize;

/// Raw query parameters as they arrive from the HTTP boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Pagination limits from service configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}

/// Parameters after validation, ready for the search engine.
#[derive(Debug, Clone)]
pub struct ValidatedSearch {
    pub filters: SearchFilters,
    pub page: usize,
    pub page_size: usize,
}

impl SearchParams {
    pub fn validate(self, limits: &PageLimits) -> Result<ValidatedSearch> {
        let page = match self.page {
            None => 1,
            Some(page) if page >= 1 => page as usize,
            Some(page) => {
                return Err(Error::InvalidInput(format!(
                    "page must be >= 1, got {}",
                    page
                )))
            }
        };

        let page_size = match self.page_size {
            None => limits.default_page_size,
            Some(size) if size >= 1 => (size as usize).min(limits.max_page_size),
            Some(size) => {
                return Err(Error::InvalidInput(format!(
                    "page_size must be >= 1, got {}",
                    size
                )))
            }
        };

        let status = match normalize(self.status) {
            Some(raw) => Some(EmployeeStatus::parse(&raw)?),
            None => None,
        };

        Ok(ValidatedSearch {
            filters: SearchFilters {
                search: normalize(self.search),
                department: normalize(self.department),
                position: normalize(self.position),
                location: normalize(self.location),
                status,
            },
            page,
            page_size,
        })
    }
}

/// Blank parameters count as absent.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let validated = SearchParams::default()
            .validate(&PageLimits::default())
            .unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.page_size, 50);
        assert!(validated.filters.search.is_none());
        assert!(validated.filters.status.is_none());
    }

    #[test]
    fn test_invalid_status_rejected_not_ignored() {
        let params = SearchParams {
            status: Some("bogus".to_string()),
            ..SearchParams::default()
        };
        assert!(matches!(
            params.validate(&PageLimits::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_valid_status_parsed() {
        let params = SearchParams {
            status: Some("on_leave".to_string()),
            ..SearchParams::default()
        };
        let validated = params.validate(&PageLimits::default()).unwrap();
        assert_eq!(validated.filters.status, Some(EmployeeStatus::OnLeave));
    }

    #[test]
    fn test_non_positive_page_rejected() {
        for page in [0, -3] {
            let params = SearchParams {
                page: Some(page),
                ..SearchParams::default()
            };
            assert!(params.validate(&PageLimits::default()).is_err());
        }
    }

    #[test]
    fn test_non_positive_page_size_rejected() {
        for size in [0, -1] {
            let params = SearchParams {
                page_size: Some(size),
                ..SearchParams::default()
            };
            assert!(params.validate(&PageLimits::default()).is_err());
        }
    }

    #[test]
    fn test_oversized_page_size_clamped() {
        let params = SearchParams {
            page_size: Some(5_000),
            ..SearchParams::default()
        };
        let validated = params.validate(&PageLimits::default()).unwrap();
        assert_eq!(validated.page_size, 100);
    }

    #[test]
    fn test_blank_filters_treated_as_absent() {
        let params = SearchParams {
            search: Some("   ".to_string()),
            department: Some(String::new()),
            ..SearchParams::default()
        };
        let validated = params.validate(&PageLimits::default()).unwrap();
        assert!(validated.filters.search.is_none());
        assert!(validated.filters.department.is_none());
    }
}

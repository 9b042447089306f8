//! Tenant-scoped employee search: filtering, deterministic ordering,
//! pagination, and per-tenant column projection.

use crate::columns::ColumnConfig;
use crate::directory::{DirectoryStore, Employee, EmployeeStatus};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// AND-combined search filters. All of them are optional; an empty filter
/// set matches every record of the tenant.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Case-insensitive substring over first name, last name, and email.
    pub search: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// A search scoped to one tenant.
///
/// The only way to construct one is [`TenantQuery::for_tenant`], so the
/// tenant predicate is supplied before any filter can attach and can never
/// be bypassed by filter composition.
#[derive(Debug, Clone)]
pub struct TenantQuery {
    tenant_id: Uuid,
    filters: SearchFilters,
}

impl TenantQuery {
    pub fn for_tenant(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.filters.search = Some(term.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.filters.department = Some(department.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.filters.position = Some(position.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.filters.location = Some(location.into());
        self
    }

    pub fn with_status(mut self, status: EmployeeStatus) -> Self {
        self.filters.status = Some(status);
        self
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

/// One page of projected results.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult {
    /// Matches before pagination, scoped to the same tenant and filters.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    /// Column-name to value maps in the tenant's configured column order.
    pub items: Vec<Map<String, Value>>,
}

#[derive(Clone)]
pub struct SearchEngine {
    directory: Arc<dyn DirectoryStore>,
}

impl SearchEngine {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Run a tenant-scoped search and return one page of results.
    ///
    /// Tenant existence is checked before any record access; the unknown
    /// tenant error carries no record-level information. Matches are
    /// ordered by (last_name, first_name, id) -- the id tie-break keeps a
    /// static dataset stable across page boundaries.
    pub fn search(&self, query: &TenantQuery, page: usize, page_size: usize) -> Result<PagedResult> {
        if page < 1 {
            return Err(Error::InvalidInput("page must be >= 1".to_string()));
        }
        if page_size < 1 {
            return Err(Error::InvalidInput("page_size must be >= 1".to_string()));
        }

        if self.directory.get_tenant(query.tenant_id)?.is_none() {
            return Err(Error::TenantNotFound);
        }

        let columns = self
            .directory
            .column_config(query.tenant_id)?
            .unwrap_or_else(ColumnConfig::default_columns);

        let mut matches: Vec<Employee> = self
            .directory
            .employees_for_tenant(query.tenant_id)?
            .into_iter()
            .filter(|employee| matches_filters(employee, &query.filters))
            .collect();

        matches.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });

        let total_count = matches.len();
        let start = (page - 1).saturating_mul(page_size);
        let items = matches
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|employee| project(&employee, &columns))
            .collect();

        Ok(PagedResult {
            total_count,
            page,
            page_size,
            items,
        })
    }
}

fn matches_filters(employee: &Employee, filters: &SearchFilters) -> bool {
    if let Some(term) = &filters.search {
        let needle = term.to_lowercase();
        let haystack_hit = employee.first_name.to_lowercase().contains(&needle)
            || employee.last_name.to_lowercase().contains(&needle)
            || employee.email.to_lowercase().contains(&needle);
        if !haystack_hit {
            return false;
        }
    }
    if let Some(department) = &filters.department {
        if !employee.department.eq_ignore_ascii_case(department) {
            return false;
        }
    }
    if let Some(position) = &filters.position {
        if !employee.position.eq_ignore_ascii_case(position) {
            return false;
        }
    }
    if let Some(location) = &filters.location {
        if !employee.location.eq_ignore_ascii_case(location) {
            return false;
        }
    }
    if let Some(status) = filters.status {
        if employee.status != status {
            return false;
        }
    }
    true
}

/// Project an employee onto the tenant's visible columns, in configured
/// order. Columns not listed are absent from the map, not null-filled.
fn project(employee: &Employee, config: &ColumnConfig) -> Map<String, Value> {
    let mut item = Map::new();
    for column in &config.visible_columns {
        item.insert(column.key().to_string(), employee.column_value(*column));
    }
    item
}

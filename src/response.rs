use crate::columns::{Column, ColumnConfig};
use crate::directory::Tenant;
use crate::search::PagedResult;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Tenant identity as exposed on the wire. Only the opaque id and display
/// name; never record counts.
#[derive(Debug, Serialize)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Tenant> for OrganizationSummary {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<Map<String, Value>>,
    pub meta: SearchMeta,
}

#[derive(Debug, Serialize)]
pub struct SearchMeta {
    pub organization: OrganizationSummary,
    pub visible_columns: Vec<&'static str>,
}

impl SearchResponse {
    pub fn new(tenant: &Tenant, columns: &ColumnConfig, result: PagedResult) -> Self {
        Self {
            count: result.total_count,
            page: result.page,
            page_size: result.page_size,
            results: result.items,
            meta: SearchMeta {
                organization: tenant.into(),
                visible_columns: columns
                    .visible_columns
                    .iter()
                    .map(|column| column.key())
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnDescriptor {
    pub key: &'static str,
    pub label: &'static str,
}

impl From<Column> for ColumnDescriptor {
    fn from(column: Column) -> Self {
        Self {
            key: column.key(),
            label: column.label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationConfigResponse {
    pub organization: OrganizationSummary,
    pub visible_columns: Vec<ColumnDescriptor>,
    pub available_columns: Vec<ColumnDescriptor>,
}

impl OrganizationConfigResponse {
    pub fn new(tenant: &Tenant, config: &ColumnConfig) -> Self {
        Self {
            organization: tenant.into(),
            visible_columns: config
                .visible_columns
                .iter()
                .map(|column| ColumnDescriptor::from(*column))
                .collect(),
            available_columns: Column::ALL
                .into_iter()
                .map(ColumnDescriptor::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationListResponse {
    pub organizations: Vec<OrganizationSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnConfig;

    #[test]
    fn test_config_response_preserves_column_order() {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            is_active: true,
        };
        let config =
            ColumnConfig::new(vec![Column::Department, Column::FirstName]).unwrap();
        let response = OrganizationConfigResponse::new(&tenant, &config);

        let keys: Vec<&str> = response
            .visible_columns
            .iter()
            .map(|descriptor| descriptor.key)
            .collect();
        assert_eq!(keys, ["department", "first_name"]);
        assert_eq!(response.available_columns.len(), 8);
        assert_eq!(response.visible_columns[0].label, "Department");
    }
}

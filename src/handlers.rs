use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::columns::ColumnConfig;
use crate::directory::DirectoryStore;
use crate::error::{Error, Result};
use crate::rate_limiter::RateLimiter;
use crate::response::{
    HealthResponse, OrganizationConfigResponse, OrganizationListResponse, OrganizationSummary,
    SearchResponse,
};
use crate::search::{SearchEngine, TenantQuery};
use crate::validation::{PageLimits, SearchParams};

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state: the admission limiter, the query engine, and the
/// directory they both read from.
pub struct AppState {
    pub limiter: RateLimiter,
    pub engine: SearchEngine,
    pub directory: Arc<dyn DirectoryStore>,
    pub page_limits: PageLimits,
}

/// Search employees within one organization.
pub async fn search_employees(
    State(state): State<SharedState>,
    Path(organization_id): Path<Uuid>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    // Parameter problems are rejected before any record access.
    let validated = params.validate(&state.page_limits)?;

    let tenant = state
        .directory
        .get_tenant(organization_id)?
        .ok_or(Error::TenantNotFound)?;

    let query = TenantQuery::for_tenant(organization_id).with_filters(validated.filters);
    let result = state
        .engine
        .search(&query, validated.page, validated.page_size)?;

    let columns = state
        .directory
        .column_config(organization_id)?
        .unwrap_or_else(ColumnConfig::default_columns);

    tracing::debug!(
        organization = %organization_id,
        count = result.total_count,
        page = result.page,
        "employee search completed"
    );

    Ok(Json(SearchResponse::new(&tenant, &columns, result)))
}

/// Column configuration for one organization.
pub async fn organization_config(
    State(state): State<SharedState>,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let tenant = state
        .directory
        .get_tenant(organization_id)?
        .ok_or(Error::TenantNotFound)?;

    let columns = state
        .directory
        .column_config(organization_id)?
        .unwrap_or_else(ColumnConfig::default_columns);

    Ok(Json(OrganizationConfigResponse::new(&tenant, &columns)))
}

/// List all active organizations.
pub async fn list_organizations(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse> {
    let tenants = state.directory.list_tenants()?;
    let organizations: Vec<OrganizationSummary> =
        tenants.iter().map(OrganizationSummary::from).collect();
    let count = organizations.len();

    Ok(Json(OrganizationListResponse {
        organizations,
        count,
    }))
}

/// Health check endpoint, exempt from admission control.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

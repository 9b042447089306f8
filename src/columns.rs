//! Per-tenant column configuration.
//!
//! Each organization declares which employee columns its search results
//! expose and in what order. The column set is closed; unknown identifiers
//! fail deserialization instead of being silently dropped.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The fixed set of projectable employee columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    FirstName,
    LastName,
    Email,
    Phone,
    Department,
    Position,
    Location,
    Status,
}

impl Column {
    /// All columns, in catalog order.
    pub const ALL: [Column; 8] = [
        Column::FirstName,
        Column::LastName,
        Column::Email,
        Column::Phone,
        Column::Department,
        Column::Position,
        Column::Location,
        Column::Status,
    ];

    /// Wire identifier used in configuration and result payloads.
    pub fn key(self) -> &'static str {
        match self {
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Email => "email",
            Column::Phone => "phone",
            Column::Department => "department",
            Column::Position => "position",
            Column::Location => "location",
            Column::Status => "status",
        }
    }

    /// Human-readable label for display surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Column::FirstName => "First Name",
            Column::LastName => "Last Name",
            Column::Email => "Email",
            Column::Phone => "Phone",
            Column::Department => "Department",
            Column::Position => "Position",
            Column::Location => "Location",
            Column::Status => "Status",
        }
    }
}

/// Ordered column selection for one tenant.
///
/// Order is significant: it defines presentation order in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub visible_columns: Vec<Column>,
}

impl ColumnConfig {
    /// Build a configuration, rejecting duplicate entries.
    pub fn new(visible_columns: Vec<Column>) -> Result<Self> {
        let mut seen = Vec::with_capacity(visible_columns.len());
        for column in &visible_columns {
            if seen.contains(column) {
                return Err(Error::InvalidInput(format!(
                    "duplicate column '{}' in configuration",
                    column.key()
                )));
            }
            seen.push(*column);
        }
        Ok(Self { visible_columns })
    }

    /// Tenants created without an explicit configuration see every column
    /// except phone.
    pub fn default_columns() -> Self {
        Self {
            visible_columns: vec![
                Column::FirstName,
                Column::LastName,
                Column::Email,
                Column::Department,
                Column::Position,
                Column::Location,
                Column::Status,
            ],
        }
    }
}

//! Tenant and employee records plus the store they live in.
//!
//! Every employee belongs to exactly one tenant, and the store only hands
//! out records through tenant-scoped accessors. Records are created by an
//! external administration process (or loaded from a JSON data file at
//! startup) and are read-only from the search core's perspective.

use crate::columns::{Column, ColumnConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use uuid::Uuid;

/// Employment status, a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Terminated,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
            EmployeeStatus::Terminated => "terminated",
            EmployeeStatus::OnLeave => "on_leave",
        }
    }

    /// Parse a query-parameter value; anything outside the enumeration is
    /// invalid input, never silently ignored.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            "terminated" => Ok(EmployeeStatus::Terminated),
            "on_leave" => Ok(EmployeeStatus::OnLeave),
            other => Err(Error::InvalidInput(format!(
                "invalid status '{}', expected one of: active, inactive, terminated, on_leave",
                other
            ))),
        }
    }
}

/// An isolated organizational unit. The id is a random UUID and is the sole
/// isolation boundary, so it must never be guessable or sequential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub location: String,
    pub status: EmployeeStatus,
}

impl Employee {
    /// Value of a single column for output projection.
    pub fn column_value(&self, column: Column) -> Value {
        match column {
            Column::FirstName => Value::String(self.first_name.clone()),
            Column::LastName => Value::String(self.last_name.clone()),
            Column::Email => Value::String(self.email.clone()),
            Column::Phone => self
                .phone
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
            Column::Department => Value::String(self.department.clone()),
            Column::Position => Value::String(self.position.clone()),
            Column::Location => Value::String(self.location.clone()),
            Column::Status => Value::String(self.status.as_str().to_string()),
        }
    }
}

/// Read side of the tenant/employee store.
///
/// Accessors take the tenant id first so no caller can reach employee
/// records without naming the tenant that owns them.
pub trait DirectoryStore: Send + Sync {
    fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>>;

    fn list_tenants(&self) -> Result<Vec<Tenant>>;

    /// Column configuration for a tenant, if one was set explicitly.
    fn column_config(&self, tenant_id: Uuid) -> Result<Option<ColumnConfig>>;

    /// All employee records owned by the tenant, unordered.
    fn employees_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Employee>>;
}

#[derive(Default)]
struct DirectoryInner {
    tenants: HashMap<Uuid, Tenant>,
    configs: HashMap<Uuid, ColumnConfig>,
    employees: HashMap<Uuid, Vec<Employee>>,
}

/// In-memory directory backend.
pub struct MemoryDirectory {
    inner: RwLock<DirectoryInner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DirectoryInner::default()),
        }
    }

    /// Load a directory from a JSON data file produced by the external
    /// administration process.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::StorageUnavailable(format!("cannot read directory file: {}", e))
        })?;
        let file: DirectoryFile = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("malformed directory file: {}", e)))?;

        let directory = Self::new();
        for seed in file.tenants {
            let tenant_id = seed.id.unwrap_or_else(Uuid::new_v4);
            directory.insert_tenant(Tenant {
                id: tenant_id,
                name: seed.name,
                is_active: seed.is_active,
            })?;
            if let Some(columns) = seed.visible_columns {
                directory.set_column_config(tenant_id, ColumnConfig::new(columns)?)?;
            }
            for employee in seed.employees {
                directory.insert_employee(Employee {
                    id: Uuid::new_v4(),
                    tenant_id,
                    first_name: employee.first_name,
                    last_name: employee.last_name,
                    email: employee.email,
                    phone: employee.phone,
                    department: employee.department,
                    position: employee.position,
                    location: employee.location,
                    status: employee.status,
                })?;
            }
        }
        Ok(directory)
    }

    pub fn insert_tenant(&self, tenant: Tenant) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        inner.tenants.insert(tenant.id, tenant);
        Ok(())
    }

    /// Convenience constructor used by administration tooling and tests.
    pub fn add_tenant(&self, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.insert_tenant(Tenant {
            id,
            name: name.to_string(),
            is_active: true,
        })?;
        Ok(id)
    }

    pub fn set_column_config(&self, tenant_id: Uuid, config: ColumnConfig) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        if !inner.tenants.contains_key(&tenant_id) {
            return Err(Error::TenantNotFound);
        }
        inner.configs.insert(tenant_id, config);
        Ok(())
    }

    pub fn insert_employee(&self, employee: Employee) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        if !inner.tenants.contains_key(&employee.tenant_id) {
            return Err(Error::TenantNotFound);
        }
        inner
            .employees
            .entry(employee.tenant_id)
            .or_default()
            .push(employee);
        Ok(())
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore for MemoryDirectory {
    fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        Ok(inner
            .tenants
            .get(&tenant_id)
            .filter(|t| t.is_active)
            .cloned())
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        let mut tenants: Vec<Tenant> =
            inner.tenants.values().filter(|t| t.is_active).cloned().collect();
        tenants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tenants)
    }

    fn column_config(&self, tenant_id: Uuid) -> Result<Option<ColumnConfig>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        Ok(inner.configs.get(&tenant_id).cloned())
    }

    fn employees_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Employee>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Internal("directory lock poisoned".to_string()))?;
        Ok(inner.employees.get(&tenant_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    tenants: Vec<TenantSeed>,
}

#[derive(Debug, Deserialize)]
struct TenantSeed {
    id: Option<Uuid>,
    name: String,
    #[serde(default = "default_active")]
    is_active: bool,
    visible_columns: Option<Vec<Column>>,
    #[serde(default)]
    employees: Vec<EmployeeSeed>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct EmployeeSeed {
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    department: String,
    position: String,
    location: String,
    status: EmployeeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_employee(tenant_id: Uuid, first: &str, last: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@example.com", first, last).to_lowercase(),
            phone: None,
            department: "Engineering".to_string(),
            position: "Engineer".to_string(),
            location: "Lisbon".to_string(),
            status: EmployeeStatus::Active,
        }
    }

    #[test]
    fn test_employee_requires_existing_tenant() {
        let directory = MemoryDirectory::new();
        let orphan = sample_employee(Uuid::new_v4(), "Ana", "Lee");
        assert!(matches!(
            directory.insert_employee(orphan),
            Err(Error::TenantNotFound)
        ));
    }

    #[test]
    fn test_employees_scoped_to_owner() {
        let directory = MemoryDirectory::new();
        let a = directory.add_tenant("Acme").unwrap();
        let b = directory.add_tenant("Globex").unwrap();
        directory
            .insert_employee(sample_employee(a, "Ana", "Lee"))
            .unwrap();

        assert_eq!(directory.employees_for_tenant(a).unwrap().len(), 1);
        assert!(directory.employees_for_tenant(b).unwrap().is_empty());
    }

    #[test]
    fn test_inactive_tenant_hidden() {
        let directory = MemoryDirectory::new();
        let id = Uuid::new_v4();
        directory
            .insert_tenant(Tenant {
                id,
                name: "Initech".to_string(),
                is_active: false,
            })
            .unwrap();

        assert!(directory.get_tenant(id).unwrap().is_none());
        assert!(directory.list_tenants().unwrap().is_empty());
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!(EmployeeStatus::parse("bogus").is_err());
        assert_eq!(
            EmployeeStatus::parse("on_leave").unwrap(),
            EmployeeStatus::OnLeave
        );
    }

    #[test]
    fn test_phone_projects_to_null_when_missing() {
        let employee = sample_employee(Uuid::new_v4(), "Ana", "Lee");
        assert_eq!(employee.column_value(Column::Phone), Value::Null);
    }
}

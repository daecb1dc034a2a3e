//! Response models for the Anomalo public API.
//!
//! Every field is optional on the wire: the import loop decides what a missing
//! field means, so deserialization itself never fails on an error payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    #[serde(default)]
    pub ping: Option<String>,
}

impl PingResponse {
    pub fn is_pong(&self) -> bool {
        self.ping.as_deref() == Some("pong")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of `get_table_information`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInformation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub warehouse: Option<Warehouse>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl TableInformation {
    /// `<warehouse.name>.<full_name>`, the name Terraform imports a table by
    pub fn qualified_name(&self) -> Option<String> {
        let warehouse = self.warehouse.as_ref()?.name.as_deref()?;
        let full_name = self.full_name.as_deref()?;
        Some(format!("{}.{}", warehouse, full_name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub check_id: i64,
    pub check_static_id: i64,
    pub check_type: String,
}

impl Check {
    /// System-generated checks carry a non-positive id
    pub fn is_user_defined(&self) -> bool {
        self.check_id > 0
    }
}

/// Result of `get_checks_for_table`
///
/// Entries stay raw so one malformed check cannot fail the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecksResponse {
    #[serde(default)]
    pub checks: Option<Vec<serde_json::Value>>,
}

impl ChecksResponse {
    /// Parsed checks and the number of entries that could not be parsed,
    /// or `None` when the response carries no `checks` field
    pub fn parse_checks(&self) -> Option<(Vec<Check>, usize)> {
        let entries = self.checks.as_ref()?;

        let mut checks = Vec::with_capacity(entries.len());
        let mut malformed = 0;
        for entry in entries {
            match serde_json::from_value::<Check>(entry.clone()) {
                Ok(check) => checks.push(check),
                Err(e) => {
                    log::warn!("Dropping malformed check {}: {}", entry, e);
                    malformed += 1;
                }
            }
        }

        Some((checks, malformed))
    }
}

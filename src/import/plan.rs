//! Terraform names and import ids for one Anomalo table and its checks.

use crate::anomalo::{Check, TableInformation};

pub const TABLE_RESOURCE_TYPE: &str = "anomalo_table";
pub const CHECK_RESOURCE_TYPE: &str = "anomalo_check";

/// Terraform resource name for a qualified table name (`a.b.c` -> `a__b__c`)
pub fn table_resource_name(qualified_name: &str) -> String {
    qualified_name.replace('.', "__")
}

/// `<resource_type>.<resource_name>`
pub fn state_reference(resource_type: &str, resource_name: &str) -> String {
    format!("{}.{}", resource_type, resource_name)
}

/// `resource "<type>" "<name>" {}`
fn empty_resource(resource_type: &str, resource_name: &str) -> String {
    format!("resource \"{}\" \"{}\" {{}}", resource_type, resource_name)
}

/// One resource to import: where it goes in state and how Terraform finds it
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceImport {
    pub resource_name: String,
    pub state_reference: String,
    pub import_id: String,
}

/// Everything needed to import a table and its user-defined checks
#[derive(Debug, Clone, PartialEq)]
pub struct TableImportPlan {
    pub table_id: i64,
    pub qualified_name: String,
    pub table: ResourceImport,
    pub checks: Vec<ResourceImport>,
}

impl TableImportPlan {
    /// Build the plan from API metadata.
    ///
    /// Returns `None` when the metadata lacks an id, warehouse name or full name.
    pub fn for_table(table: &TableInformation) -> Option<Self> {
        let table_id = table.id?;
        let qualified_name = table.qualified_name()?;
        let resource_name = table_resource_name(&qualified_name);

        Some(Self {
            table_id,
            table: ResourceImport {
                state_reference: state_reference(TABLE_RESOURCE_TYPE, &resource_name),
                resource_name,
                import_id: qualified_name.clone(),
            },
            qualified_name,
            checks: Vec::new(),
        })
    }

    /// Add the user-defined checks; system checks (id <= 0) are skipped
    pub fn with_checks(mut self, checks: &[Check]) -> Self {
        self.checks = checks
            .iter()
            .filter(|check| check.is_user_defined())
            .map(|check| {
                let resource_name = format!("{}-{}", check.check_type, check.check_static_id);
                ResourceImport {
                    state_reference: state_reference(CHECK_RESOURCE_TYPE, &resource_name),
                    resource_name,
                    import_id: format!("{},{}", self.table_id, check.check_static_id),
                }
            })
            .collect();
        self
    }

    /// File name for this table's definitions
    pub fn file_name(&self) -> String {
        format!("{}.tf", self.table.resource_name)
    }

    /// Empty resource blocks, enough for `terraform import` to target
    pub fn boilerplate(&self) -> String {
        std::iter::once(empty_resource(TABLE_RESOURCE_TYPE, &self.table.resource_name))
            .chain(
                self.checks
                    .iter()
                    .map(|check| empty_resource(CHECK_RESOURCE_TYPE, &check.resource_name)),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check state reference -> import id, in check order
    pub fn check_import_mapping(&self) -> Vec<(&str, &str)> {
        self.checks
            .iter()
            .map(|check| (check.state_reference.as_str(), check.import_id.as_str()))
            .collect()
    }

    /// Table first, then checks
    pub fn imports(&self) -> impl Iterator<Item = &ResourceImport> {
        std::iter::once(&self.table).chain(self.checks.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomalo::models::Warehouse;

    fn table(id: Option<i64>, warehouse: Option<&str>, full_name: Option<&str>) -> TableInformation {
        TableInformation {
            id,
            warehouse: warehouse.map(|name| Warehouse {
                id: Some(1),
                name: Some(name.to_string()),
            }),
            full_name: full_name.map(str::to_string),
        }
    }

    fn check(check_id: i64, static_id: i64, check_type: &str) -> Check {
        Check {
            check_id,
            check_static_id: static_id,
            check_type: check_type.to_string(),
        }
    }

    #[test]
    fn test_resource_name_derivation() {
        assert_eq!(table_resource_name("db.schema.table"), "db__schema__table");
        assert_eq!(
            state_reference(TABLE_RESOURCE_TYPE, &table_resource_name("db.schema.table")),
            "anomalo_table.db__schema__table"
        );
        assert_eq!(table_resource_name("no_dots"), "no_dots");
    }

    #[test]
    fn test_plan_for_table() {
        let plan = TableImportPlan::for_table(&table(Some(42), Some("db"), Some("schema.table"))).unwrap();

        assert_eq!(plan.table_id, 42);
        assert_eq!(plan.qualified_name, "db.schema.table");
        assert_eq!(plan.table.resource_name, "db__schema__table");
        assert_eq!(plan.table.state_reference, "anomalo_table.db__schema__table");
        assert_eq!(plan.table.import_id, "db.schema.table");
        assert_eq!(plan.file_name(), "db__schema__table.tf");
    }

    #[test]
    fn test_plan_requires_id_and_names() {
        assert!(TableImportPlan::for_table(&table(None, Some("db"), Some("s.t"))).is_none());
        assert!(TableImportPlan::for_table(&table(Some(1), None, Some("s.t"))).is_none());
        assert!(TableImportPlan::for_table(&table(Some(1), Some("db"), None)).is_none());
    }

    #[test]
    fn test_only_user_defined_checks_are_planned() {
        let plan = TableImportPlan::for_table(&table(Some(42), Some("db"), Some("s.t")))
            .unwrap()
            .with_checks(&[
                check(0, 1, "RowCountCheck"),
                check(17, 3, "NullCheck"),
                check(-4, 5, "FreshnessCheck"),
                check(18, 9, "UniqueCheck"),
            ]);

        assert_eq!(
            plan.check_import_mapping(),
            vec![
                ("anomalo_check.NullCheck-3", "42,3"),
                ("anomalo_check.UniqueCheck-9", "42,9"),
            ]
        );
        assert_eq!(
            plan.boilerplate(),
            "resource \"anomalo_table\" \"db__s__t\" {}\n\
             resource \"anomalo_check\" \"NullCheck-3\" {}\n\
             resource \"anomalo_check\" \"UniqueCheck-9\" {}"
        );
        assert!(!plan.boilerplate().contains("RowCountCheck"));
        assert!(!plan.boilerplate().contains("FreshnessCheck"));
    }

    #[test]
    fn test_boilerplate_without_checks() {
        let plan = TableImportPlan::for_table(&table(Some(7), Some("wh"), Some("s.t")))
            .unwrap()
            .with_checks(&[check(0, 1, "RowCountCheck")]);

        assert_eq!(plan.boilerplate(), "resource \"anomalo_table\" \"wh__s__t\" {}");
        assert!(plan.check_import_mapping().is_empty());
    }

    #[test]
    fn test_imports_table_first() {
        let plan = TableImportPlan::for_table(&table(Some(42), Some("db"), Some("s.t")))
            .unwrap()
            .with_checks(&[check(2, 8, "NullCheck")]);

        let references: Vec<&str> = plan.imports().map(|i| i.state_reference.as_str()).collect();
        assert_eq!(references, vec!["anomalo_table.db__s__t", "anomalo_check.NullCheck-8"]);
    }
}

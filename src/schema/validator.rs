//! Catalog validation: referential integrity and delete-policy consistency.

use super::{ColumnType, DeletePolicy, EntityDef, ENUMS, ID};
use crate::error::SchemaError;
use std::collections::HashSet;

/// Checks a catalog before it is used for DDL or by a store.
///
/// References must point at tables declared earlier, so catalog order is a valid creation order.
pub fn validate(catalog: &[&'static EntityDef]) -> Result<(), SchemaError> {
    let mut seen_tables: HashSet<&str> = HashSet::new();

    for entity in catalog {
        if !seen_tables.insert(entity.table) {
            return Err(SchemaError::DuplicateTable(entity.table.to_string()));
        }

        let mut seen_columns: HashSet<String> = HashSet::new();
        seen_columns.insert(ID.to_string());
        for column in entity.columns {
            if !seen_columns.insert(column.db_name()) {
                return Err(SchemaError::DuplicateColumn {
                    table: entity.table.to_string(),
                    column: column.name.to_string(),
                });
            }

            if let ColumnType::Enum(def) = column.ty {
                if !ENUMS.iter().any(|e| e.name == def.name) {
                    return Err(SchemaError::MissingReference {
                        kind: "enum",
                        id: def.name.to_string(),
                        from: format!("{}.{}", entity.table, column.name),
                    });
                }
            }

            if let Some(fk) = column.references {
                if fk.target != entity.table && !seen_tables.contains(fk.target) {
                    return Err(SchemaError::MissingReference {
                        kind: "table",
                        id: fk.target.to_string(),
                        from: format!("{}.{}", entity.table, column.name),
                    });
                }
                if fk.on_delete == DeletePolicy::SetNull && !column.nullable {
                    return Err(SchemaError::InvalidPolicy {
                        table: entity.table.to_string(),
                        column: column.name.to_string(),
                        reason: "SET NULL requires a nullable column".into(),
                    });
                }
                if column.ty != ColumnType::BigInt {
                    return Err(SchemaError::InvalidPolicy {
                        table: entity.table.to_string(),
                        column: column.name.to_string(),
                        reason: "references must hold a BIGINT identity".into(),
                    });
                }
            }
        }
    }

    Ok(())
}

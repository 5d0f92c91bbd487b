//! Field-descriptor tables describing how each entity kind maps onto a table.
//!
//! Column names from these descriptors are the only identifiers ever
//! interpolated into SQL; every caller-supplied column name is resolved
//! against the schema first.

use crate::collection::CollectionKind;

use super::{FieldValue, RepositoryError, Result};

pub const ID: &str = "id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const TM_CREATE: &str = "tm_create";
pub const TM_UPDATE: &str = "tm_update";
pub const TM_DELETE: &str = "tm_delete";

/// Columns that targeted updates may never touch.
pub const IMMUTABLE_COLUMNS: [&str; 3] = [ID, CUSTOMER_ID, TM_CREATE];

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 16-byte binary identifier.
    Id,
    Text,
    Integer,
    /// Text in the sortable timestamp format.
    Timestamp,
    /// JSON document.
    Collection(CollectionKind),
}

impl ColumnType {
    /// Returns true if the value can be stored in a column of this type.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (_, FieldValue::Null)
                | (Self::Id, FieldValue::Id(_))
                | (Self::Text, FieldValue::Text(_))
                | (Self::Integer, FieldValue::Integer(_))
                | (Self::Timestamp, FieldValue::Timestamp(_))
                | (Self::Collection(_), FieldValue::Json(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn id(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Id }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Integer }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Timestamp }
    }

    pub const fn list(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Collection(CollectionKind::List) }
    }

    pub const fn set(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Collection(CollectionKind::Set) }
    }

    pub const fn map(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Collection(CollectionKind::Map) }
    }

    /// The collection kind, if this is a collection column.
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self.ty {
            ColumnType::Collection(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Describes one entity kind: its table, cache namespace and columns.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    /// Name used in errors and logs, e.g. `"Conference"`.
    pub entity_type: &'static str,
    pub table: &'static str,
    /// Namespace of the kind's cache keys.
    pub cache_prefix: &'static str,
    pub columns: &'static [Column],
    /// Columns usable for secondary lookups (and cached under their own keys).
    pub secondary_keys: &'static [&'static str],
}

impl EntitySchema {
    /// Resolves a column by name.
    pub fn column(&self, name: &str) -> Result<&'static Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "unknown column '{name}' for {}",
                    self.entity_type
                ))
            })
    }

    /// Resolves a column and checks the value fits it.
    pub fn check_value(&self, name: &str, value: &FieldValue) -> Result<&'static Column> {
        let column = self.column(name)?;
        if column.ty.accepts(value) {
            Ok(column)
        } else {
            Err(RepositoryError::InvalidData(format!(
                "value {value:?} does not fit column '{name}' of {}",
                self.entity_type
            )))
        }
    }

    /// Resolves a collection column.
    pub fn collection(&self, name: &str) -> Result<(&'static Column, CollectionKind)> {
        let column = self.column(name)?;
        column
            .collection_kind()
            .map(|kind| (column, kind))
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "column '{name}' of {} is not a collection",
                    self.entity_type
                ))
            })
    }

    pub fn is_secondary_key(&self, name: &str) -> bool {
        self.secondary_keys.contains(&name)
    }

    /// Rejects schemas missing the columns every repository operation relies on.
    pub fn check_conventions(&self) -> Result<()> {
        let required = [
            (ID, ColumnType::Id),
            (CUSTOMER_ID, ColumnType::Id),
            (TM_CREATE, ColumnType::Timestamp),
            (TM_UPDATE, ColumnType::Timestamp),
            (TM_DELETE, ColumnType::Timestamp),
        ];
        for (name, ty) in required {
            let column = self.column(name)?;
            if column.ty != ty {
                return Err(RepositoryError::InvalidData(format!(
                    "column '{name}' of {} must be {ty:?}",
                    self.entity_type
                )));
            }
        }
        for key in self.secondary_keys {
            self.column(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    static COLUMNS: [Column; 7] = [
        Column::id(ID),
        Column::id(CUSTOMER_ID),
        Column::text("name"),
        Column::set("member_ids"),
        Column::timestamp(TM_CREATE),
        Column::timestamp(TM_UPDATE),
        Column::timestamp(TM_DELETE),
    ];

    static SCHEMA: EntitySchema = EntitySchema {
        entity_type: "Widget",
        table: "widgets",
        cache_prefix: "widget",
        columns: &COLUMNS,
        secondary_keys: &["name"],
    };

    #[test]
    fn test_column_lookup() {
        assert_eq!(SCHEMA.column("name").unwrap().ty, ColumnType::Text);
        assert!(matches!(
            SCHEMA.column("name; DROP TABLE widgets"),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_check_value() {
        assert!(SCHEMA.check_value(ID, &FieldValue::Id(Uuid::nil())).is_ok());
        assert!(SCHEMA.check_value("name", &FieldValue::Null).is_ok());
        assert!(matches!(
            SCHEMA.check_value("name", &FieldValue::Integer(1)),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_collection_lookup() {
        let (column, kind) = SCHEMA.collection("member_ids").unwrap();
        assert_eq!(column.name, "member_ids");
        assert_eq!(kind, CollectionKind::Set);
        assert!(SCHEMA.collection("name").is_err());
    }

    #[test]
    fn test_conventions() {
        assert!(SCHEMA.check_conventions().is_ok());
        assert!(SCHEMA.is_secondary_key("name"));
        assert!(!SCHEMA.is_secondary_key(ID));

        static BROKEN: EntitySchema = EntitySchema {
            entity_type: "Broken",
            table: "broken",
            cache_prefix: "broken",
            columns: &[Column::id(ID)],
            secondary_keys: &[],
        };
        assert!(BROKEN.check_conventions().is_err());
    }
}

//! Read-only schema snapshots produced by the introspector

use serde::Serialize;

/// Migration history table used by the migration runner.
pub const DEFAULT_MIGRATION_TABLE: &str = "kysely_migration";

/// Migration lock table used by the migration runner.
pub const DEFAULT_MIGRATION_LOCK_TABLE: &str = "kysely_migration_lock";

/// Options for [`SqliteIntrospector::get_tables`](crate::SqliteIntrospector::get_tables).
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseMetadataOptions {
   /// Include the migration runner's bookkeeping tables.
   ///
   /// Default: false
   pub with_internal_kysely_tables: bool,
}

/// A schema namespace. SQLite has none, so introspection never returns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMetadata {
   pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
   pub name: String,
   /// Declared type as reported by the engine, possibly empty
   pub data_type: String,
   pub is_nullable: bool,
   pub is_auto_incrementing: bool,
   pub has_default_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
   pub name: String,
   pub is_view: bool,
   /// Columns in declaration order
   pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
   pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
      self.columns.iter().find(|column| column.name == name)
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseMetadata {
   pub tables: Vec<TableMetadata>,
}

//! # sqlx-sqlite-dialect
//!
//! SQLite dialect for query-building layers that expect a driver, a compiler,
//! a capability adapter and an introspector.
//!
//! ## Core Types
//!
//! - **[`SqliteDialect`]**: Creates the pieces below from one
//!   [`SqliteDriverConfig`](sqlx_sqlite_driver::SqliteDriverConfig)
//! - **[`SqliteQueryCompiler`]**: `?` placeholders, `"` quoting,
//!   `autoincrement`
//! - **[`SqliteAdapter`]**: Capability flags (no transactional DDL)
//! - **[`SqliteIntrospector`]**: Tables and columns, including a best-effort
//!   autoincrement flag
//!
//! The driver itself (single connection, FIFO lock, transactions, streaming)
//! lives in [`sqlx_sqlite_driver`].

mod adapter;
mod compiler;
mod dialect;
mod error;
mod introspector;
mod metadata;

pub use adapter::{DialectAdapter, SqliteAdapter};
pub use compiler::{AUTO_INCREMENT_KEYWORD, QueryBuilder, QueryCompiler, SqliteQueryCompiler};
pub use dialect::SqliteDialect;
pub use error::{Error, Result};
pub use introspector::{SqliteIntrospector, find_auto_increment_column};
pub use metadata::{
   ColumnMetadata, DEFAULT_MIGRATION_LOCK_TABLE, DEFAULT_MIGRATION_TABLE, DatabaseMetadata,
   DatabaseMetadataOptions, SchemaMetadata, TableMetadata,
};

pub use sqlx_sqlite_driver;

//! Capability flags reported to the query layer

use std::future::Future;

use sqlx_sqlite_driver::DatabaseConnection;

use crate::Result;

/// What a dialect supports, plus its migration-lock hooks.
pub trait DialectAdapter: Send + Sync {
   /// `create table if not exists` and friends.
   fn supports_create_if_not_exists(&self) -> bool;

   /// Whether schema changes roll back with the surrounding transaction.
   fn supports_transactional_ddl(&self) -> bool;

   /// `returning` clauses on insert, update and delete.
   fn supports_returning(&self) -> bool;

   /// Called by a migration runner before it starts, on the connection it holds.
   fn acquire_migration_lock(
      &self,
      connection: &mut DatabaseConnection,
   ) -> impl Future<Output = Result<()>> + Send;

   fn release_migration_lock(
      &self,
      connection: &mut DatabaseConnection,
   ) -> impl Future<Output = Result<()>> + Send;
}

/// Capabilities of SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl DialectAdapter for SqliteAdapter {
   fn supports_create_if_not_exists(&self) -> bool {
      true
   }

   fn supports_transactional_ddl(&self) -> bool {
      false
   }

   fn supports_returning(&self) -> bool {
      true
   }

   // The migration runner already holds the only connection from acquire to
   // release, so nobody else can run statements in between.
   async fn acquire_migration_lock(&self, _connection: &mut DatabaseConnection) -> Result<()> {
      Ok(())
   }

   async fn release_migration_lock(&self, _connection: &mut DatabaseConnection) -> Result<()> {
      Ok(())
   }
}

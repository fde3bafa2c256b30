//! Lifecycle and transactions for the single SQLite connection

use std::fmt;

use parking_lot::Mutex;
use sqlx::Connection;
use tracing::{debug, warn};

use crate::config::SqliteDriverConfig;
use crate::connection::DatabaseConnection;
use crate::lock::{ConnectionLock, LockGuard};
use crate::query::TransactionCommand;
use crate::{Error, Result};

/// Exclusive access to the driver's connection. Dropping it releases the lock.
pub type ConnectionGuard<'a> = LockGuard<'a, DatabaseConnection>;

/// Driver owning one SQLite handle and serializing every caller onto it.
///
/// ## Lifecycle
///
/// ```text
/// new(config) ──► init ──► acquire_connection ⇄ release_connection ──► destroy
/// ```
///
/// - **`init`** wraps the handle in the one [`DatabaseConnection`] and runs the
///   `on_create_connection` hook. It takes `&mut self`, so it finishes before
///   the driver can be shared.
/// - **`acquire_connection`** waits, in arrival order, for the connection.
/// - **Transactions** are plain `begin` / `commit` / `rollback` statements on
///   the held connection. The lock, not the transaction, keeps other callers
///   out.
/// - **`destroy`** closes the handle.
pub struct SqliteDriver {
   /// Present until `init` (or `destroy`) consumes it
   config: Mutex<Option<SqliteDriverConfig>>,

   /// Present after a successful `init`
   lock: Option<ConnectionLock<DatabaseConnection>>,
}

impl SqliteDriver {
   pub fn new(config: SqliteDriverConfig) -> Self {
      Self {
         config: Mutex::new(Some(config)),
         lock: None,
      }
   }

   /// Wrap the native handle and run the creation hook.
   ///
   /// If the hook fails, its error is returned and the handle is closed.
   pub async fn init(&mut self) -> Result<()> {
      let Some(config) = self.config.get_mut().take() else {
         return Err(if self.lock.is_some() {
            Error::AlreadyInitialized
         } else {
            Error::ConnectionClosed
         });
      };

      let mut connection = DatabaseConnection::new(config.database, config.row_iteration);

      if let Some(hook) = config.on_create_connection {
         debug!("Running on_create_connection hook");
         hook(&mut connection).await?;
      }

      self.lock = Some(ConnectionLock::new(connection));
      debug!(
         row_iteration = config.row_iteration,
         "SQLite driver initialized"
      );
      Ok(())
   }

   pub fn is_initialized(&self) -> bool {
      self.lock.is_some()
   }

   /// Wait until the caller is the only holder of the connection.
   ///
   /// Fails with [`Error::NotInitialized`] before `init`, and with
   /// [`Error::ConnectionClosed`] once the handle is gone (after `destroy`,
   /// or after `init` failed in the creation hook).
   pub async fn acquire_connection(&self) -> Result<ConnectionGuard<'_>> {
      let Some(lock) = &self.lock else {
         let configured = self.config.lock().is_some();
         return Err(if configured {
            Error::NotInitialized
         } else {
            Error::ConnectionClosed
         });
      };
      lock.acquire().await
   }

   /// Hand the connection to the next waiter.
   ///
   /// Equivalent to dropping the guard.
   pub fn release_connection(&self, connection: ConnectionGuard<'_>) {
      drop(connection);
   }

   pub async fn begin_transaction(&self, connection: &mut DatabaseConnection) -> Result<()> {
      self.run(connection, TransactionCommand::Begin).await
   }

   pub async fn commit_transaction(&self, connection: &mut DatabaseConnection) -> Result<()> {
      self.run(connection, TransactionCommand::Commit).await
   }

   pub async fn rollback_transaction(&self, connection: &mut DatabaseConnection) -> Result<()> {
      self.run(connection, TransactionCommand::Rollback).await
   }

   async fn run(
      &self,
      connection: &mut DatabaseConnection,
      command: TransactionCommand,
   ) -> Result<()> {
      connection.execute_query(&command.compile()).await?;
      debug!(statement = command.as_sql(), "Transaction statement executed");
      Ok(())
   }

   /// Close the native handle.
   ///
   /// Safe to call more than once and before `init`. Pending acquirers fail
   /// with [`Error::ConnectionClosed`]. Close errors are logged, not returned.
   /// Must not be called while a guard is held; if it is, the handle is
   /// dropped when that guard is released.
   pub async fn destroy(&self) {
      let handle = match &self.lock {
         Some(lock) => lock.close().map(DatabaseConnection::into_inner),
         None => self.config.lock().take().map(|config| config.database),
      };

      let Some(handle) = handle else {
         debug!("SQLite driver destroyed, no idle handle to close");
         return;
      };

      match handle.close().await {
         Ok(()) => debug!("SQLite driver destroyed"),
         Err(e) => warn!(error = %e, "Failed to close SQLite connection"),
      }
   }
}

impl fmt::Debug for SqliteDriver {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("SqliteDriver")
         .field("initialized", &self.lock.is_some())
         .field(
            "held",
            &self.lock.as_ref().is_some_and(ConnectionLock::is_held),
         )
         .finish_non_exhaustive()
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::CompiledQuery;

   async fn driver() -> SqliteDriver {
      let mut driver = SqliteDriver::new(SqliteDriverConfig::in_memory().await.unwrap());
      driver.init().await.unwrap();
      driver
   }

   #[tokio::test]
   async fn test_acquire_before_init_fails() {
      let driver = SqliteDriver::new(SqliteDriverConfig::in_memory().await.unwrap());
      assert!(!driver.is_initialized());
      assert!(matches!(
         driver.acquire_connection().await,
         Err(Error::NotInitialized)
      ));
   }

   #[tokio::test]
   async fn test_init_twice_fails() {
      let mut driver = driver().await;
      assert!(matches!(
         driver.init().await,
         Err(Error::AlreadyInitialized)
      ));
   }

   #[tokio::test]
   async fn test_init_after_destroy_fails() {
      let mut driver = SqliteDriver::new(SqliteDriverConfig::in_memory().await.unwrap());
      driver.destroy().await;
      assert!(matches!(driver.init().await, Err(Error::ConnectionClosed)));
   }

   #[tokio::test]
   async fn test_acquire_returns_the_same_connection() {
      let driver = driver().await;

      let mut conn = driver.acquire_connection().await.unwrap();
      conn
         .execute_query(&CompiledQuery::raw("create temp table marker (x)"))
         .await
         .unwrap();
      driver.release_connection(conn);

      // Temp tables are per-connection, so seeing it proves reuse
      let mut conn = driver.acquire_connection().await.unwrap();
      let result = conn
         .execute_query(&CompiledQuery::raw("select count(*) as n from marker"))
         .await
         .unwrap();
      assert_eq!(result.rows[0]["n"].as_integer(), Some(0));
   }

   #[tokio::test]
   async fn test_destroy_is_idempotent() {
      let driver = driver().await;
      driver.destroy().await;
      driver.destroy().await;

      assert!(matches!(
         driver.acquire_connection().await,
         Err(Error::ConnectionClosed)
      ));
   }

   #[tokio::test]
   async fn test_destroy_before_init() {
      let driver = SqliteDriver::new(SqliteDriverConfig::in_memory().await.unwrap());
      driver.destroy().await;
      driver.destroy().await;

      assert!(matches!(
         driver.acquire_connection().await,
         Err(Error::ConnectionClosed)
      ));
   }

   #[tokio::test]
   async fn test_debug_reports_state() {
      let driver = driver().await;
      assert_eq!(
         format!("{driver:?}"),
         "SqliteDriver { initialized: true, held: false, .. }"
      );

      let _conn = driver.acquire_connection().await.unwrap();
      assert!(format!("{driver:?}").contains("held: true"));
   }
}

//! Configuration for the SQLite driver

use std::fmt;
use std::path::Path;

use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::{DatabaseConnection, Result};

/// One-shot hook run against the freshly wrapped connection before any other
/// statement reaches it.
pub type OnCreateConnection =
   Box<dyn for<'c> FnOnce(&'c mut DatabaseConnection) -> BoxFuture<'c, Result<()>> + Send>;

/// Configuration for [`SqliteDriver`](crate::SqliteDriver)
///
/// # Examples
///
/// ```no_run
/// use sqlx_sqlite_driver::{CompiledQuery, SqliteDriverConfig};
///
/// # async fn run() -> sqlx_sqlite_driver::Result<()> {
/// let config = SqliteDriverConfig::open("app.db")
///    .await?
///    .with_on_create_connection(|conn| {
///       Box::pin(async move {
///          conn.execute_query(&CompiledQuery::raw("pragma foreign_keys = on")).await?;
///          Ok(())
///       })
///    });
/// # Ok(())
/// # }
/// ```
pub struct SqliteDriverConfig {
   /// The native handle. Owned by the driver from `init` until `destroy`.
   pub(crate) database: SqliteConnection,

   pub(crate) on_create_connection: Option<OnCreateConnection>,

   /// Whether the engine can hand out rows one at a time.
   ///
   /// Default: true
   pub(crate) row_iteration: bool,
}

impl SqliteDriverConfig {
   /// Use an already opened SQLite connection as the native handle.
   pub fn new(database: SqliteConnection) -> Self {
      Self {
         database,
         on_create_connection: None,
         row_iteration: true,
      }
   }

   /// Open (creating if missing) the database file at `path`.
   pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
      let database = SqliteConnectOptions::new()
         .filename(path)
         .create_if_missing(true)
         .connect()
         .await?;

      Ok(Self::new(database))
   }

   /// Open a private in-memory database.
   pub async fn in_memory() -> Result<Self> {
      let database = SqliteConnection::connect("sqlite::memory:").await?;
      Ok(Self::new(database))
   }

   /// Run `hook` once with the connection during `init`.
   pub fn with_on_create_connection<F>(mut self, hook: F) -> Self
   where
      F: for<'c> FnOnce(&'c mut DatabaseConnection) -> BoxFuture<'c, Result<()>> + Send + 'static,
   {
      self.on_create_connection = Some(Box::new(hook));
      self
   }

   /// Declare whether the engine supports row-at-a-time iteration.
   ///
   /// With `false`, `stream_query` fails with `UnsupportedFeature`.
   pub fn with_row_iteration(mut self, enabled: bool) -> Self {
      self.row_iteration = enabled;
      self
   }

   pub fn row_iteration(&self) -> bool {
      self.row_iteration
   }
}

impl fmt::Debug for SqliteDriverConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("SqliteDriverConfig")
         .field("database", &self.database)
         .field("on_create_connection", &self.on_create_connection.is_some())
         .field("row_iteration", &self.row_iteration)
         .finish()
   }
}

//! Factory tying the SQLite pieces together

use std::sync::Arc;

use sqlx_sqlite_driver::{SqliteDriver, SqliteDriverConfig};

use crate::adapter::SqliteAdapter;
use crate::compiler::SqliteQueryCompiler;
use crate::introspector::SqliteIntrospector;
use crate::{Error, Result};

/// Entry point for a query layer talking to SQLite.
///
/// Hands out the driver (once, since it takes ownership of the native
/// handle), the compiler tokens, the capability adapter and an introspector.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sqlx_sqlite_dialect::{DatabaseMetadataOptions, SqliteDialect};
/// use sqlx_sqlite_driver::SqliteDriverConfig;
///
/// # async fn run() -> sqlx_sqlite_dialect::Result<()> {
/// let mut dialect = SqliteDialect::new(SqliteDriverConfig::open("db.sqlite").await?);
///
/// let mut driver = dialect.create_driver()?;
/// driver.init().await?;
/// let driver = Arc::new(driver);
///
/// let introspector = dialect.create_introspector(Arc::clone(&driver));
/// let metadata = introspector
///    .get_metadata(DatabaseMetadataOptions::default())
///    .await?;
/// println!("{} tables", metadata.tables.len());
///
/// driver.destroy().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteDialect {
   config: Option<SqliteDriverConfig>,
}

impl SqliteDialect {
   pub fn new(config: SqliteDriverConfig) -> Self {
      Self {
         config: Some(config),
      }
   }

   /// Build the driver. It still needs `init` before use.
   pub fn create_driver(&mut self) -> Result<SqliteDriver> {
      self
         .config
         .take()
         .map(SqliteDriver::new)
         .ok_or(Error::DriverAlreadyCreated)
   }

   pub fn create_query_compiler(&self) -> SqliteQueryCompiler {
      SqliteQueryCompiler
   }

   pub fn create_adapter(&self) -> SqliteAdapter {
      SqliteAdapter
   }

   pub fn create_introspector(&self, driver: Arc<SqliteDriver>) -> SqliteIntrospector {
      SqliteIntrospector::new(driver)
   }
}

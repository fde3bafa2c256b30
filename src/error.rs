/// Result type alias for dialect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the SQLite dialect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from the driver, including engine errors passed through as-is.
   #[error(transparent)]
   Driver(#[from] sqlx_sqlite_driver::Error),

   /// `create_driver` was called a second time on the same dialect.
   #[error("a driver has already been created from this dialect")]
   DriverAlreadyCreated,

   /// A catalog query returned a value of an unexpected type.
   #[error("catalog column '{column}' did not contain {expected}")]
   UnexpectedCatalogValue {
      column: &'static str,
      expected: &'static str,
   },
}

impl From<sqlx::Error> for Error {
   fn from(error: sqlx::Error) -> Self {
      Error::Driver(error.into())
   }
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// Engine errors carrying an SQLite result code map to `SQLITE_<code>`.
   pub fn error_code(&self) -> String {
      use sqlx_sqlite_driver::Error as DriverError;

      match self {
         Error::Driver(DriverError::Sqlx(e)) => engine_code(e),
         Error::Driver(DriverError::UnsupportedFeature(_)) => "UNSUPPORTED_FEATURE".to_string(),
         Error::Driver(DriverError::NotInitialized) => "NOT_INITIALIZED".to_string(),
         Error::Driver(DriverError::AlreadyInitialized) => "ALREADY_INITIALIZED".to_string(),
         Error::Driver(DriverError::ConnectionClosed) => "CONNECTION_CLOSED".to_string(),
         Error::DriverAlreadyCreated => "DRIVER_ALREADY_CREATED".to_string(),
         Error::UnexpectedCatalogValue { .. } => "UNEXPECTED_CATALOG_VALUE".to_string(),
      }
   }
}

fn engine_code(error: &sqlx::Error) -> String {
   if let Some(code) = error.as_database_error().and_then(|db_err| db_err.code()) {
      return format!("SQLITE_{}", code);
   }
   "SQLX_ERROR".to_string()
}

//! Error types for sqlx-sqlite-driver

use thiserror::Error;

/// Errors that may occur when working with sqlx-sqlite-driver
#[derive(Error, Debug)]
pub enum Error {
   /// Error raised by the SQLite engine while preparing, binding or executing
   /// a statement. Passed through untouched.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// The engine build lacks a capability the caller asked for
   #[error("{0} is not supported by this SQLite engine")]
   UnsupportedFeature(&'static str),

   /// `acquire_connection` was called before `init`
   #[error("driver has not been initialized")]
   NotInitialized,

   /// `init` was called a second time
   #[error("driver has already been initialized")]
   AlreadyInitialized,

   /// The driver has been destroyed and the connection closed
   #[error("connection has been closed")]
   ConnectionClosed,
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

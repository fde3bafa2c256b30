//! # sqlx-sqlite-driver
//!
//! Drives a single SQLx SQLite connection on behalf of any number of
//! concurrent callers.
//!
//! ## Core Types
//!
//! - **[`SqliteDriver`]**: Owns the native handle; `init`, `acquire_connection`,
//!   transactions, `release_connection`, `destroy`
//! - **[`DatabaseConnection`]**: The one logical connection; `execute_query`
//!   and `stream_query`
//! - **[`ConnectionLock`]**: FIFO lock that hands the connection from holder
//!   to holder
//! - **[`SqliteDriverConfig`]**: Native handle plus optional creation hook
//! - **[`CompiledQuery`]** / **[`QueryResult`]** / **[`Value`]**: Statement
//!   and row model
//! - **[`Error`]**: Error type for driver operations
//!
//! ## Architecture
//!
//! - **One connection**: No pool. Every statement runs on the same handle.
//! - **FIFO access**: Callers are granted the connection strictly in the order
//!   they asked for it
//! - **Raw transactions**: `begin` / `commit` / `rollback` issued as ordinary
//!   statements by whoever holds the connection
//! - **Streaming**: Rows pulled one at a time from the engine when it supports
//!   incremental iteration
//!
//! ## Usage
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use sqlx_sqlite_driver::{CompiledQuery, SqliteDriver, SqliteDriverConfig, Value};
//!
//! #[tokio::main]
//! async fn main() -> sqlx_sqlite_driver::Result<()> {
//!    let mut driver = SqliteDriver::new(SqliteDriverConfig::open("pets.db").await?);
//!    driver.init().await?;
//!
//!    let mut conn = driver.acquire_connection().await?;
//!    driver.begin_transaction(&mut conn).await?;
//!    conn
//!       .execute_query(&CompiledQuery::new(
//!          "insert into pet (name) values (?)",
//!          vec![Value::from("Fluffy")],
//!       ))
//!       .await?;
//!    driver.commit_transaction(&mut conn).await?;
//!
//!    let query = CompiledQuery::raw("select * from pet");
//!    let mut rows = conn.stream_query(&query)?;
//!    while let Some(chunk) = rows.try_next().await? {
//!       println!("{:?}", chunk.rows[0]);
//!    }
//!    drop(rows);
//!
//!    driver.release_connection(conn);
//!    driver.destroy().await;
//!    Ok(())
//! }
//! ```

mod config;
mod connection;
mod driver;
mod error;
mod lock;
mod query;
mod value;

// Re-export public types
pub use config::{OnCreateConnection, SqliteDriverConfig};
pub use connection::{DatabaseConnection, QueryStream};
pub use driver::{ConnectionGuard, SqliteDriver};
pub use error::{Error, Result};
pub use lock::{ConnectionLock, LockGuard};
pub use query::{CompiledQuery, QueryResult, TransactionCommand};
pub use value::{Row, Value};

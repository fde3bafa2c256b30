//! The single logical connection and its streaming cursor

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, FusedStream, Stream};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Executor, Sqlite};
use tracing::trace;

use crate::query::{CompiledQuery, QueryResult};
use crate::value::{bind_value, decode_row};
use crate::{Error, Result};

/// Wrapper over the native SQLite handle through which every statement runs.
///
/// Exactly one exists per driver. It is created by
/// [`SqliteDriver::init`](crate::SqliteDriver::init) and reached through a
/// [`ConnectionGuard`](crate::ConnectionGuard) afterwards.
#[derive(Debug)]
pub struct DatabaseConnection {
   conn: SqliteConnection,
   row_iteration: bool,
}

impl DatabaseConnection {
   pub(crate) fn new(conn: SqliteConnection, row_iteration: bool) -> Self {
      Self {
         conn,
         row_iteration,
      }
   }

   pub(crate) fn into_inner(self) -> SqliteConnection {
      self.conn
   }

   /// Execute a statement and materialize all of its rows.
   ///
   /// Parameters are bound positionally in order. Engine errors are returned
   /// as-is.
   pub async fn execute_query(&mut self, compiled: &CompiledQuery) -> Result<QueryResult> {
      trace!(sql = compiled.sql(), params = compiled.parameters().len(), "executing query");

      let rows = (&mut self.conn).fetch_all(bind_all(compiled)).await?;
      let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

      Ok(QueryResult { rows })
   }

   /// Execute a statement and yield its rows lazily, one row per result.
   ///
   /// Fails before anything runs when the engine cannot iterate rows
   /// incrementally. The stream borrows this connection, so it has to be
   /// drained or dropped before the guard can be released.
   pub fn stream_query<'c>(&'c mut self, compiled: &'c CompiledQuery) -> Result<QueryStream<'c>> {
      if !self.row_iteration {
         return Err(Error::UnsupportedFeature("row-at-a-time iteration (streaming queries)"));
      }

      trace!(sql = compiled.sql(), "streaming query");
      Ok(QueryStream {
         rows: (&mut self.conn).fetch(bind_all(compiled)),
         finished: false,
      })
   }

   /// Whether this connection can serve [`stream_query`](Self::stream_query).
   pub fn supports_streaming(&self) -> bool {
      self.row_iteration
   }
}

fn bind_all(compiled: &CompiledQuery) -> Query<'_, Sqlite, SqliteArguments<'_>> {
   let mut query = sqlx::query(compiled.sql());
   for value in compiled.parameters() {
      query = bind_value(query, value);
   }
   query
}

/// Single-pass row cursor returned by [`DatabaseConnection::stream_query`].
///
/// Yields one [`QueryResult`] holding exactly one row per item. Once it
/// returns `None` or an error it stays finished; it cannot be restarted.
#[must_use = "streams do nothing unless polled"]
pub struct QueryStream<'c> {
   rows: BoxStream<'c, std::result::Result<SqliteRow, sqlx::Error>>,
   finished: bool,
}

impl Stream for QueryStream<'_> {
   type Item = Result<QueryResult>;

   fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
      if self.finished {
         return Poll::Ready(None);
      }

      match self.rows.as_mut().poll_next(cx) {
         Poll::Ready(Some(Ok(row))) => {
            Poll::Ready(Some(decode_row(&row).map(QueryResult::single)))
         }
         Poll::Ready(Some(Err(e))) => {
            self.finished = true;
            Poll::Ready(Some(Err(e.into())))
         }
         Poll::Ready(None) => {
            self.finished = true;
            Poll::Ready(None)
         }
         Poll::Pending => Poll::Pending,
      }
   }
}

impl FusedStream for QueryStream<'_> {
   fn is_terminated(&self) -> bool {
      self.finished
   }
}

//! Compiled statements and their results

use serde::Serialize;

use crate::value::{Row, Value};

/// SQL text plus its ordered positional parameters.
///
/// Produced by a query compiler and consumed, never mutated, by
/// [`DatabaseConnection`](crate::DatabaseConnection).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
   sql: String,
   parameters: Vec<Value>,
}

impl CompiledQuery {
   pub fn new(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
      Self {
         sql: sql.into(),
         parameters,
      }
   }

   /// A statement without parameters, e.g. `begin`.
   pub fn raw(sql: impl Into<String>) -> Self {
      Self::new(sql, Vec::new())
   }

   pub fn sql(&self) -> &str {
      &self.sql
   }

   pub fn parameters(&self) -> &[Value] {
      &self.parameters
   }
}

/// Rows returned by a statement. Row shape is whatever the statement selects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
   pub rows: Vec<Row>,
}

impl QueryResult {
   pub(crate) fn single(row: Row) -> Self {
      Self { rows: vec![row] }
   }
}

/// The raw statements that drive a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCommand {
   Begin,
   Commit,
   Rollback,
}

impl TransactionCommand {
   pub const fn as_sql(&self) -> &'static str {
      match self {
         TransactionCommand::Begin => "begin",
         TransactionCommand::Commit => "commit",
         TransactionCommand::Rollback => "rollback",
      }
   }

   pub fn compile(&self) -> CompiledQuery {
      CompiledQuery::raw(self.as_sql())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_transaction_statements() {
      assert_eq!(TransactionCommand::Begin.as_sql(), "begin");
      assert_eq!(TransactionCommand::Commit.as_sql(), "commit");
      assert_eq!(TransactionCommand::Rollback.as_sql(), "rollback");

      let begin = TransactionCommand::Begin.compile();
      assert_eq!(begin.sql(), "begin");
      assert!(begin.parameters().is_empty());
   }

   #[test]
   fn test_compiled_query_keeps_parameter_order() {
      let query = CompiledQuery::new(
         "select * from pet where name = ? and age > ?",
         vec![Value::from("Fluffy"), Value::from(3)],
      );
      assert_eq!(
         query.parameters(),
         &[Value::Text("Fluffy".into()), Value::Integer(3)]
      );
   }

   #[test]
   fn test_query_result_serializes_rows() {
      let json = serde_json::to_value(QueryResult::single(Row::from([(
         "id".to_string(),
         Value::Integer(1),
      )])))
      .unwrap();
      assert_eq!(json, serde_json::json!({ "rows": [{ "id": 1 }] }));
   }
}

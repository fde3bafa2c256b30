//! Dialect tokens for SQL compilation.
//!
//! [`QueryCompiler`] is the generic compiler surface: the token methods carry
//! generic defaults and a dialect overrides the ones it needs.
//! [`SqliteQueryCompiler`] overrides exactly four: parameter placeholder, both
//! identifier wrappers, and the autoincrement keyword.
//!
//! [`QueryBuilder`] assembles a [`CompiledQuery`] from SQL text, identifiers and
//! bound values using those tokens.

use sqlx_sqlite_driver::{CompiledQuery, Value};

/// Keyword SQLite uses to mark an autoincrementing primary key.
pub const AUTO_INCREMENT_KEYWORD: &str = "autoincrement";

/// Token source for SQL generation.
pub trait QueryCompiler {
   /// Placeholder for the parameter at 1-based `index`.
   fn parameter_placeholder(&self, index: usize) -> String {
      format!("${index}")
   }

   fn left_identifier_wrapper(&self) -> &'static str {
      "\""
   }

   fn right_identifier_wrapper(&self) -> &'static str {
      "\""
   }

   fn auto_increment(&self) -> &'static str {
      "auto_increment"
   }

   /// Wrap an identifier, doubling any embedded right wrapper.
   fn quote_identifier(&self, identifier: &str) -> String {
      let right = self.right_identifier_wrapper();
      format!(
         "{}{}{}",
         self.left_identifier_wrapper(),
         identifier.replace(right, &right.repeat(2)),
         right
      )
   }
}

/// Compiler tokens for SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQueryCompiler;

impl QueryCompiler for SqliteQueryCompiler {
   fn parameter_placeholder(&self, _index: usize) -> String {
      "?".to_string()
   }

   fn left_identifier_wrapper(&self) -> &'static str {
      "\""
   }

   fn right_identifier_wrapper(&self) -> &'static str {
      "\""
   }

   fn auto_increment(&self) -> &'static str {
      AUTO_INCREMENT_KEYWORD
   }
}

/// Incrementally builds a [`CompiledQuery`] with a compiler's tokens.
///
/// # Example
///
/// ```
/// use sqlx_sqlite_dialect::{QueryBuilder, SqliteQueryCompiler};
///
/// let mut builder = QueryBuilder::new(&SqliteQueryCompiler);
/// builder
///    .push("select * from ")
///    .push_identifier("pet")
///    .push(" where ")
///    .push_identifier("name")
///    .push(" = ")
///    .push_bind("Fluffy");
///
/// let query = builder.build();
/// assert_eq!(query.sql(), r#"select * from "pet" where "name" = ?"#);
/// assert_eq!(query.parameters().len(), 1);
/// ```
pub struct QueryBuilder<'c, C: ?Sized> {
   compiler: &'c C,
   sql: String,
   parameters: Vec<Value>,
}

impl<'c, C: QueryCompiler + ?Sized> QueryBuilder<'c, C> {
   pub fn new(compiler: &'c C) -> Self {
      Self {
         compiler,
         sql: String::new(),
         parameters: Vec::new(),
      }
   }

   /// Append raw SQL text.
   pub fn push(&mut self, sql: &str) -> &mut Self {
      self.sql.push_str(sql);
      self
   }

   /// Append a quoted identifier.
   pub fn push_identifier(&mut self, identifier: &str) -> &mut Self {
      self.sql.push_str(&self.compiler.quote_identifier(identifier));
      self
   }

   /// Append a placeholder and bind `value` to it.
   pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
      self.parameters.push(value.into());
      let placeholder = self.compiler.parameter_placeholder(self.parameters.len());
      self.sql.push_str(&placeholder);
      self
   }

   pub fn build(self) -> CompiledQuery {
      CompiledQuery::new(self.sql, self.parameters)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   struct GenericCompiler;
   impl QueryCompiler for GenericCompiler {}

   #[test]
   fn test_sqlite_tokens() {
      let compiler = SqliteQueryCompiler;
      assert_eq!(compiler.parameter_placeholder(1), "?");
      assert_eq!(compiler.parameter_placeholder(7), "?");
      assert_eq!(compiler.left_identifier_wrapper(), "\"");
      assert_eq!(compiler.right_identifier_wrapper(), "\"");
      assert_eq!(compiler.auto_increment(), "autoincrement");
   }

   #[test]
   fn test_generic_defaults() {
      let compiler = GenericCompiler;
      assert_eq!(compiler.parameter_placeholder(2), "$2");
      assert_eq!(compiler.auto_increment(), "auto_increment");
   }

   #[test]
   fn test_quote_identifier() {
      let compiler = SqliteQueryCompiler;
      assert_eq!(compiler.quote_identifier("users"), "\"users\"");
      assert_eq!(compiler.quote_identifier("my table"), "\"my table\"");
      assert_eq!(compiler.quote_identifier("foo\"bar"), "\"foo\"\"bar\"");
   }

   #[test]
   fn test_builder_binds_in_order() {
      let mut builder = QueryBuilder::new(&SqliteQueryCompiler);
      builder
         .push("select ")
         .push_identifier("id")
         .push(" from ")
         .push_identifier("pet")
         .push(" where ")
         .push_identifier("age")
         .push(" > ")
         .push_bind(3)
         .push(" and ")
         .push_identifier("name")
         .push(" != ")
         .push_bind("Rex");

      let query = builder.build();
      assert_eq!(
         query.sql(),
         r#"select "id" from "pet" where "age" > ? and "name" != ?"#
      );
      assert_eq!(
         query.parameters(),
         &[Value::Integer(3), Value::Text("Rex".into())]
      );
   }

   #[test]
   fn test_builder_with_generic_placeholders() {
      let mut builder = QueryBuilder::new(&GenericCompiler);
      builder.push("values (").push_bind(1).push(", ").push_bind(2).push(")");
      assert_eq!(builder.build().sql(), "values ($1, $2)");
   }

   #[test]
   fn test_builder_uses_auto_increment_token() {
      let compiler = SqliteQueryCompiler;
      let mut builder = QueryBuilder::new(&compiler);
      builder
         .push("create table ")
         .push_identifier("pet")
         .push(" (")
         .push_identifier("id")
         .push(" integer primary key ")
         .push(compiler.auto_increment())
         .push(")");

      assert_eq!(
         builder.build().sql(),
         r#"create table "pet" ("id" integer primary key autoincrement)"#
      );
   }
}

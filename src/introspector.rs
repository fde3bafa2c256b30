//! Schema introspection for SQLite.
//!
//! Tables come from the `sqlite_master` catalog, columns from
//! `pragma_table_info`. The catalog does not say which column autoincrements,
//! so that is recovered from the table's `create table` text by
//! [`find_auto_increment_column`].

use std::sync::{Arc, OnceLock};

use futures::future::try_join_all;
use regex::Regex;
use sqlx_sqlite_driver::{CompiledQuery, QueryResult, Row, SqliteDriver, Value};
use tracing::{debug, trace};

use crate::compiler::{AUTO_INCREMENT_KEYWORD, QueryBuilder, SqliteQueryCompiler};
use crate::metadata::{
   ColumnMetadata, DEFAULT_MIGRATION_LOCK_TABLE, DEFAULT_MIGRATION_TABLE, DatabaseMetadata,
   DatabaseMetadataOptions, SchemaMetadata, TableMetadata,
};
use crate::{Error, Result};

/// Reads table and column metadata through the driver's connection.
///
/// Every catalog query acquires the connection like any other caller and
/// releases it afterwards. Nothing is cached; each call is a fresh snapshot.
pub struct SqliteIntrospector {
   driver: Arc<SqliteDriver>,
   compiler: SqliteQueryCompiler,
}

impl SqliteIntrospector {
   pub fn new(driver: Arc<SqliteDriver>) -> Self {
      Self {
         driver,
         compiler: SqliteQueryCompiler,
      }
   }

   /// SQLite has no schemas.
   pub async fn get_schemas(&self) -> Result<Vec<SchemaMetadata>> {
      Ok(Vec::new())
   }

   /// Metadata for every user table, ordered by name.
   ///
   /// Tables starting with `sqlite_` are always skipped. The migration
   /// bookkeeping tables are skipped unless
   /// `options.with_internal_kysely_tables` is set.
   pub async fn get_tables(&self, options: DatabaseMetadataOptions) -> Result<Vec<TableMetadata>> {
      let result = self.execute(&tables_query(&self.compiler, options)).await?;

      let names = result
         .rows
         .iter()
         .map(|row| text_column(row, "name"))
         .collect::<Result<Vec<_>>>()?;
      debug!(tables = names.len(), "Introspecting tables");

      // Each table queues for the connection on its own
      try_join_all(names.iter().map(|name| self.get_table_metadata(name))).await
   }

   pub async fn get_metadata(&self, options: DatabaseMetadataOptions) -> Result<DatabaseMetadata> {
      Ok(DatabaseMetadata {
         tables: self.get_tables(options).await?,
      })
   }

   /// Columns of `table` in declaration order, with the autoincrement flag
   /// inferred from its `create table` text.
   pub async fn get_table_metadata(&self, table: &str) -> Result<TableMetadata> {
      let mut conn = self.driver.acquire_connection().await?;

      let definition = conn.execute_query(&definition_query(&self.compiler, table)).await?;
      let columns = conn.execute_query(&columns_query(&self.compiler, table)).await?;
      self.driver.release_connection(conn);

      let definition = definition.rows.first();
      let create_sql = match definition.and_then(|row| row.get("sql")) {
         Some(Value::Text(sql)) => Some(sql.as_str()),
         _ => None,
      };
      let is_view = match definition.and_then(|row| row.get("type")) {
         Some(Value::Text(kind)) => kind == "view",
         _ => false,
      };

      let auto_increment = create_sql.and_then(find_auto_increment_column);
      trace!(table, auto_increment = ?auto_increment, "Read table definition");

      let columns = columns
         .rows
         .iter()
         .map(|row| -> Result<ColumnMetadata> {
            let name = text_column(row, "name")?;
            Ok(ColumnMetadata {
               is_auto_incrementing: auto_increment.as_deref() == Some(name.as_str()),
               data_type: text_column(row, "type")?,
               is_nullable: integer_column(row, "notnull")? == 0,
               has_default_value: !row.get("dflt_value").is_none_or(Value::is_null),
               name,
            })
         })
         .collect::<Result<Vec<_>>>()?;

      Ok(TableMetadata {
         name: table.to_string(),
         is_view,
         columns,
      })
   }

   async fn execute(&self, query: &CompiledQuery) -> Result<QueryResult> {
      let mut conn = self.driver.acquire_connection().await?;
      Ok(conn.execute_query(query).await?)
   }
}

fn tables_query(compiler: &SqliteQueryCompiler, options: DatabaseMetadataOptions) -> CompiledQuery {
   let mut builder = QueryBuilder::new(compiler);
   builder
      .push("select ")
      .push_identifier("name")
      .push(" from ")
      .push_identifier("sqlite_master")
      .push(" where ")
      .push_identifier("type")
      .push(" = ")
      .push_bind("table")
      .push(" and ")
      .push_identifier("name")
      .push(" not like ")
      .push_bind("sqlite_%");

   if !options.with_internal_kysely_tables {
      builder
         .push(" and ")
         .push_identifier("name")
         .push(" != ")
         .push_bind(DEFAULT_MIGRATION_TABLE)
         .push(" and ")
         .push_identifier("name")
         .push(" != ")
         .push_bind(DEFAULT_MIGRATION_LOCK_TABLE);
   }

   builder.push(" order by ").push_identifier("name");
   builder.build()
}

fn definition_query(compiler: &SqliteQueryCompiler, table: &str) -> CompiledQuery {
   let mut builder = QueryBuilder::new(compiler);
   builder
      .push("select ")
      .push_identifier("sql")
      .push(", ")
      .push_identifier("type")
      .push(" from ")
      .push_identifier("sqlite_master")
      .push(" where ")
      .push_identifier("name")
      .push(" = ")
      .push_bind(table);
   builder.build()
}

fn columns_query(compiler: &SqliteQueryCompiler, table: &str) -> CompiledQuery {
   let mut builder = QueryBuilder::new(compiler);
   builder.push("select ");
   for (i, column) in ["cid", "name", "type", "notnull", "dflt_value"]
      .into_iter()
      .enumerate()
   {
      if i > 0 {
         builder.push(", ");
      }
      builder.push_identifier(column);
   }
   builder
      .push(" from pragma_table_info(")
      .push_bind(table)
      .push(") as ")
      .push_identifier("table_info")
      .push(" order by ")
      .push_identifier("cid");
   builder.build()
}

/// Best-effort name of the autoincrementing column in a `create table`
/// statement.
///
/// Splits the statement on `(`, `)` and `,`, takes the first fragment that
/// mentions `autoincrement` (any case), and returns the text before that
/// fragment's first whitespace run with every `"` and `` ` `` removed.
///
/// This is a text scan, not a parser. A fragment that starts with whitespace
/// (any column after a `, ` or on its own line) yields an empty name, which
/// matches no column. It also picks the wrong name when an identifier
/// contains spaces or brackets, or when a comment or default value mentions
/// the keyword before the real column, and it only ever reports one column.
pub fn find_auto_increment_column(create_sql: &str) -> Option<String> {
   static SEPARATORS: OnceLock<Regex> = OnceLock::new();
   static WHITESPACE: OnceLock<Regex> = OnceLock::new();
   let separators = SEPARATORS.get_or_init(|| Regex::new(r"[(),]").expect("invalid regex"));
   let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("invalid regex"));

   let fragment = separators
      .split(create_sql)
      .find(|fragment| fragment.to_lowercase().contains(AUTO_INCREMENT_KEYWORD))?;

   whitespace
      .split(fragment)
      .next()
      .map(|token| token.replace(['"', '`'], ""))
}

fn text_column(row: &Row, column: &'static str) -> Result<String> {
   match row.get(column) {
      Some(Value::Text(text)) => Ok(text.clone()),
      _ => Err(Error::UnexpectedCatalogValue {
         column,
         expected: "text",
      }),
   }
}

fn integer_column(row: &Row, column: &'static str) -> Result<i64> {
   row.get(column)
      .and_then(Value::as_integer)
      .ok_or(Error::UnexpectedCatalogValue {
         column,
         expected: "an integer",
      })
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_finds_auto_increment_column() {
      assert_eq!(
         find_auto_increment_column(
            "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)"
         ),
         Some("id".to_string())
      );
      assert_eq!(
         find_auto_increment_column(
            "create table \"pet\" (\"pet_id\" integer primary key autoincrement not null, \"name\" varchar(255))"
         ),
         Some("pet_id".to_string())
      );
      assert_eq!(
         find_auto_increment_column(
            "CREATE TABLE `t` (`key` INTEGER PRIMARY KEY AutoIncrement)"
         ),
         Some("key".to_string())
      );
   }

   #[test]
   fn test_leading_whitespace_yields_empty_name() {
      let sql = r#"
         CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
         )
      "#;
      assert_eq!(find_auto_increment_column(sql), Some(String::new()));

      // Only a column right after `(` is found
      assert_eq!(
         find_auto_increment_column(
            r#"create table "t" ("a" text, "id" integer primary key autoincrement)"#
         ),
         Some(String::new())
      );
   }

   #[test]
   fn test_strips_inner_quotes() {
      assert_eq!(
         find_auto_increment_column("CREATE TABLE t (a\"b`c INTEGER PRIMARY KEY AUTOINCREMENT)"),
         Some("abc".to_string())
      );
   }

   #[test]
   fn test_no_auto_increment() {
      assert_eq!(
         find_auto_increment_column("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)"),
         None
      );
   }

   #[test]
   fn test_known_text_scan_limits() {
      // Identifier with a space is cut at the space
      assert_eq!(
         find_auto_increment_column(
            "CREATE TABLE t (\"my id\" INTEGER PRIMARY KEY AUTOINCREMENT)"
         ),
         Some("my".to_string())
      );

      // Brackets are not stripped
      assert_eq!(
         find_auto_increment_column("CREATE TABLE t ([id] INTEGER PRIMARY KEY AUTOINCREMENT)"),
         Some("[id]".to_string())
      );

      // An earlier comment mentioning the keyword wins
      assert_eq!(
         find_auto_increment_column(
            "CREATE TABLE t (note TEXT -- not autoincrement\n, id INTEGER PRIMARY KEY AUTOINCREMENT)"
         ),
         Some("note".to_string())
      );
   }

   #[test]
   fn test_tables_query_excludes_internal_tables_by_default() {
      let query = tables_query(&SqliteQueryCompiler, DatabaseMetadataOptions::default());
      assert_eq!(
         query.sql(),
         r#"select "name" from "sqlite_master" where "type" = ? and "name" not like ? and "name" != ? and "name" != ? order by "name""#
      );
      assert_eq!(
         query.parameters(),
         &[
            Value::from("table"),
            Value::from("sqlite_%"),
            Value::from("kysely_migration"),
            Value::from("kysely_migration_lock"),
         ]
      );
   }

   #[test]
   fn test_tables_query_with_internal_tables() {
      let query = tables_query(
         &SqliteQueryCompiler,
         DatabaseMetadataOptions {
            with_internal_kysely_tables: true,
         },
      );
      assert_eq!(query.parameters().len(), 2);
      assert!(!query.sql().contains("!="));
   }

   #[test]
   fn test_columns_query_binds_table_name() {
      let query = columns_query(&SqliteQueryCompiler, "pet");
      assert_eq!(
         query.sql(),
         r#"select "cid", "name", "type", "notnull", "dflt_value" from pragma_table_info(?) as "table_info" order by "cid""#
      );
      assert_eq!(query.parameters(), &[Value::from("pet")]);
   }
}

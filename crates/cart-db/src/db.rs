//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;

#[cfg(not(target_arch = "wasm32"))]
use std::sync::{Arc, Mutex, OnceLock};

/// SQLite database connection.
///
/// Spin's SQLite on `wasm32`, `rusqlite` everywhere else. Clones share the
/// same underlying connection.
#[derive(Clone)]
pub struct Db {
    #[cfg(target_arch = "wasm32")]
    conn: std::rc::Rc<spin_sdk::sqlite::Connection>,
    #[cfg(not(target_arch = "wasm32"))]
    conn: Arc<Mutex<rusqlite::Connection>>,
}

#[cfg(target_arch = "wasm32")]
impl Db {
    /// Open the default SQLite database.
    pub fn open_default() -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open_default()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self {
            conn: std::rc::Rc::new(conn),
        })
    }

    /// Open a named SQLite database.
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open(name)
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self {
            conn: std::rc::Rc::new(conn),
        })
    }

    /// Execute a SQL statement that doesn't return rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        self.query(sql, params).map(|_| ())
    }

    /// Execute a SQL query and return raw results.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        use spin_sdk::sqlite::Value as SpinValue;

        let spin_params: Vec<SpinValue> = params
            .iter()
            .map(|v| match v {
                Value::Null => SpinValue::Null,
                Value::Integer(i) => SpinValue::Integer(*i),
                Value::Real(f) => SpinValue::Real(*f),
                Value::Text(s) => SpinValue::Text(s.clone()),
                Value::Blob(b) => SpinValue::Blob(b.clone()),
            })
            .collect();

        let result = self
            .conn
            .execute(sql, spin_params.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let columns: Vec<String> = result.columns.iter().map(|c| c.to_string()).collect();
        let rows = result
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .values
                    .iter()
                    .map(|v| match v {
                        SpinValue::Null => Value::Null,
                        SpinValue::Integer(i) => Value::Integer(*i),
                        SpinValue::Real(f) => Value::Real(*f),
                        SpinValue::Text(s) => Value::Text(s.clone()),
                        SpinValue::Blob(b) => Value::Blob(b.clone()),
                    })
                    .collect();
                Row::new(columns.clone(), values)
            })
            .collect();

        Ok(QueryResult::new(columns, rows))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Db {
    /// Open the process-wide default database.
    ///
    /// This is an in-memory database shared by every `open_default` handle.
    pub fn open_default() -> Result<Self, DbError> {
        static DEFAULT: OnceLock<Db> = OnceLock::new();

        if let Some(db) = DEFAULT.get() {
            return Ok(db.clone());
        }
        let db = Self::open_in_memory()?;
        Ok(DEFAULT.get_or_init(|| db).clone())
    }

    /// Open (or create) a SQLite database file.
    pub fn open(path: &str) -> Result<Self, DbError> {
        let conn =
            rusqlite::Connection::open(path).map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, DbError> {
        self.conn
            .lock()
            .map_err(|_| DbError::QueryError("connection lock poisoned".to_string()))
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Use this for INSERT, UPDATE, DELETE, CREATE TABLE, etc.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.execute(
    ///     "DELETE FROM cart WHERE owner_key = ?",
    ///     params!["session:abc"]
    /// )?;
    /// ```
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        let conn = self.connection()?;
        conn.execute(sql, rusqlite::params_from_iter(params.iter().map(to_sqlite)))?;
        Ok(())
    }

    /// Execute a SQL query and return raw results.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(rusqlite::params_from_iter(params.iter().map(to_sqlite)))?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_sqlite(row.get::<_, rusqlite::types::Value>(i)?));
            }
            rows.push(Row::new(columns.clone(), values));
        }

        Ok(QueryResult::new(columns, rows))
    }
}

impl Db {
    /// Execute a SQL query and deserialize results into a vector.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let rows: Vec<CartRow> = db.query_as(
    ///     "SELECT owner_key, data FROM cart",
    ///     params![]
    /// )?;
    /// ```
    pub fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params)?.deserialize_all()
    }

    /// Execute a SQL query and return a single row.
    ///
    /// Returns [`DbError::NotFound`] if no rows are returned.
    pub fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        self.query_optional(sql, params)?.ok_or(DbError::NotFound)
    }

    /// Execute a SQL query and return an optional single row.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params)?;
        result.first().map(Row::deserialize).transpose()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn to_sqlite(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sqlite;

    match value {
        Value::Null => Sqlite::Null,
        Value::Integer(i) => Sqlite::Integer(*i),
        Value::Real(f) => Sqlite::Real(*f),
        Value::Text(s) => Sqlite::Text(s.clone()),
        Value::Blob(b) => Sqlite::Blob(b.clone()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn from_sqlite(value: rusqlite::types::Value) -> Value {
    use rusqlite::types::Value as Sqlite;

    match value {
        Sqlite::Null => Value::Null,
        Sqlite::Integer(i) => Value::Integer(i),
        Sqlite::Real(f) => Value::Real(f),
        Sqlite::Text(s) => Value::Text(s),
        Sqlite::Blob(b) => Value::Blob(b),
    }
}

use std::sync::Arc;

use anyhow::{Result, anyhow};
use rusqlite::types::{FromSql, Value, ValueRef};

/// A parameterized SQL statement that has been prepared but not executed.
///
/// Building and binding a statement performs no I/O; it only runs when handed
/// to a [`RecordStore`](crate::RecordStore). Parameters are positional (`?1`,
/// `?2`, ...) in bind order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// One result row, detached from the connection it was read from.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Decode the named column.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| anyhow!("No such column: {}", column))?;

        T::column_result(ValueRef::from(&self.values[idx]))
            .map_err(|e| anyhow!("Column {}: {}", column, e))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::Database;
use crate::statement::{Row, Statement};

/// Relational side of the mail store.
///
/// `batch` is all-or-nothing: either every statement is applied or none are.
/// Nothing else about the store is transactional.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Execute one statement, returning the number of rows changed.
    async fn run(&self, statement: Statement) -> Result<usize>;

    /// Execute statements in order as a single atomic unit.
    async fn batch(&self, statements: Vec<Statement>) -> Result<Vec<usize>>;

    async fn all(&self, statement: Statement) -> Result<Vec<Row>>;

    async fn first(&self, statement: Statement) -> Result<Option<Row>>;
}

impl Database {
    pub fn execute(&self, statement: &Statement) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(statement.sql(), params_from_iter(statement.params()))?;
            Ok(changed)
        })
    }

    /// Run every statement inside one transaction. Any failure drops the
    /// transaction, which rolls back the statements already applied.
    pub fn execute_atomic(&self, statements: &[Statement]) -> Result<Vec<usize>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut changed = Vec::with_capacity(statements.len());
            for statement in statements {
                changed.push(tx.execute(statement.sql(), params_from_iter(statement.params()))?);
            }
            tx.commit()?;

            debug!("Committed batch of {} statements", statements.len());
            Ok(changed)
        })
    }

    pub fn query_all(&self, statement: &Statement) -> Result<Vec<Row>> {
        self.with_conn(|conn| read_rows(conn, statement, None))
    }

    pub fn query_first(&self, statement: &Statement) -> Result<Option<Row>> {
        self.with_conn(|conn| Ok(read_rows(conn, statement, Some(1))?.pop()))
    }
}

fn read_rows(conn: &Connection, statement: &Statement, limit: Option<usize>) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(statement.sql())?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()
        .into();
    let width = columns.len();

    let mut rows = stmt.query(params_from_iter(statement.params()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        out.push(Row::new(columns.clone(), values));

        if limit.is_some_and(|max| out.len() >= max) {
            break;
        }
    }

    Ok(out)
}

#[async_trait]
impl RecordStore for Database {
    async fn run(&self, statement: Statement) -> Result<usize> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.execute(&statement)).await?
    }

    async fn batch(&self, statements: Vec<Statement>) -> Result<Vec<usize>> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.execute_atomic(&statements)).await?
    }

    async fn all(&self, statement: Statement) -> Result<Vec<Row>> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.query_all(&statement)).await?
    }

    async fn first(&self, statement: Statement) -> Result<Option<Row>> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.query_first(&statement)).await?
    }
}

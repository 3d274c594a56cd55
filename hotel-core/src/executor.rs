use async_trait::async_trait;
use thiserror::Error;

use crate::{Output, Query, ResultSet};

pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Returned by [`Executor::last_generated_id`] when the lookup produced no row.
/// Never a valid identifier.
pub const NO_ID: i64 = -1;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The connection to the database is unusable
    #[error("Lost connection to the database: {0}")]
    Connection(BoxedError),
    /// The database rejected or failed the statement
    #[error(transparent)]
    Execution(BoxedError),
    /// A uniqueness constraint rejected the statement
    #[error("{constraint} is already taken")]
    Conflict { constraint: String },
    /// A cell could not be turned into text
    #[error("Column {column} has unsupported type {type_name}")]
    UnsupportedColumn { column: String, type_name: String },
}

/// Runs parameterized statements against one live database connection.
///
/// Every call uses the same connection, so statements issued between
/// [`Executor::begin`] and [`Executor::commit`] or [`Executor::rollback`]
/// share one transaction.
#[async_trait]
pub trait Executor: Send {
    /// Runs a data modifying statement, returning the number of affected rows
    async fn run_for_effect(&mut self, statement: &Query) -> ExecutorResult<u64>;
    /// Counts the rows of a query without reading their cells
    async fn run_count_only(&mut self, query: &Query) -> ExecutorResult<usize>;
    /// Returns every row of a query, each cell as text
    async fn run_and_collect(&mut self, query: &Query) -> ExecutorResult<ResultSet>;
    /// Returns the integer in the first column of the first row, or [`NO_ID`]
    async fn last_generated_id(&mut self, lookup: &Query) -> ExecutorResult<i64>;

    /// Opens a transaction. Every `begin` must be closed by exactly one
    /// `commit` or `rollback`; a transaction still open at the next `begin`
    /// is rolled back.
    async fn begin(&mut self) -> ExecutorResult<()>;
    async fn commit(&mut self) -> ExecutorResult<()>;
    async fn rollback(&mut self) -> ExecutorResult<()>;

    /// Writes the rows of a query as a table, returning how many there were
    async fn run_and_render(
        &mut self,
        query: &Query,
        output: &mut (dyn Output + Send),
    ) -> ExecutorResult<usize> {
        let records = self.run_and_collect(query).await?;

        for line in records.render_lines() {
            output.line(&line);
        }

        Ok(records.row_count())
    }
}

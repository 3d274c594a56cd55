use async_trait::async_trait;
use futures_util::{future, TryStreamExt};
use hotel_core::{
    Config, Executor, ExecutorError, ExecutorResult, Param, Query, ResultSet, NO_ID, NULL_CELL,
};
use log::{debug, info, warn};
use sqlx::{
    postgres::{PgArguments, PgConnectOptions},
    query::Query as Statement,
    Connection, Error as SqlxError, PgConnection, Postgres,
};

use crate::mapper::{column_names, decode_cell, decode_row};

/// A postgres implementation of the query executor, holding a single
/// connection for its whole lifetime
pub struct PgExecutor {
    connection: PgConnection,
    /// Set between `begin` and `commit` / `rollback`
    in_transaction: bool,
}

impl PgExecutor {
    pub async fn connect(config: &Config) -> ExecutorResult<Self> {
        let connection = PgConnection::connect_with(&connect_options(config))
            .await
            .map_err(|e| ExecutorError::Connection(Box::new(e)))?;

        info!("Connected to {}", config.display_url());

        Ok(Self {
            connection,
            in_transaction: false,
        })
    }

    /// Closes the connection gracefully, rolling back a transaction left open
    pub async fn close(mut self) -> ExecutorResult<()> {
        if self.in_transaction {
            warn!("Closing with an open transaction, rolling it back");
            self.control("ROLLBACK").await?;
        }

        self.connection.close().await.map_err(|e| e.any())
    }

    async fn control(&mut self, command: &'static str) -> ExecutorResult<()> {
        debug!("{}", command);

        sqlx::Executor::execute(&mut self.connection, command)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

#[async_trait]
impl Executor for PgExecutor {
    async fn run_for_effect(&mut self, statement: &Query) -> ExecutorResult<u64> {
        prepare(statement)
            .execute(&mut self.connection)
            .await
            .map_err(|e| e.any())
            .map(|r| r.rows_affected())
    }

    async fn run_count_only(&mut self, query: &Query) -> ExecutorResult<usize> {
        prepare(query)
            .fetch(&mut self.connection)
            .try_fold(0, |count, _| future::ready(Ok(count + 1)))
            .await
            .map_err(|e| e.any())
    }

    async fn run_and_collect(&mut self, query: &Query) -> ExecutorResult<ResultSet> {
        let mut rows = prepare(query).fetch(&mut self.connection);
        let mut records: Option<ResultSet> = None;

        while let Some(row) = rows.try_next().await.map_err(|e| e.any())? {
            let decoded = decode_row(&row)?;

            records
                .get_or_insert_with(|| ResultSet::new(column_names(&row)))
                .push_row(decoded);
        }

        Ok(records.unwrap_or_default())
    }

    async fn last_generated_id(&mut self, lookup: &Query) -> ExecutorResult<i64> {
        let row = prepare(lookup)
            .fetch_optional(&mut self.connection)
            .await
            .map_err(|e| e.any())?;

        let Some(row) = row else {
            return Ok(NO_ID);
        };

        let cell = decode_cell(&row, 0)?;

        if cell == NULL_CELL {
            return Ok(NO_ID);
        }

        cell.parse()
            .map_err(|e| ExecutorError::Execution(Box::new(e)))
    }

    async fn begin(&mut self) -> ExecutorResult<()> {
        if self.in_transaction {
            warn!("A transaction was never settled, rolling it back");
        }

        for command in opening_commands(self.in_transaction) {
            self.control(*command).await?;
        }

        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> ExecutorResult<()> {
        self.in_transaction = false;
        self.control("COMMIT").await
    }

    async fn rollback(&mut self) -> ExecutorResult<()> {
        self.in_transaction = false;
        self.control("ROLLBACK").await
    }
}

/// What to send to open a transaction. A stale one is discarded first, so
/// statements never join a transaction nobody will settle.
fn opening_commands(in_transaction: bool) -> &'static [&'static str] {
    if in_transaction {
        &["ROLLBACK", "BEGIN"]
    } else {
        &["BEGIN"]
    }
}

fn connect_options(config: &Config) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password);

    match config.statement_timeout_secs {
        Some(secs) => options.options([("statement_timeout", format!("{}s", secs))]),
        None => options,
    }
}

/// Binds every parameter of the query, in order
fn prepare(query: &Query) -> Statement<'_, Postgres, PgArguments> {
    debug!("{}", query.sql());

    query
        .params()
        .iter()
        .fold(sqlx::query(query.sql()), |statement, param| match param {
            Param::Int(value) => statement.bind(*value),
            Param::BigInt(value) => statement.bind(*value),
            Param::Float(value) => statement.bind(*value),
            Param::Text(value) => statement.bind(value.as_str()),
            Param::Date(value) => statement.bind(*value),
            Param::Null => statement.bind(None::<String>),
        })
}

/// Helper trait to reduce boilerplate
pub trait IntoExecutorError {
    fn any(self) -> ExecutorError;
}

impl IntoExecutorError for SqlxError {
    fn any(self) -> ExecutorError {
        if let SqlxError::Database(error) = &self {
            if error.is_unique_violation() {
                return ExecutorError::Conflict {
                    constraint: error.constraint().unwrap_or("unique key").to_string(),
                };
            }
        }

        let is_connection_fault = matches!(
            self,
            SqlxError::Io(_)
                | SqlxError::Tls(_)
                | SqlxError::Protocol(_)
                | SqlxError::PoolTimedOut
                | SqlxError::PoolClosed
                | SqlxError::WorkerCrashed
        );

        if is_connection_fault {
            ExecutorError::Connection(Box::new(self))
        } else {
            ExecutorError::Execution(Box::new(self))
        }
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use hotel_core::{Config, ExecutorError};
    use sqlx::Error as SqlxError;

    use super::{connect_options, opening_commands, IntoExecutorError};

    #[test]
    fn io_faults_are_connection_errors() {
        let error = SqlxError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).any();

        assert!(matches!(error, ExecutorError::Connection(_)));
    }

    #[test]
    fn other_faults_are_execution_errors() {
        let error = SqlxError::RowNotFound.any();

        assert!(matches!(error, ExecutorError::Execution(_)));
    }

    #[test]
    fn options_follow_config() {
        let config = Config {
            host: "db.internal".to_string(),
            port: 6543,
            database: "hotels".to_string(),
            user: "alice".to_string(),
            password: String::new(),
            statement_timeout_secs: Some(10),
        };

        let options = connect_options(&config);

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("hotels"));
        assert_eq!(options.get_username(), "alice");
    }

    #[test]
    fn unsettled_transaction_is_discarded_before_a_new_one() {
        assert_eq!(opening_commands(false), &["BEGIN"]);
        assert_eq!(opening_commands(true), &["ROLLBACK", "BEGIN"]);
    }
}

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel::QueryResult;
use tracing::warn;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// How many times a statement is re-run when SQLite reports the database as busy
const MAX_BUSY_RETRIES: u32 = 5;

/// Base delay between busy retries, doubled on every attempt
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Applies per-connection pragmas whenever the pool opens a connection
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a connection pool for the given SQLite database URL
///
/// ### Errors
///
/// Returns an error if the pool cannot open its initial connections.
pub fn init_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
}

/// Returns true when SQLite rejected the statement because another
/// connection holds the lock
pub fn is_busy_error(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Runs `op` against the connection, retrying with backoff while SQLite
/// reports the database as locked
pub async fn with_busy_retry<T, F>(conn: &mut SqliteConnection, mut op: F) -> QueryResult<T>
where
    F: FnMut(&mut SqliteConnection) -> QueryResult<T>,
{
    let mut attempt = 0;
    loop {
        match op(conn) {
            Err(err) if is_busy_error(&err) && attempt < MAX_BUSY_RETRIES => {
                attempt += 1;
                let delay = BUSY_RETRY_DELAY * 2u32.pow(attempt - 1);
                warn!(attempt, ?delay, "database busy, retrying");
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

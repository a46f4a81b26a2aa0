/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for storing maintenance requests captured from
/// voice-agent calls and the activity log that records their history.

mod maintenance_request_repo;
mod activity_log_repo;

// Re-export all repository functions
pub use maintenance_request_repo::*;
pub use activity_log_repo::*;

#[cfg(any(test, feature = "test"))]
pub mod tests {
    use std::sync::Arc;

    use crate::db::{self, DbPool};

    /// Sets up a test database with migrations applied
    ///
    /// Plain ":memory:" gives each pooled connection its own database, so a
    /// unique shared-cache URI is used instead: every connection in this pool
    /// sees the same in-memory database while tests stay isolated.
    ///
    /// ### Returns
    ///
    /// A database connection pool connected to the in-memory database
    pub fn setup_test_db() -> Arc<DbPool> {
        let unique_id = uuid::Uuid::new_v4();
        let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
        let pool = db::init_pool(&database_url).expect("Failed to create pool");

        let mut conn = pool.get().expect("Failed to get connection");
        crate::run_migrations(&mut conn).expect("Failed to run migrations");

        Arc::new(pool)
    }
}

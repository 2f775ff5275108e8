//! Storage infrastructure: PostgreSQL pool, migrations and shared error helpers

pub mod migrations;
mod postgres;

pub use migrations::{course_market_migrations, run_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::connect_pool;

/// Whether a sqlx error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Whether a sqlx error is a foreign key violation
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

/// Whether a sqlx error is a CHECK constraint violation
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_check_violation())
}

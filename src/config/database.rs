//! Database configuration module for the studio ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! store schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Enrollment, Payment, PrivateLesson, RecurringSeries, Student, Teacher};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found. The fallback makes this
/// infallible.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/studio_ledger.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary store tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation. None of the entities declare relations, so no foreign-key
/// constraints are emitted: cross-entity references are weak by design and deleting a
/// referenced record must never cascade or be blocked by the store.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let student_table = schema.create_table_from_entity(Student);
    let teacher_table = schema.create_table_from_entity(Teacher);
    let enrollment_table = schema.create_table_from_entity(Enrollment);
    let payment_table = schema.create_table_from_entity(Payment);
    let lesson_table = schema.create_table_from_entity(PrivateLesson);
    let series_table = schema.create_table_from_entity(RecurringSeries);

    db.execute(builder.build(&student_table)).await?;
    db.execute(builder.build(&teacher_table)).await?;
    db.execute(builder.build(&enrollment_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&lesson_table)).await?;
    db.execute(builder.build(&series_table)).await?;

    Ok(())
}

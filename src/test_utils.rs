//! Shared test utilities for the studio ledger.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::{enrollment, lesson, student, teacher},
    entities,
    errors::Result,
    notify::{Actor, NoopNotifier},
};
use sea_orm::DatabaseConnection;
use sea_orm::prelude::DateTimeUtc;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The caller identity used for every test mutation.
#[must_use]
pub fn test_actor() -> Actor {
    Actor {
        user_id: "test-user".to_string(),
        user_name: "Test Admin".to_string(),
        role: "admin".to_string(),
    }
}

/// Creates a test student with the given first name and a fixed last name.
pub async fn create_test_student(
    db: &DatabaseConnection,
    first_name: &str,
) -> Result<entities::student::Model> {
    student::create_student(db, first_name.to_string(), "Tester".to_string(), None, None).await
}

/// Creates a test teacher with the given first name and a fixed last name.
pub async fn create_test_teacher(
    db: &DatabaseConnection,
    first_name: &str,
) -> Result<entities::teacher::Model> {
    teacher::create_teacher(
        db,
        first_name.to_string(),
        "Instructor".to_string(),
        None,
        None,
    )
    .await
}

/// Sets up a complete test environment with one student and one teacher.
/// Returns (db, student, teacher) for common booking scenarios.
pub async fn setup_studio() -> Result<(
    DatabaseConnection,
    entities::student::Model,
    entities::teacher::Model,
)> {
    let db = setup_test_db().await?;
    let student = create_test_student(&db, "Mia").await?;
    let teacher = create_test_teacher(&db, "Sofia").await?;
    Ok((db, student, teacher))
}

/// Creates a test enrollment with sensible defaults.
///
/// # Defaults
/// * `program_name`: `"Beginner Ballet"`
/// * `total_paid`: 300.0
/// * `expiry_date`: None
pub async fn create_test_enrollment(
    db: &DatabaseConnection,
    student_id: i64,
    total_lessons: i32,
) -> Result<entities::enrollment::Model> {
    enrollment::create_enrollment(
        db,
        student_id,
        "Beginner Ballet".to_string(),
        total_lessons,
        300.0,
        None,
    )
    .await
}

/// Builds lesson-creation args with sensible defaults: a single teacher,
/// 60 minutes, `booking_type = "private_lesson"`, no enrollment.
#[must_use]
pub fn lesson_args(
    student_id: i64,
    teacher_id: i64,
    start_datetime: DateTimeUtc,
) -> lesson::CreateLessonArgs {
    lesson::CreateLessonArgs {
        student_id,
        teacher_ids: vec![teacher_id],
        start_datetime,
        duration_minutes: 60,
        booking_type: "private_lesson".to_string(),
        notes: None,
        enrollment_id: None,
        recurring_series_id: None,
    }
}

/// Books a test lesson with the default args and the test actor.
pub async fn create_test_lesson(
    db: &DatabaseConnection,
    student_id: i64,
    teacher_id: i64,
    start_datetime: DateTimeUtc,
) -> Result<entities::private_lesson::Model> {
    lesson::create_lesson(
        db,
        &NoopNotifier,
        lesson_args(student_id, teacher_id, start_datetime),
        &test_actor(),
    )
    .await
}

//! Student business logic - creation and lookups.
//!
//! Students are the validation target for every booking operation. Deleting a
//! student is deliberately shallow: enrollments, payments and lessons that
//! reference the student are kept for history.

use crate::{
    entities::{Student, student},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new student record.
///
/// Validates that both name parts are non-empty and trims surrounding
/// whitespace before persisting.
pub async fn create_student(
    db: &DatabaseConnection,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
) -> Result<student::Model> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "student name cannot be empty".to_string(),
        });
    }

    let student = student::ActiveModel {
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        email: Set(email),
        phone: Set(phone),
        notes: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = student.insert(db).await?;
    Ok(result)
}

/// Finds a student by its unique ID, returning None if not found.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all students, ordered alphabetically by last name.
pub async fn list_students(db: &DatabaseConnection) -> Result<Vec<student::Model>> {
    Student::find()
        .order_by_asc(student::Column::LastName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a student record.
///
/// This removes only the student row itself. Lessons, enrollments and
/// payments that reference the student are untouched - they are kept for
/// history and resolved by lookup-on-demand, which simply comes up empty.
pub async fn delete_student(db: &DatabaseConnection, student_id: i64) -> Result<()> {
    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })?;

    student.delete(db).await?;
    Ok(())
}

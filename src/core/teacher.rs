//! Teacher business logic - creation and lookups.
//!
//! Teachers exist here only as validation targets for lesson and series
//! booking; scheduling never resolves conflicts between them.

use crate::{
    entities::{Teacher, teacher},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new teacher record.
pub async fn create_teacher(
    db: &DatabaseConnection,
    first_name: String,
    last_name: String,
    email: Option<String>,
    specialties: Option<String>,
) -> Result<teacher::Model> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "teacher name cannot be empty".to_string(),
        });
    }

    let teacher = teacher::ActiveModel {
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        email: Set(email),
        specialties: Set(specialties),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = teacher.insert(db).await?;
    Ok(result)
}

/// Finds a teacher by its unique ID, returning None if not found.
pub async fn get_teacher_by_id(
    db: &DatabaseConnection,
    teacher_id: i64,
) -> Result<Option<teacher::Model>> {
    Teacher::find_by_id(teacher_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all teachers currently taking bookings, ordered by last name.
pub async fn list_active_teachers(db: &DatabaseConnection) -> Result<Vec<teacher::Model>> {
    Teacher::find()
        .filter(teacher::Column::IsActive.eq(true))
        .order_by_asc(teacher::Column::LastName)
        .all(db)
        .await
        .map_err(Into::into)
}

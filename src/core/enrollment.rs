//! Enrollment business logic - lesson-credit bundles.
//!
//! An enrollment is a purchased bundle of lesson credits for one student.
//! `remaining_lessons` is mutated in exactly one place,
//! [`deduct_credit_if_available`], which the lesson lifecycle calls once per
//! newly attended lesson. The deduction is an atomic conditional update at
//! the store level so that concurrent attendance calls sharing an enrollment
//! cannot lose updates or drive the balance negative.
//!
//! Legacy rows from the older "package" model may lack `program_name` and
//! `total_lessons`; [`normalize`] backfills both on read without ever
//! writing the migrated shape back.

use crate::{
    entities::{Enrollment, Student, enrollment},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use tracing::instrument;

/// Program name substituted for legacy rows that predate named programs.
pub const UNKNOWN_PROGRAM: &str = "Unknown Program";

/// An enrollment with legacy fields migrated into the current shape.
///
/// This is the only representation core logic and callers should consume;
/// the raw [`enrollment::Model`] may still carry the legacy nullable columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEnrollment {
    /// Unique identifier for the enrollment
    pub id: i64,
    /// ID of the student this bundle belongs to
    pub student_id: i64,
    /// Program name, `"Unknown Program"` when the row predates named programs
    pub program_name: String,
    /// Lessons purchased; backfilled from `remaining_lessons` on legacy rows
    pub total_lessons: i32,
    /// Remaining lesson credits
    pub remaining_lessons: i32,
    /// Total amount paid for this bundle in dollars
    pub total_paid: f64,
    /// Whether this enrollment counts toward the student's balance
    pub is_active: bool,
    /// When the bundle was purchased
    pub purchase_date: DateTimeUtc,
    /// Optional expiry date for the credits
    pub expiry_date: Option<DateTimeUtc>,
}

/// Migrates an enrollment row into the current shape.
///
/// Pure mapping applied at the store-read boundary: a missing `program_name`
/// becomes [`UNKNOWN_PROGRAM`] and a missing `total_lessons` is taken to be
/// whatever is still remaining. The stored row is never mutated.
#[must_use]
pub fn normalize(model: enrollment::Model) -> NormalizedEnrollment {
    NormalizedEnrollment {
        id: model.id,
        student_id: model.student_id,
        program_name: model
            .program_name
            .unwrap_or_else(|| UNKNOWN_PROGRAM.to_string()),
        total_lessons: model.total_lessons.unwrap_or(model.remaining_lessons),
        remaining_lessons: model.remaining_lessons,
        total_paid: model.total_paid,
        is_active: model.is_active,
        purchase_date: model.purchase_date,
        expiry_date: model.expiry_date,
    }
}

/// Creates a new enrollment for a student.
///
/// The bundle starts with its full credit balance
/// (`remaining_lessons == total_lessons`) and is active. `total_lessons` is
/// immutable after creation.
pub async fn create_enrollment(
    db: &DatabaseConnection,
    student_id: i64,
    program_name: String,
    total_lessons: i32,
    total_paid: f64,
    expiry_date: Option<DateTimeUtc>,
) -> Result<enrollment::Model> {
    if total_lessons < 0 {
        return Err(Error::Validation {
            message: format!("total_lessons must be non-negative, got {total_lessons}"),
        });
    }
    if program_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "program name cannot be empty".to_string(),
        });
    }

    Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })?;

    let enrollment = enrollment::ActiveModel {
        student_id: Set(student_id),
        program_name: Set(Some(program_name.trim().to_string())),
        total_lessons: Set(Some(total_lessons)),
        remaining_lessons: Set(total_lessons),
        total_paid: Set(total_paid),
        is_active: Set(true),
        purchase_date: Set(chrono::Utc::now()),
        expiry_date: Set(expiry_date),
        ..Default::default()
    };

    let result = enrollment.insert(db).await?;
    Ok(result)
}

/// Finds an enrollment by its unique ID, returning None if not found.
pub async fn get_enrollment_by_id(
    db: &DatabaseConnection,
    enrollment_id: i64,
) -> Result<Option<enrollment::Model>> {
    Enrollment::find_by_id(enrollment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all of a student's enrollments, oldest purchase first,
/// normalized into the current shape.
pub async fn get_enrollments_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<NormalizedEnrollment>> {
    let rows = Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_asc(enrollment::Column::PurchaseDate)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(normalize).collect())
}

/// Atomically deducts one credit from an enrollment, if any remain.
///
/// This issues a single conditional UPDATE at the store level:
/// `SET remaining_lessons = remaining_lessons - 1 WHERE id = ? AND
/// remaining_lessons > 0`. Two concurrent attendance calls sharing the same
/// enrollment therefore serialize on the row instead of racing a
/// read-then-write, and the balance can never go below zero.
///
/// Returns `Ok(true)` if a credit was deducted and `Ok(false)` if the
/// enrollment is exhausted. Exhaustion is a recorded business decision, not
/// an error: attendance tracking must never be blocked by billing state.
#[instrument(skip(db))]
pub async fn deduct_credit_if_available<C>(db: &C, enrollment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Enrollment::find_by_id(enrollment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "enrollment",
            id: enrollment_id.to_string(),
        })?;

    let result = Enrollment::update_many()
        .col_expr(
            enrollment::Column::RemainingLessons,
            Expr::col(enrollment::Column::RemainingLessons).sub(1),
        )
        .filter(enrollment::Column::Id.eq(enrollment_id))
        .filter(enrollment::Column::RemainingLessons.gt(0))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{create_test_student, setup_test_db};

    #[tokio::test]
    async fn test_create_enrollment_starts_full() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;

        let enrollment = create_enrollment(
            &db,
            student.id,
            "Beginner Ballet".to_string(),
            10,
            450.0,
            None,
        )
        .await?;

        assert_eq!(enrollment.total_lessons, Some(10));
        assert_eq!(enrollment.remaining_lessons, 10);
        assert_eq!(enrollment.total_paid, 450.0);
        assert!(enrollment.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_enrollment_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;

        let result =
            create_enrollment(&db, student.id, "Ballet".to_string(), -1, 100.0, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let result = create_enrollment(&db, student.id, "  ".to_string(), 5, 100.0, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let result = create_enrollment(&db, 999, "Ballet".to_string(), 5, 100.0, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "student",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_normalize_passes_through_current_shape() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;
        let enrollment =
            create_enrollment(&db, student.id, "Salsa Intensive".to_string(), 8, 320.0, None)
                .await?;

        let normalized = normalize(enrollment);
        assert_eq!(normalized.program_name, "Salsa Intensive");
        assert_eq!(normalized.total_lessons, 8);
        assert_eq!(normalized.remaining_lessons, 8);
        Ok(())
    }

    #[tokio::test]
    async fn test_normalize_backfills_legacy_package_row() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;

        // Simulate an old "package" row that predates program_name/total_lessons.
        let legacy = enrollment::ActiveModel {
            student_id: Set(student.id),
            program_name: Set(None),
            total_lessons: Set(None),
            remaining_lessons: Set(4),
            total_paid: Set(200.0),
            is_active: Set(true),
            purchase_date: Set(chrono::Utc::now()),
            expiry_date: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let normalized = normalize(legacy.clone());
        assert_eq!(normalized.program_name, UNKNOWN_PROGRAM);
        assert_eq!(normalized.total_lessons, 4);
        assert_eq!(normalized.remaining_lessons, 4);

        // The stored row must keep its legacy shape; migration is read-only.
        let reread = get_enrollment_by_id(&db, legacy.id).await?.unwrap();
        assert_eq!(reread.program_name, None);
        assert_eq!(reread.total_lessons, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_credit_stops_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;
        let enrollment =
            create_enrollment(&db, student.id, "Ballet".to_string(), 2, 100.0, None).await?;

        assert!(deduct_credit_if_available(&db, enrollment.id).await?);
        assert!(deduct_credit_if_available(&db, enrollment.id).await?);
        // Third deduction finds the bundle exhausted and must not go negative.
        assert!(!deduct_credit_if_available(&db, enrollment.id).await?);

        let reread = get_enrollment_by_id(&db, enrollment.id).await?.unwrap();
        assert_eq!(reread.remaining_lessons, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_credit_missing_enrollment() -> Result<()> {
        let db = setup_test_db().await?;

        let result = deduct_credit_if_available(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "enrollment",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_enrollments_for_student_normalizes() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Mia").await?;

        create_enrollment(&db, student.id, "Ballet".to_string(), 10, 450.0, None).await?;
        enrollment::ActiveModel {
            student_id: Set(student.id),
            program_name: Set(None),
            total_lessons: Set(None),
            remaining_lessons: Set(3),
            total_paid: Set(150.0),
            is_active: Set(true),
            purchase_date: Set(chrono::Utc::now()),
            expiry_date: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let enrollments = get_enrollments_for_student(&db, student.id).await?;
        assert_eq!(enrollments.len(), 2);
        assert_eq!(enrollments[0].program_name, "Ballet");
        assert_eq!(enrollments[1].program_name, UNKNOWN_PROGRAM);
        assert_eq!(enrollments[1].total_lessons, 3);
        Ok(())
    }
}

//! Payment business logic - immutable monetary records.
//!
//! Payments only support create, delete and lookup. They never grant lesson
//! credits on their own; credits come from the enrollment a payment may be
//! linked to.

use crate::{
    entities::{Enrollment, Payment, Student, payment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Records a payment from a student, optionally applied to one enrollment.
///
/// The amount must be positive and finite. The student must exist; a linked
/// enrollment, if given, must exist at creation time (afterwards the
/// reference is weak and may dangle).
pub async fn create_payment(
    db: &DatabaseConnection,
    student_id: i64,
    enrollment_id: Option<i64>,
    amount: f64,
    method: Option<String>,
    notes: Option<String>,
) -> Result<payment::Model> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation {
            message: format!("payment amount must be positive, got {amount}"),
        });
    }

    Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })?;

    if let Some(eid) = enrollment_id {
        Enrollment::find_by_id(eid)
            .one(db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "enrollment",
                id: eid.to_string(),
            })?;
    }

    let payment = payment::ActiveModel {
        student_id: Set(student_id),
        enrollment_id: Set(enrollment_id),
        amount: Set(amount),
        method: Set(method),
        notes: Set(notes),
        paid_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = payment.insert(db).await?;
    Ok(result)
}

/// Deletes a payment record. Payments have no update path; a wrong amount is
/// corrected by deleting and re-creating.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<()> {
    let payment = Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "payment",
            id: payment_id.to_string(),
        })?;

    payment.delete(db).await?;
    Ok(())
}

/// Retrieves all of a student's payments, most recent first.
pub async fn get_payments_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::StudentId.eq(student_id))
        .order_by_desc(payment::Column::PaidAt)
        .all(db)
        .await
        .map_err(Into::into)
}

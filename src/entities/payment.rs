//! Payment entity - A monetary record tied to a student.
//!
//! Payments are immutable once created: there is no update operation, only
//! create and delete. A payment may reference one enrollment, but it is not
//! itself a source of credits - credits come only from the enrollment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the paying student (weak reference)
    pub student_id: i64,
    /// Optional enrollment this payment was applied to (weak reference)
    pub enrollment_id: Option<i64>,
    /// Amount paid in dollars
    pub amount: f64,
    /// Payment method (e.g. `"cash"`, `"card"`)
    pub method: Option<String>,
    /// Free-form notes about the payment
    pub notes: Option<String>,
    /// When the payment was received
    pub paid_at: DateTimeUtc,
}

/// Payments carry no owning relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Student entity - Represents a student enrolled at the studio.
//!
//! Students are referenced by id from enrollments, payments and lessons.
//! Those references are weak: deleting a student never cascade-deletes the
//! records that point at it, so history is preserved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student's first name
    pub first_name: String,
    /// Student's last name
    pub last_name: String,
    /// Contact email address
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Free-form notes about the student
    pub notes: Option<String>,
    /// When the student record was created
    pub created_at: DateTimeUtc,
}

/// Students carry no owning relationships; all references to them are weak
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

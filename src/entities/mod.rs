//! Entity module - Contains all SeaORM entity definitions for the store.
//! These entities represent the persisted collections and carry no owning
//! relationships: every cross-entity reference is a plain id field, looked up
//! on demand, so deleting a referenced record never cascades.

pub mod enrollment;
pub mod payment;
pub mod private_lesson;
pub mod recurring_series;
pub mod student;
pub mod teacher;

// Re-export specific types to avoid conflicts
pub use enrollment::{Column as EnrollmentColumn, Entity as Enrollment, Model as EnrollmentModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use private_lesson::{
    Column as PrivateLessonColumn, Entity as PrivateLesson, Model as PrivateLessonModel,
};
pub use recurring_series::{
    Column as RecurringSeriesColumn, Entity as RecurringSeries, Model as RecurringSeriesModel,
};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use teacher::{Column as TeacherColumn, Entity as Teacher, Model as TeacherModel};

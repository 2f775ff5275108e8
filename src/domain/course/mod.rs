//! Course catalog domain
//!
//! Courses carry a price in balance points and own lessons and groups.

mod entity;
mod repository;
mod validation;

pub use entity::{Course, CourseId, Group, GroupId, Lesson, LessonId};
pub use repository::{CourseRepository, GroupRepository, LessonRepository};
pub use validation::{
    validate_author, validate_link, validate_price, validate_title, CourseValidationError,
};

#[cfg(test)]
pub use repository::MockCourseRepository;

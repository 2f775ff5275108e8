//! Catalog repository traits

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Course, CourseId, Group, GroupId, Lesson, LessonId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository for courses
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn get(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// All courses, oldest first
    async fn list(&self) -> Result<Vec<Course>, DomainError>;

    async fn create(&self, course: Course) -> Result<Course, DomainError>;

    async fn update(&self, course: &Course) -> Result<Course, DomainError>;

    async fn delete(&self, id: &CourseId) -> Result<bool, DomainError>;
}

/// Repository for lessons, always scoped to their course
#[async_trait]
pub trait LessonRepository: Send + Sync + Debug {
    async fn get(&self, course_id: &CourseId, id: &LessonId) -> Result<Option<Lesson>, DomainError>;

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError>;

    async fn create(&self, lesson: Lesson) -> Result<Lesson, DomainError>;

    async fn update(&self, lesson: &Lesson) -> Result<Lesson, DomainError>;

    async fn delete(&self, course_id: &CourseId, id: &LessonId) -> Result<bool, DomainError>;

    /// Remove every lesson of a course, returning how many were removed
    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError>;
}

/// Repository for groups, always scoped to their course
#[async_trait]
pub trait GroupRepository: Send + Sync + Debug {
    async fn get(&self, course_id: &CourseId, id: &GroupId) -> Result<Option<Group>, DomainError>;

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError>;

    async fn create(&self, group: Group) -> Result<Group, DomainError>;

    async fn update(&self, group: &Group) -> Result<Group, DomainError>;

    async fn delete(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError>;

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError>;
}

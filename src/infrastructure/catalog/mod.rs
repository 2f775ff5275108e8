//! Catalog infrastructure: course, lesson and group storage and the catalog service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::{
    PostgresCourseRepository, PostgresGroupRepository, PostgresLessonRepository,
};
pub use repository::{InMemoryCourseRepository, InMemoryGroupRepository, InMemoryLessonRepository};
pub use service::{
    CatalogService, CreateCourseRequest, CreateGroupRequest, CreateLessonRequest,
    UpdateCourseRequest, UpdateGroupRequest, UpdateLessonRequest,
};

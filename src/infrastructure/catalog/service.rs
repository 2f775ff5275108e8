//! Catalog service - CRUD for courses and their lessons and groups

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::domain::course::{
    Course, CourseId, CourseRepository, CourseValidationError, Group, GroupId, GroupRepository,
    Lesson, LessonId, LessonRepository,
};
use crate::domain::subscription::SubscriptionRepository;
use crate::domain::DomainError;

/// Request to create a course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub author: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub price: i64,
}

/// Partial course update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub author: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroupRequest {
    pub title: Option<String>,
}

fn invalid(error: CourseValidationError) -> DomainError {
    DomainError::validation(error.to_string())
}

/// Catalog service over course, lesson, group and subscription storage
pub struct CatalogService<C, L, G, S>
where
    C: CourseRepository,
    L: LessonRepository,
    G: GroupRepository,
    S: SubscriptionRepository,
{
    courses: Arc<C>,
    lessons: Arc<L>,
    groups: Arc<G>,
    subscriptions: Arc<S>,
}

impl<C, L, G, S> CatalogService<C, L, G, S>
where
    C: CourseRepository,
    L: LessonRepository,
    G: GroupRepository,
    S: SubscriptionRepository,
{
    pub fn new(courses: Arc<C>, lessons: Arc<L>, groups: Arc<G>, subscriptions: Arc<S>) -> Self {
        Self {
            courses,
            lessons,
            groups,
            subscriptions,
        }
    }

    // Courses

    pub async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        self.courses.get(id).await
    }

    /// Get a course, returning an error if not found
    pub async fn require_course(&self, id: &CourseId) -> Result<Course, DomainError> {
        self.courses
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Course '{}' not found", id)))
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, DomainError> {
        self.courses.list().await
    }

    pub async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, DomainError> {
        let course = Course::new(
            CourseId::generate(),
            request.author.trim(),
            request.title.trim(),
            request.start_date,
            request.price,
        )
        .map_err(invalid)?;

        let course = self.courses.create(course).await?;
        info!(course_id = %course.id(), price = course.price(), "Course created");

        Ok(course)
    }

    pub async fn update_course(
        &self,
        id: &CourseId,
        request: UpdateCourseRequest,
    ) -> Result<Course, DomainError> {
        let mut course = self.require_course(id).await?;

        if let Some(author) = request.author {
            course.set_author(author.trim()).map_err(invalid)?;
        }

        if let Some(title) = request.title {
            course.set_title(title.trim()).map_err(invalid)?;
        }

        if let Some(start_date) = request.start_date {
            course.set_start_date(start_date);
        }

        if let Some(price) = request.price {
            course.set_price(price).map_err(invalid)?;
        }

        self.courses.update(&course).await
    }

    /// Delete a course with its lessons, groups and subscriptions
    pub async fn delete_course(&self, id: &CourseId) -> Result<bool, DomainError> {
        if self.courses.get(id).await?.is_none() {
            return Ok(false);
        }

        let subscriptions = self.subscriptions.delete_for_course(id).await?;
        let lessons = self.lessons.delete_for_course(id).await?;
        let groups = self.groups.delete_for_course(id).await?;
        let deleted = self.courses.delete(id).await?;

        info!(course_id = %id, subscriptions, lessons, groups, "Course deleted");

        Ok(deleted)
    }

    // Lessons

    pub async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        self.require_course(course_id).await?;
        self.lessons.list_for_course(course_id).await
    }

    pub async fn get_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
    ) -> Result<Lesson, DomainError> {
        self.lessons.get(course_id, id).await?.ok_or_else(|| {
            DomainError::not_found(format!("Lesson '{}' not found in course '{}'", id, course_id))
        })
    }

    pub async fn create_lesson(
        &self,
        course_id: &CourseId,
        request: CreateLessonRequest,
    ) -> Result<Lesson, DomainError> {
        self.require_course(course_id).await?;

        let lesson = Lesson::new(
            LessonId::generate(),
            *course_id,
            request.title.trim(),
            request.link.trim(),
        )
        .map_err(invalid)?;

        self.lessons.create(lesson).await
    }

    pub async fn update_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
        request: UpdateLessonRequest,
    ) -> Result<Lesson, DomainError> {
        let mut lesson = self.get_lesson(course_id, id).await?;

        if let Some(title) = request.title {
            lesson.set_title(title.trim()).map_err(invalid)?;
        }

        if let Some(link) = request.link {
            lesson.set_link(link.trim()).map_err(invalid)?;
        }

        self.lessons.update(&lesson).await
    }

    pub async fn delete_lesson(&self, course_id: &CourseId, id: &LessonId) -> Result<bool, DomainError> {
        self.lessons.delete(course_id, id).await
    }

    // Groups

    pub async fn list_groups(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError> {
        self.require_course(course_id).await?;
        self.groups.list_for_course(course_id).await
    }

    pub async fn get_group(&self, course_id: &CourseId, id: &GroupId) -> Result<Group, DomainError> {
        self.groups.get(course_id, id).await?.ok_or_else(|| {
            DomainError::not_found(format!("Group '{}' not found in course '{}'", id, course_id))
        })
    }

    pub async fn create_group(
        &self,
        course_id: &CourseId,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        self.require_course(course_id).await?;

        let group =
            Group::new(GroupId::generate(), *course_id, request.title.trim()).map_err(invalid)?;

        self.groups.create(group).await
    }

    pub async fn update_group(
        &self,
        course_id: &CourseId,
        id: &GroupId,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError> {
        let mut group = self.get_group(course_id, id).await?;

        if let Some(title) = request.title {
            group.set_title(title.trim()).map_err(invalid)?;
        }

        self.groups.update(&group).await
    }

    pub async fn delete_group(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError> {
        self.groups.delete(course_id, id).await
    }
}

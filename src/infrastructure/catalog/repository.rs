//! In-memory catalog repositories

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::course::{
    Course, CourseId, CourseRepository, Group, GroupId, GroupRepository, Lesson, LessonId,
    LessonRepository,
};
use crate::domain::DomainError;

/// In-memory implementation of CourseRepository
#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn get(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Course>, DomainError> {
        let mut courses: Vec<Course> = self.courses.read().await.values().cloned().collect();
        courses.sort_by_key(|c| c.created_at());
        Ok(courses)
    }

    async fn create(&self, course: Course) -> Result<Course, DomainError> {
        let mut courses = self.courses.write().await;

        if courses.contains_key(course.id()) {
            return Err(DomainError::conflict(format!(
                "Course '{}' already exists",
                course.id()
            )));
        }

        courses.insert(*course.id(), course.clone());
        Ok(course)
    }

    async fn update(&self, course: &Course) -> Result<Course, DomainError> {
        let mut courses = self.courses.write().await;

        match courses.get_mut(course.id()) {
            Some(existing) => {
                *existing = course.clone();
                Ok(course.clone())
            }
            None => Err(DomainError::not_found(format!(
                "Course '{}' not found",
                course.id()
            ))),
        }
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, DomainError> {
        Ok(self.courses.write().await.remove(id).is_some())
    }
}

/// Course-scoped child entity kept by the in-memory child repositories
trait CourseChild: Clone + Debug + Send + Sync {
    type Id: Copy + Eq + Hash + Display + Debug + Send + Sync;
    const LABEL: &'static str;

    fn child_id(&self) -> &Self::Id;
    fn parent(&self) -> &CourseId;
    fn created(&self) -> chrono::DateTime<chrono::Utc>;
}

impl CourseChild for Lesson {
    type Id = LessonId;
    const LABEL: &'static str = "Lesson";

    fn child_id(&self) -> &LessonId {
        self.id()
    }

    fn parent(&self) -> &CourseId {
        self.course_id()
    }

    fn created(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at()
    }
}

impl CourseChild for Group {
    type Id = GroupId;
    const LABEL: &'static str = "Group";

    fn child_id(&self) -> &GroupId {
        self.id()
    }

    fn parent(&self) -> &CourseId {
        self.course_id()
    }

    fn created(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at()
    }
}

#[derive(Debug)]
struct ChildTable<T: CourseChild> {
    rows: RwLock<HashMap<T::Id, T>>,
}

impl<T: CourseChild> Default for ChildTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: CourseChild> ChildTable<T> {
    async fn get(&self, course_id: &CourseId, id: &T::Id) -> Option<T> {
        self.rows
            .read()
            .await
            .get(id)
            .filter(|row| row.parent() == course_id)
            .cloned()
    }

    async fn list_for_course(&self, course_id: &CourseId) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.parent() == course_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created());
        rows
    }

    async fn create(&self, row: T) -> Result<T, DomainError> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(row.child_id()) {
            return Err(DomainError::conflict(format!(
                "{} '{}' already exists",
                T::LABEL,
                row.child_id()
            )));
        }

        rows.insert(*row.child_id(), row.clone());
        Ok(row)
    }

    async fn update(&self, row: &T) -> Result<T, DomainError> {
        let mut rows = self.rows.write().await;

        match rows.get_mut(row.child_id()) {
            Some(existing) if existing.parent() == row.parent() => {
                *existing = row.clone();
                Ok(row.clone())
            }
            _ => Err(DomainError::not_found(format!(
                "{} '{}' not found",
                T::LABEL,
                row.child_id()
            ))),
        }
    }

    async fn delete(&self, course_id: &CourseId, id: &T::Id) -> bool {
        let mut rows = self.rows.write().await;

        if rows.get(id).is_some_and(|row| row.parent() == course_id) {
            rows.remove(id);
            true
        } else {
            false
        }
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> u64 {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, row| row.parent() != course_id);
        (before - rows.len()) as u64
    }
}

/// In-memory implementation of LessonRepository
#[derive(Debug, Default)]
pub struct InMemoryLessonRepository {
    table: ChildTable<Lesson>,
}

impl InMemoryLessonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessonRepository {
    async fn get(&self, course_id: &CourseId, id: &LessonId) -> Result<Option<Lesson>, DomainError> {
        Ok(self.table.get(course_id, id).await)
    }

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        Ok(self.table.list_for_course(course_id).await)
    }

    async fn create(&self, lesson: Lesson) -> Result<Lesson, DomainError> {
        self.table.create(lesson).await
    }

    async fn update(&self, lesson: &Lesson) -> Result<Lesson, DomainError> {
        self.table.update(lesson).await
    }

    async fn delete(&self, course_id: &CourseId, id: &LessonId) -> Result<bool, DomainError> {
        Ok(self.table.delete(course_id, id).await)
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        Ok(self.table.delete_for_course(course_id).await)
    }
}

/// In-memory implementation of GroupRepository
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    table: ChildTable<Group>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn get(&self, course_id: &CourseId, id: &GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.table.get(course_id, id).await)
    }

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError> {
        Ok(self.table.list_for_course(course_id).await)
    }

    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        self.table.create(group).await
    }

    async fn update(&self, group: &Group) -> Result<Group, DomainError> {
        self.table.update(group).await
    }

    async fn delete(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError> {
        Ok(self.table.delete(course_id, id).await)
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        Ok(self.table.delete_for_course(course_id).await)
    }
}

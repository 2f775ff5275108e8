//! PostgreSQL catalog repositories

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::course::{
    Course, CourseId, CourseRepository, Group, GroupId, GroupRepository, Lesson, LessonId,
    LessonRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_foreign_key_violation;

fn storage_err(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::storage(format!("{}: {}", context, e))
}

fn missing_course(course_id: &CourseId) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| {
        if is_foreign_key_violation(&e) {
            DomainError::not_found(format!("Course '{}' not found", course_id))
        } else {
            DomainError::storage(format!("Failed to write catalog row: {}", e))
        }
    }
}

/// PostgreSQL implementation of CourseRepository
#[derive(Debug, Clone)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn get(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, author, title, start_date, price, created_at, updated_at
            FROM courses WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err("Failed to get course"))?;

        row.as_ref().map(row_to_course).transpose()
    }

    async fn list(&self) -> Result<Vec<Course>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, author, title, start_date, price, created_at, updated_at
            FROM courses ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("Failed to list courses"))?;

        rows.iter().map(row_to_course).collect()
    }

    async fn create(&self, course: Course) -> Result<Course, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, author, title, start_date, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*course.id().as_uuid())
        .bind(course.author())
        .bind(course.title())
        .bind(course.start_date())
        .bind(course.price())
        .bind(course.created_at())
        .bind(course.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to create course"))?;

        Ok(course)
    }

    async fn update(&self, course: &Course) -> Result<Course, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET author = $2, title = $3, start_date = $4, price = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(*course.id().as_uuid())
        .bind(course.author())
        .bind(course.title())
        .bind(course.start_date())
        .bind(course.price())
        .bind(course.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to update course"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Course '{}' not found",
                course.id()
            )));
        }

        Ok(course.clone())
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete course"))?;

        Ok(result.rows_affected() > 0)
    }
}

/// PostgreSQL implementation of LessonRepository
#[derive(Debug, Clone)]
pub struct PostgresLessonRepository {
    pool: PgPool,
}

impl PostgresLessonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for PostgresLessonRepository {
    async fn get(&self, course_id: &CourseId, id: &LessonId) -> Result<Option<Lesson>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, title, link, created_at, updated_at
            FROM lessons WHERE id = $1 AND course_id = $2
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err("Failed to get lesson"))?;

        row.as_ref().map(row_to_lesson).transpose()
    }

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, title, link, created_at, updated_at
            FROM lessons WHERE course_id = $1 ORDER BY created_at
            "#,
        )
        .bind(*course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("Failed to list lessons"))?;

        rows.iter().map(row_to_lesson).collect()
    }

    async fn create(&self, lesson: Lesson) -> Result<Lesson, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lessons (id, course_id, title, link, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*lesson.id().as_uuid())
        .bind(*lesson.course_id().as_uuid())
        .bind(lesson.title())
        .bind(lesson.link())
        .bind(lesson.created_at())
        .bind(lesson.updated_at())
        .execute(&self.pool)
        .await
        .map_err(missing_course(lesson.course_id()))?;

        Ok(lesson)
    }

    async fn update(&self, lesson: &Lesson) -> Result<Lesson, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE lessons SET title = $3, link = $4, updated_at = $5
            WHERE id = $1 AND course_id = $2
            "#,
        )
        .bind(*lesson.id().as_uuid())
        .bind(*lesson.course_id().as_uuid())
        .bind(lesson.title())
        .bind(lesson.link())
        .bind(lesson.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to update lesson"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Lesson '{}' not found",
                lesson.id()
            )));
        }

        Ok(lesson.clone())
    }

    async fn delete(&self, course_id: &CourseId, id: &LessonId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1 AND course_id = $2")
            .bind(*id.as_uuid())
            .bind(*course_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete lesson"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM lessons WHERE course_id = $1")
            .bind(*course_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete course lessons"))?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL implementation of GroupRepository
#[derive(Debug, Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn get(&self, course_id: &CourseId, id: &GroupId) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, title, created_at, updated_at
            FROM course_groups WHERE id = $1 AND course_id = $2
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err("Failed to get group"))?;

        row.as_ref().map(row_to_group).transpose()
    }

    async fn list_for_course(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, title, created_at, updated_at
            FROM course_groups WHERE course_id = $1 ORDER BY created_at
            "#,
        )
        .bind(*course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("Failed to list groups"))?;

        rows.iter().map(row_to_group).collect()
    }

    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO course_groups (id, course_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*group.id().as_uuid())
        .bind(*group.course_id().as_uuid())
        .bind(group.title())
        .bind(group.created_at())
        .bind(group.updated_at())
        .execute(&self.pool)
        .await
        .map_err(missing_course(group.course_id()))?;

        Ok(group)
    }

    async fn update(&self, group: &Group) -> Result<Group, DomainError> {
        let result = sqlx::query(
            "UPDATE course_groups SET title = $3, updated_at = $4 WHERE id = $1 AND course_id = $2",
        )
        .bind(*group.id().as_uuid())
        .bind(*group.course_id().as_uuid())
        .bind(group.title())
        .bind(group.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage_err("Failed to update group"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Group '{}' not found",
                group.id()
            )));
        }

        Ok(group.clone())
    }

    async fn delete(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM course_groups WHERE id = $1 AND course_id = $2")
            .bind(*id.as_uuid())
            .bind(*course_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete group"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM course_groups WHERE course_id = $1")
            .bind(*course_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete course groups"))?;

        Ok(result.rows_affected())
    }
}

fn row_to_course(row: &PgRow) -> Result<Course, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Malformed course row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let author: String = row.try_get("author").map_err(read)?;
    let title: String = row.try_get("title").map_err(read)?;
    let start_date: NaiveDate = row.try_get("start_date").map_err(read)?;
    let price: i64 = row.try_get("price").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Course::new(CourseId::from_uuid(id), author, title, start_date, price)
        .map(|course| course.with_timestamps(created_at, updated_at))
        .map_err(|e| DomainError::storage(format!("Invalid course '{}' in database: {}", id, e)))
}

fn row_to_lesson(row: &PgRow) -> Result<Lesson, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Malformed lesson row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let course_id: Uuid = row.try_get("course_id").map_err(read)?;
    let title: String = row.try_get("title").map_err(read)?;
    let link: String = row.try_get("link").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Lesson::new(LessonId::from_uuid(id), CourseId::from_uuid(course_id), title, link)
        .map(|lesson| lesson.with_timestamps(created_at, updated_at))
        .map_err(|e| DomainError::storage(format!("Invalid lesson '{}' in database: {}", id, e)))
}

fn row_to_group(row: &PgRow) -> Result<Group, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Malformed group row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let course_id: Uuid = row.try_get("course_id").map_err(read)?;
    let title: String = row.try_get("title").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Group::new(GroupId::from_uuid(id), CourseId::from_uuid(course_id), title)
        .map(|group| group.with_timestamps(created_at, updated_at))
        .map_err(|e| DomainError::storage(format!("Invalid group '{}' in database: {}", id, e)))
}

//! Catalog entities: courses and the lessons and groups they own

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_author, validate_link, validate_price, validate_title, CourseValidationError,
};
use crate::domain::id::uuid_id;

uuid_id!(
    /// Course identifier
    CourseId,
    "course"
);

uuid_id!(
    /// Lesson identifier
    LessonId,
    "lesson"
);

uuid_id!(
    /// Group identifier
    GroupId,
    "group"
);

/// A purchasable course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    author: String,
    title: String,
    start_date: NaiveDate,
    /// Price in balance points
    price: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(
        id: CourseId,
        author: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        price: i64,
    ) -> Result<Self, CourseValidationError> {
        let author = author.into();
        let title = title.into();

        validate_author(&author)?;
        validate_title(&title)?;
        validate_price(price)?;

        let now = Utc::now();

        Ok(Self {
            id,
            author,
            title,
            start_date,
            price,
            created_at: now,
            updated_at: now,
        })
    }

    /// Restore persisted timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> &CourseId {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<(), CourseValidationError> {
        let author = author.into();
        validate_author(&author)?;
        self.author = author;
        self.touch();
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CourseValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.touch();
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
        self.touch();
    }

    pub fn set_price(&mut self, price: i64) -> Result<(), CourseValidationError> {
        validate_price(price)?;
        self.price = price;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A lesson belonging to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    course_id: CourseId,
    title: String,
    link: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(
        id: LessonId,
        course_id: CourseId,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, CourseValidationError> {
        let title = title.into();
        let link = link.into();

        validate_title(&title)?;
        validate_link(&link)?;

        let now = Utc::now();

        Ok(Self {
            id,
            course_id,
            title,
            link,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> &LessonId {
        &self.id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CourseValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_link(&mut self, link: impl Into<String>) -> Result<(), CourseValidationError> {
        let link = link.into();
        validate_link(&link)?;
        self.link = link;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A study group belonging to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    course_id: CourseId,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(
        id: GroupId,
        course_id: CourseId,
        title: impl Into<String>,
    ) -> Result<Self, CourseValidationError> {
        let title = title.into();
        validate_title(&title)?;

        let now = Utc::now();

        Ok(Self {
            id,
            course_id,
            title,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CourseValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_course_creation() {
        let course = Course::new(CourseId::generate(), "Guido", "Python Basics", start(), 300).unwrap();

        assert_eq!(course.title(), "Python Basics");
        assert_eq!(course.author(), "Guido");
        assert_eq!(course.price(), 300);
        assert_eq!(course.start_date(), start());
    }

    #[test]
    fn test_course_rejects_negative_price() {
        let result = Course::new(CourseId::generate(), "Guido", "Python", start(), -1);
        assert_eq!(result.unwrap_err(), CourseValidationError::NegativePrice(-1));
    }

    #[test]
    fn test_course_setters_validate() {
        let mut course = Course::new(CourseId::generate(), "Guido", "Python", start(), 0).unwrap();

        assert!(course.set_price(-10).is_err());
        assert_eq!(course.price(), 0);

        course.set_price(1500).unwrap();
        course.set_title("Advanced Python").unwrap();
        assert_eq!(course.price(), 1500);
        assert_eq!(course.title(), "Advanced Python");
        assert!(course.set_title("").is_err());
    }

    #[test]
    fn test_lesson_creation() {
        let course_id = CourseId::generate();
        let lesson = Lesson::new(
            LessonId::generate(),
            course_id,
            "Variables",
            "https://video.example.com/variables",
        )
        .unwrap();

        assert_eq!(lesson.course_id(), &course_id);
        assert_eq!(lesson.link(), "https://video.example.com/variables");
    }

    #[test]
    fn test_lesson_rejects_bad_link() {
        let result = Lesson::new(LessonId::generate(), CourseId::generate(), "Intro", "ftp://x");
        assert!(matches!(result, Err(CourseValidationError::InvalidLink)));
    }

    #[test]
    fn test_group_creation_and_rename() {
        let mut group = Group::new(GroupId::generate(), CourseId::generate(), "Group 1").unwrap();
        group.set_title("Evening group").unwrap();
        assert_eq!(group.title(), "Evening group");
    }
}

//! Catalog validation

use thiserror::Error;

/// Errors that can occur during course, lesson or group validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CourseValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title cannot exceed {0} characters")]
    TitleTooLong(usize),

    #[error("Author cannot be empty")]
    EmptyAuthor,

    #[error("Author cannot exceed {0} characters")]
    AuthorTooLong(usize),

    #[error("Price cannot be negative: {0}")]
    NegativePrice(i64),

    #[error("Link must be an http(s) URL")]
    InvalidLink,

    #[error("Link cannot exceed {0} characters")]
    LinkTooLong(usize),
}

const MAX_TITLE_LENGTH: usize = 250;
const MAX_AUTHOR_LENGTH: usize = 250;
const MAX_LINK_LENGTH: usize = 250;

/// Validate a course, lesson or group title
pub fn validate_title(title: &str) -> Result<(), CourseValidationError> {
    if title.trim().is_empty() {
        return Err(CourseValidationError::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CourseValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}

/// Validate a course author
pub fn validate_author(author: &str) -> Result<(), CourseValidationError> {
    if author.trim().is_empty() {
        return Err(CourseValidationError::EmptyAuthor);
    }

    if author.chars().count() > MAX_AUTHOR_LENGTH {
        return Err(CourseValidationError::AuthorTooLong(MAX_AUTHOR_LENGTH));
    }

    Ok(())
}

/// Validate a course price
pub fn validate_price(price: i64) -> Result<(), CourseValidationError> {
    if price < 0 {
        return Err(CourseValidationError::NegativePrice(price));
    }

    Ok(())
}

/// Validate a lesson link
pub fn validate_link(link: &str) -> Result<(), CourseValidationError> {
    if link.len() > MAX_LINK_LENGTH {
        return Err(CourseValidationError::LinkTooLong(MAX_LINK_LENGTH));
    }

    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .ok_or(CourseValidationError::InvalidLink)?;

    if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
        return Err(CourseValidationError::InvalidLink);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Rust for beginners").is_ok());
        assert_eq!(validate_title(""), Err(CourseValidationError::EmptyTitle));
        assert_eq!(validate_title("  "), Err(CourseValidationError::EmptyTitle));
        assert_eq!(
            validate_title(&"a".repeat(251)),
            Err(CourseValidationError::TitleTooLong(250))
        );
    }

    #[test]
    fn test_validate_author() {
        assert!(validate_author("Jane Doe").is_ok());
        assert_eq!(validate_author(""), Err(CourseValidationError::EmptyAuthor));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(1200).is_ok());
        assert_eq!(validate_price(-1), Err(CourseValidationError::NegativePrice(-1)));
    }

    #[test]
    fn test_validate_link() {
        assert!(validate_link("https://example.com/lesson/1").is_ok());
        assert!(validate_link("http://example.com").is_ok());
        assert_eq!(validate_link("example.com"), Err(CourseValidationError::InvalidLink));
        assert_eq!(validate_link("https://"), Err(CourseValidationError::InvalidLink));
        assert_eq!(
            validate_link("https://exa mple.com"),
            Err(CourseValidationError::InvalidLink)
        );
    }
}

//! User domain
//!
//! User accounts, their validation rules, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{normalize_email, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_name, validate_password, validate_username, UserValidationError,
};

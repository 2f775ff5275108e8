//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::uuid_id;

uuid_id!(
    /// User identifier
    UserId,
    "user"
);

/// User account. Regular users are students; `is_staff` marks administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    /// Login identifier, unique across users
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    is_staff: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active, non-staff user
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: normalize_email(&email.into()),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Mark the user as staff (administrator)
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    /// Restore persisted flags and timestamps
    pub fn with_state(
        mut self,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        last_login_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.is_active = is_active;
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.last_login_at = last_login_at;
        self
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    /// "First Last", falling back to the username when both names are blank
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();

        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    // Mutators

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    pub fn set_staff(&mut self, is_staff: bool) {
        self.is_staff = is_staff;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new(
            UserId::generate(),
            "Student@Example.com",
            "student",
            "Ivan",
            "Petrov",
            "hashed_password",
        )
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.email(), "student@example.com");
        assert_eq!(user.username(), "student");
        assert!(user.is_active());
        assert!(!user.is_staff());
        assert!(user.last_login_at().is_none());
    }

    #[test]
    fn test_full_name() {
        let user = create_test_user();
        assert_eq!(user.full_name(), "Ivan Petrov");
        assert_eq!(user.to_string(), "Ivan Petrov");

        let nameless = User::new(UserId::generate(), "a@b.io", "nameless", "", "", "h");
        assert_eq!(nameless.full_name(), "nameless");
    }

    #[test]
    fn test_staff_flag() {
        let admin = create_test_user().with_staff(true);
        assert!(admin.is_staff());

        let mut user = create_test_user();
        user.set_staff(true);
        assert!(user.is_staff());
    }

    #[test]
    fn test_deactivate_and_activate() {
        let mut user = create_test_user();

        user.deactivate();
        assert!(!user.is_active());

        user.activate();
        assert!(user.is_active());
    }

    #[test]
    fn test_update_password() {
        let mut user = create_test_user();
        let original_updated = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_password_hash("new_hash");
        assert_eq!(user.password_hash(), "new_hash");
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_serialization_excludes_password() {
        let user = create_test_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
    }
}

//! UUID-backed entity identifiers

/// Defines a UUID newtype identifier with parsing, display and serde support.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            /// Parse an identifier from its string form
            pub fn parse(id: &str) -> Result<Self, $crate::domain::DomainError> {
                uuid::Uuid::parse_str(id.trim()).map(Self).map_err(|_| {
                    $crate::domain::DomainError::invalid_id(format!(
                        "'{}' is not a valid {} ID",
                        id, $label
                    ))
                })
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_id;

#[cfg(test)]
mod tests {
    use crate::domain::course::CourseId;
    use crate::domain::user::UserId;

    #[test]
    fn test_parse_roundtrips_display() {
        let id = CourseId::generate();
        let parsed = CourseId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = UserId::parse("not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("not a valid user ID"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = UserId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}

use crate::domain::course::CourseId;
use crate::domain::user::User;
use crate::domain::DomainError;

/// What a request wants to do with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
    /// Purchase access to a course
    Pay,
}

/// Capability class an action requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
    Admin,
}

impl Action {
    pub fn capability(self) -> Capability {
        match self {
            Self::List | Self::Retrieve | Self::Pay => Capability::Read,
            Self::Create | Self::Update | Self::Destroy => Capability::Write,
        }
    }

    pub fn is_read(self) -> bool {
        self.capability() == Capability::Read
    }
}

/// The identity a request is made under
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    Authenticated(User),
}

impl Caller {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_staff())
    }

    /// Whether the caller holds a capability outright, without object context
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => true,
            Capability::Write => self.is_authenticated(),
            Capability::Admin => self.is_admin(),
        }
    }

    /// The error to report when a policy denies this caller
    pub fn denied(&self, message: impl Into<String>) -> DomainError {
        if self.is_authenticated() {
            DomainError::permission_denied(message)
        } else {
            DomainError::unauthenticated(message)
        }
    }
}

/// The course an object-level check is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTarget {
    pub course_id: CourseId,
    /// Whether the caller holds a subscription to the course
    pub subscribed: bool,
}

impl AccessTarget {
    pub fn new(course_id: CourseId, subscribed: bool) -> Self {
        Self {
            course_id,
            subscribed,
        }
    }
}

/// A permission policy. `has_permission` is checked for every request,
/// `has_object_permission` additionally when a specific course is addressed.
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn has_permission(&self, caller: &Caller, action: Action) -> bool;

    fn has_object_permission(
        &self,
        caller: &Caller,
        action: Action,
        _target: &AccessTarget,
    ) -> bool {
        self.has_permission(caller, action)
    }

    /// Collection-level check as a `Result`
    fn authorize(&self, caller: &Caller, action: Action) -> Result<(), DomainError> {
        if self.has_permission(caller, action) {
            Ok(())
        } else {
            Err(caller.denied(format!("{} denies {:?}", self.name(), action)))
        }
    }

    /// Collection-level then object-level check as a `Result`
    fn authorize_object(
        &self,
        caller: &Caller,
        action: Action,
        target: &AccessTarget,
    ) -> Result<(), DomainError> {
        self.authorize(caller, action)?;

        if self.has_object_permission(caller, action, target) {
            Ok(())
        } else {
            Err(caller.denied(format!(
                "{} denies {:?} on course {}",
                self.name(),
                action,
                target.course_id
            )))
        }
    }
}

/// Admins always pass; others must be authenticated and subscribed to the course
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriberOrAdmin;

impl AccessPolicy for SubscriberOrAdmin {
    fn name(&self) -> &'static str {
        "subscriber-or-admin"
    }

    fn has_permission(&self, caller: &Caller, _action: Action) -> bool {
        caller.is_admin() || caller.is_authenticated()
    }

    fn has_object_permission(
        &self,
        caller: &Caller,
        _action: Action,
        target: &AccessTarget,
    ) -> bool {
        caller.is_admin() || (caller.is_authenticated() && target.subscribed)
    }
}

/// Admins may do anything; everyone else may only read
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyOrAdmin;

impl AccessPolicy for ReadOnlyOrAdmin {
    fn name(&self) -> &'static str {
        "read-only-or-admin"
    }

    fn has_permission(&self, caller: &Caller, action: Action) -> bool {
        caller.has_capability(Capability::Admin) || action.is_read()
    }
}

/// Only admins
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

impl AccessPolicy for AdminOnly {
    fn name(&self) -> &'static str {
        "admin-only"
    }

    fn has_permission(&self, caller: &Caller, _action: Action) -> bool {
        caller.has_capability(Capability::Admin)
    }
}

/// Any authenticated caller
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl AccessPolicy for Authenticated {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    fn has_permission(&self, caller: &Caller, _action: Action) -> bool {
        caller.is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    const ALL_ACTIONS: [Action; 6] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Destroy,
        Action::Pay,
    ];

    fn student() -> Caller {
        Caller::Authenticated(User::new(
            UserId::generate(),
            "student@example.com",
            "student",
            "Ivan",
            "Petrov",
            "hash",
        ))
    }

    fn admin() -> Caller {
        Caller::Authenticated(
            User::new(UserId::generate(), "admin@example.com", "admin", "A", "B", "hash")
                .with_staff(true),
        )
    }

    fn target(subscribed: bool) -> AccessTarget {
        AccessTarget::new(CourseId::generate(), subscribed)
    }

    #[test]
    fn test_action_capabilities() {
        assert!(Action::List.is_read());
        assert!(Action::Retrieve.is_read());
        assert!(Action::Pay.is_read());
        assert_eq!(Action::Create.capability(), Capability::Write);
        assert_eq!(Action::Destroy.capability(), Capability::Write);
    }

    #[test]
    fn test_read_only_or_admin_denies_non_admin_writes() {
        for caller in [Caller::Anonymous, student()] {
            for action in [Action::Create, Action::Update, Action::Destroy] {
                assert!(!ReadOnlyOrAdmin.has_permission(&caller, action));
                assert!(!ReadOnlyOrAdmin.has_object_permission(&caller, action, &target(true)));
            }
        }
    }

    #[test]
    fn test_read_only_or_admin_allows_reads_for_anyone() {
        for caller in [Caller::Anonymous, student(), admin()] {
            assert!(ReadOnlyOrAdmin.has_permission(&caller, Action::List));
            assert!(ReadOnlyOrAdmin.has_permission(&caller, Action::Retrieve));
        }
    }

    #[test]
    fn test_read_only_or_admin_allows_admin_everything() {
        for action in ALL_ACTIONS {
            assert!(ReadOnlyOrAdmin.has_permission(&admin(), action));
        }
    }

    #[test]
    fn test_subscriber_or_admin() {
        let anon = Caller::Anonymous;
        assert!(!SubscriberOrAdmin.has_permission(&anon, Action::List));
        assert!(!SubscriberOrAdmin.has_object_permission(&anon, Action::Retrieve, &target(true)));

        let student = student();
        assert!(SubscriberOrAdmin.has_permission(&student, Action::List));
        assert!(SubscriberOrAdmin.has_object_permission(&student, Action::Retrieve, &target(true)));
        assert!(!SubscriberOrAdmin.has_object_permission(&student, Action::Retrieve, &target(false)));

        for action in ALL_ACTIONS {
            assert!(SubscriberOrAdmin.has_object_permission(&admin(), action, &target(false)));
        }
    }

    #[test]
    fn test_admin_only() {
        assert!(!AdminOnly.has_permission(&Caller::Anonymous, Action::List));
        assert!(!AdminOnly.has_permission(&student(), Action::List));
        assert!(AdminOnly.has_permission(&admin(), Action::Destroy));
    }

    #[test]
    fn test_authenticated() {
        assert!(!Authenticated.has_permission(&Caller::Anonymous, Action::Pay));
        assert!(Authenticated.has_permission(&student(), Action::Pay));
    }

    #[test]
    fn test_object_check_falls_back_to_collection_check() {
        for subscribed in [true, false] {
            let target = target(subscribed);
            assert!(AdminOnly.has_object_permission(&admin(), Action::Update, &target));
            assert!(!AdminOnly.has_object_permission(&student(), Action::Retrieve, &target));
            assert!(Authenticated.has_object_permission(&student(), Action::Pay, &target));
            assert!(!Authenticated.has_object_permission(&Caller::Anonymous, Action::Pay, &target));
        }
    }

    #[test]
    fn test_denial_error_depends_on_caller() {
        let err = AdminOnly.authorize(&Caller::Anonymous, Action::List).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated { .. }));

        let err = AdminOnly.authorize(&student(), Action::List).unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }

    #[test]
    fn test_authorize_object_checks_both_levels() {
        let student = student();
        assert!(SubscriberOrAdmin
            .authorize_object(&student, Action::Retrieve, &target(true))
            .is_ok());

        let err = SubscriberOrAdmin
            .authorize_object(&student, Action::Retrieve, &target(false))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }
}

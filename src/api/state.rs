//! Application state for shared services

use std::sync::Arc;

use crate::domain::course::{CourseRepository, GroupRepository, LessonRepository};
use crate::domain::subscription::SubscriptionRepository;
use crate::domain::{
    Balance, BillingStore, Course, CourseId, DomainError, Group, GroupId, Lesson, LessonId,
    PurchaseReceipt, Subscription, User, UserId, UserRepository,
};
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::billing::BillingService;
use crate::infrastructure::catalog::{
    CatalogService, CreateCourseRequest, CreateGroupRequest, CreateLessonRequest,
    UpdateCourseRequest, UpdateGroupRequest, UpdateLessonRequest,
};
use crate::infrastructure::user::{CreateUserRequest, PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
    pub billing_service: Arc<dyn BillingServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

/// Trait for account operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Self-service signup, never grants staff
    async fn register(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;
}

/// Trait for course, lesson and group operations
#[async_trait::async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;
    /// Like `get_course` but `NotFound` when missing
    async fn require_course(&self, id: &CourseId) -> Result<Course, DomainError>;
    async fn list_courses(&self) -> Result<Vec<Course>, DomainError>;
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, DomainError>;
    async fn update_course(
        &self,
        id: &CourseId,
        request: UpdateCourseRequest,
    ) -> Result<Course, DomainError>;
    async fn delete_course(&self, id: &CourseId) -> Result<bool, DomainError>;

    async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError>;
    async fn get_lesson(&self, course_id: &CourseId, id: &LessonId)
        -> Result<Lesson, DomainError>;
    async fn create_lesson(
        &self,
        course_id: &CourseId,
        request: CreateLessonRequest,
    ) -> Result<Lesson, DomainError>;
    async fn update_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
        request: UpdateLessonRequest,
    ) -> Result<Lesson, DomainError>;
    async fn delete_lesson(&self, course_id: &CourseId, id: &LessonId)
        -> Result<bool, DomainError>;

    async fn list_groups(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError>;
    async fn get_group(&self, course_id: &CourseId, id: &GroupId) -> Result<Group, DomainError>;
    async fn create_group(
        &self,
        course_id: &CourseId,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError>;
    async fn update_group(
        &self,
        course_id: &CourseId,
        id: &GroupId,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError>;
    async fn delete_group(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError>;
}

/// Trait for balance, purchase and subscription operations
#[async_trait::async_trait]
pub trait BillingServiceTrait: Send + Sync {
    async fn purchase(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<PurchaseReceipt, DomainError>;
    async fn balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError>;
    async fn deposit(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError>;
    async fn subscriptions(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError>;
    async fn is_subscribed(&self, user_id: &UserId, course_id: &CourseId)
        -> Result<bool, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R, B, H> UserServiceTrait for UserService<R, B, H>
where
    R: UserRepository + 'static,
    B: BillingStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, email, password).await
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<C, L, G, S> CatalogServiceTrait for CatalogService<C, L, G, S>
where
    C: CourseRepository + 'static,
    L: LessonRepository + 'static,
    G: GroupRepository + 'static,
    S: SubscriptionRepository + 'static,
{
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        CatalogService::get_course(self, id).await
    }

    async fn require_course(&self, id: &CourseId) -> Result<Course, DomainError> {
        CatalogService::require_course(self, id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DomainError> {
        CatalogService::list_courses(self).await
    }

    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, DomainError> {
        CatalogService::create_course(self, request).await
    }

    async fn update_course(
        &self,
        id: &CourseId,
        request: UpdateCourseRequest,
    ) -> Result<Course, DomainError> {
        CatalogService::update_course(self, id, request).await
    }

    async fn delete_course(&self, id: &CourseId) -> Result<bool, DomainError> {
        CatalogService::delete_course(self, id).await
    }

    async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        CatalogService::list_lessons(self, course_id).await
    }

    async fn get_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
    ) -> Result<Lesson, DomainError> {
        CatalogService::get_lesson(self, course_id, id).await
    }

    async fn create_lesson(
        &self,
        course_id: &CourseId,
        request: CreateLessonRequest,
    ) -> Result<Lesson, DomainError> {
        CatalogService::create_lesson(self, course_id, request).await
    }

    async fn update_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
        request: UpdateLessonRequest,
    ) -> Result<Lesson, DomainError> {
        CatalogService::update_lesson(self, course_id, id, request).await
    }

    async fn delete_lesson(
        &self,
        course_id: &CourseId,
        id: &LessonId,
    ) -> Result<bool, DomainError> {
        CatalogService::delete_lesson(self, course_id, id).await
    }

    async fn list_groups(&self, course_id: &CourseId) -> Result<Vec<Group>, DomainError> {
        CatalogService::list_groups(self, course_id).await
    }

    async fn get_group(&self, course_id: &CourseId, id: &GroupId) -> Result<Group, DomainError> {
        CatalogService::get_group(self, course_id, id).await
    }

    async fn create_group(
        &self,
        course_id: &CourseId,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        CatalogService::create_group(self, course_id, request).await
    }

    async fn update_group(
        &self,
        course_id: &CourseId,
        id: &GroupId,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError> {
        CatalogService::update_group(self, course_id, id, request).await
    }

    async fn delete_group(&self, course_id: &CourseId, id: &GroupId) -> Result<bool, DomainError> {
        CatalogService::delete_group(self, course_id, id).await
    }
}

#[async_trait::async_trait]
impl<B, C> BillingServiceTrait for BillingService<B, C>
where
    B: BillingStore + 'static,
    C: CourseRepository + 'static,
{
    async fn purchase(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<PurchaseReceipt, DomainError> {
        BillingService::purchase(self, user_id, course_id).await
    }

    async fn balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError> {
        BillingService::balance(self, user_id).await
    }

    async fn deposit(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError> {
        BillingService::deposit(self, user_id, amount).await
    }

    async fn subscriptions(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        BillingService::subscriptions(self, user_id).await
    }

    async fn is_subscribed(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        BillingService::is_subscribed(self, user_id, course_id).await
    }
}

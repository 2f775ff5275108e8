//! Course Marketplace API
//!
//! Users browse a course catalog, buy access with an internal point balance
//! and gain subscriptions that unlock a course's lessons:
//! - Atomic purchase of a course (balance check, deduction, subscription)
//! - Per-course access policies for lessons and groups
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

use api::state::{AppState, UserServiceTrait};
use config::StorageBackend;
use infrastructure::{
    auth::{JwtConfig, JwtService},
    billing::{BillingService, InMemoryBillingStore, PostgresBillingStore},
    catalog::{
        CatalogService, InMemoryCourseRepository, InMemoryGroupRepository,
        InMemoryLessonRepository, PostgresCourseRepository, PostgresGroupRepository,
        PostgresLessonRepository,
    },
    storage::{connect_pool, run_migrations},
    user::{
        generate_password, Argon2Hasher, CreateUserRequest, InMemoryUserRepository,
        PostgresUserRepository, UserService,
    },
};

const GENERATED_SECRET_LEN: usize = 48;

/// Create the application state with default configuration (in-memory storage)
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt_secret = match &config.auth.jwt_secret {
        Some(secret) if !secret.is_empty() => secret.clone(),
        _ => {
            warn!("No auth.jwt_secret configured, generating one; tokens will not survive a restart");
            generate_secret()
        }
    };
    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        jwt_secret,
        u64::from(config.auth.jwt_expiration_hours),
    )));

    info!("Storage backend: {:?}", config.storage.backend);

    let state = match config.storage.backend {
        StorageBackend::Memory => in_memory_state(config, jwt_service),
        StorageBackend::Postgres => postgres_state(config, jwt_service).await?,
    };

    ensure_initial_admin(state.user_service.as_ref(), &config.auth.admin_email).await?;

    Ok(state)
}

fn in_memory_state(config: &AppConfig, jwt_service: Arc<JwtService>) -> AppState {
    let initial_balance = config.billing.initial_balance;

    let billing_store = Arc::new(InMemoryBillingStore::new());
    let courses = Arc::new(InMemoryCourseRepository::new());

    AppState {
        user_service: Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            billing_store.clone(),
            Arc::new(Argon2Hasher::new()),
            initial_balance,
        )),
        catalog_service: Arc::new(CatalogService::new(
            courses.clone(),
            Arc::new(InMemoryLessonRepository::new()),
            Arc::new(InMemoryGroupRepository::new()),
            billing_store.clone(),
        )),
        billing_service: Arc::new(BillingService::new(billing_store, courses, initial_balance)),
        jwt_service,
    }
}

async fn postgres_state(
    config: &AppConfig,
    jwt_service: Arc<JwtService>,
) -> anyhow::Result<AppState> {
    let database_url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for the postgres backend"))?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(database_url, config.storage.max_connections).await?;

    let applied = run_migrations(&pool).await?;
    info!(applied, "Database migrations checked");

    let initial_balance = config.billing.initial_balance;
    let billing_store = Arc::new(PostgresBillingStore::new(pool.clone()));
    let courses = Arc::new(PostgresCourseRepository::new(pool.clone()));

    Ok(AppState {
        user_service: Arc::new(UserService::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            billing_store.clone(),
            Arc::new(Argon2Hasher::new()),
            initial_balance,
        )),
        catalog_service: Arc::new(CatalogService::new(
            courses.clone(),
            Arc::new(PostgresLessonRepository::new(pool.clone())),
            Arc::new(PostgresGroupRepository::new(pool)),
            billing_store.clone(),
        )),
        billing_service: Arc::new(BillingService::new(billing_store, courses, initial_balance)),
        jwt_service,
    })
}

/// Create an admin account when no users exist yet.
///
/// The generated password is logged once; it is not stored anywhere else.
pub async fn ensure_initial_admin(
    users: &dyn UserServiceTrait,
    admin_email: &str,
) -> anyhow::Result<()> {
    if users.count().await? > 0 {
        return Ok(());
    }

    let password = generate_password();
    let admin = users
        .create(CreateUserRequest {
            email: admin_email.to_string(),
            username: "admin".to_string(),
            first_name: "Site".to_string(),
            last_name: "Administrator".to_string(),
            password: password.clone(),
            is_staff: true,
        })
        .await?;

    warn!(
        user_id = %admin.id(),
        email = %admin.email(),
        password = %password,
        "Created initial admin account, change this password"
    );

    Ok(())
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

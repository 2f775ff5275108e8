//! Infrastructure layer - Storage backends, services and observability

pub mod auth;
pub mod billing;
pub mod catalog;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod user;

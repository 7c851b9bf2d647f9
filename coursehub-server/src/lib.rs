//! Coursehub course service
//!
//! HTTP backend for an online course marketplace: course authoring, the
//! per-student progress ledger with its denormalized enrollment stats,
//! publish-eligibility checks, reviews and announcements.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::TokenKeys;
pub use config::Config;
pub use error::ApiError;
pub use notify::{ConsoleNotifier, Notifier};
pub use state::AppState;
pub use store::{
    CourseStore, InMemoryStore, ProgressStore, ReviewStore, SqliteStore, Store, UserStore,
};

//! Users Domain
//!
//! User management with declarative list filtering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, Actor from JWT claims
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Policy checks, password hashing, filter translation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory/Postgres implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, pagination
//! └─────────────┘
//! ```
//!
//! # Filtering
//!
//! `GET /users?currentteamid=3&name=Ann` is translated by
//! [`filter::user_filter`] into predicates; parameters outside the
//! whitelist are dropped silently.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     password::Argon2Hasher,
//!     policy::RolePolicy,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let service = UserService::new(InMemoryUserRepository::new(), Argon2Hasher, RolePolicy);
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod password;
pub mod policy;
pub mod postgres_repository;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use filter::user_filter;
pub use models::{CreateUser, UpdateUser, User, UserResponse};
pub use pagination::{ListResponse, Page, PageRequest};
pub use password::{Argon2Hasher, PasswordHasher};
pub use policy::{Actor, RolePolicy, UserAction, UserPolicy};
pub use postgres_repository::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

//! PostgreSQL connection management, migrations, health and filter rendering

mod config;
mod connector;
mod health;
pub mod predicates;

pub use config::PostgresConfig;
pub use connector::{connect_from_config_with_retry, connect_with_options, run_migrations};
pub use health::check_health;
pub use predicates::{ColumnType, WhereClause, quote_ident, where_clause};

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;

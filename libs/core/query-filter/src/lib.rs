//! Declarative query-string filters.
//!
//! Translates a bag of caller-supplied query parameters into column
//! predicates, keeping only what a resource explicitly whitelists.
//!
//! # Key format
//!
//! - `name=Alice` compares `name` with the default `eq` operator
//! - `age_gt=30` and `age[gt]=30` compare `age` with the `gt` operator
//!
//! Parameters whose name or operator is not whitelisted are dropped without
//! error, so unrelated query-string keys (pagination, tracking) never break a
//! listing request.
//!
//! # Example
//!
//! ```rust
//! use query_filter::{Comparison, FilterConfig};
//!
//! let config = FilterConfig::builder()
//!     .param("name", &["eq"])
//!     .param("currentteamid", &["eq", "gt"])
//!     .column("currentteamid", "current_team_id")
//!     .build();
//!
//! let predicates = config.translate([("currentteamid_gt", "5"), ("page", "2")]);
//!
//! assert_eq!(predicates.len(), 1);
//! assert_eq!(predicates[0].column, "current_team_id");
//! assert_eq!(predicates[0].operator, Comparison::Gt);
//! assert_eq!(predicates[0].value, "5");
//! ```

mod config;
mod operator;
mod predicate;

pub use config::{DEFAULT_OPERATOR, FilterConfig, FilterConfigBuilder};
pub use operator::Comparison;
pub use predicate::Predicate;

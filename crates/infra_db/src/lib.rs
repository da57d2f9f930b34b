//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the domain ports, built on SQLx.
//!
//! - [`repositories::PostgresReclamationRepository`] implements
//!   `ReclamationPort`, with version compare-and-swap and a transactional
//!   commit of the row update together with its history entry.
//! - [`repositories::PostgresDashboardSource`] implements `DashboardSource`.
//!
//! Queries are checked at runtime (`query_as::<_, Row>`), so the crate builds
//! without a live database. The schema lives in `migrations/` and is applied
//! by [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::repositories::PostgresReclamationRepository;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/sav")).await?;
//! run_migrations(&pool).await?;
//! let repo = PostgresReclamationRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;

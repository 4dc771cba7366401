//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; only the repository, the pool, and the migration
//! runner are exported.
//!
//! # Examples
//!
//! ```no_run
//! use form_intake::outbound::persistence::{
//!     DbPool, DieselSubmissionRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://intake@localhost/forms";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let _repo = DieselSubmissionRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_submission_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_submission_repository::DieselSubmissionRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

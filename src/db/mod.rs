//! Database layer
//!
//! Storage for the blog backend. Two engines are supported:
//! - SQLite (default, single-file deployment)
//! - MySQL
//!
//! The engine is selected by configuration and hidden behind the
//! [`DatabasePool`] trait. Engine failure codes are turned into
//! engine-independent faults by [`classify`], so repositories never match on
//! SQLite or MySQL codes themselves.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! let posts = SqlxPostRepository::boxed(pool.clone());
//! ```

pub mod classify;
pub mod migrations;
pub mod pool;
pub mod repositories;

pub use classify::{classify, Failure, StorageFault};
pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};

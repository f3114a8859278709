//! # pgcriteria
//!
//! Criteria-driven repositories for PostgreSQL.
//!
//! Callers describe *what* they want as data (a criteria map, an order map, a
//! list of selections) and a [`Repository`] compiles it into a
//! [`QueryBuilder`], removes the duplicate joins and selects that repeated
//! composition tends to introduce, and executes it through any
//! [`GenericClient`].
//!
//! ## Features
//!
//! - **Shape-driven predicates**: `null` is ignored, lists become `IN`, the
//!   `"NULL"` / `"NOT NULL"` sentinels become nullability tests, scalars
//!   become equality
//! - **Named handlers**: every criterion, ordering and selection dispatches
//!   through a [`HandlerRegistry`]
//! - **Soft-delete default**: entities with a status column exclude deleted
//!   rows unless the caller filters on status explicitly
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient`
//!   is expected
//!
//! ## Example
//!
//! ```ignore
//! use pgcriteria::prelude::*;
//! use std::sync::Arc;
//!
//! let users: Repository<User> = Repository::new(
//!     HandlerRegistry::new()
//!         .field_criterion("name")
//!         .field_order("name")
//!         .select("profile", |qb| {
//!             qb.left_join("profiles", "p", "p.user_id = u.id").add_select("p");
//!             Ok(())
//!         }),
//!     Arc::new(schema),
//! );
//!
//! let qb = users.build_query(QueryOptions {
//!     select: vec!["profile".into()],
//!     criteria: criteria([("name", vec!["Al", "Bo"])]),
//!     order_by: orders([("name", "ASC")]),
//!     limit: Some(20),
//!     offset: None,
//! })?;
//! let page = users.fetch_all(&client, &qb).await?;
//! ```

pub mod client;
pub mod config;
pub mod criteria;
pub mod error;
pub mod prelude;
pub mod qb;
pub mod repository;
pub mod row;
pub mod schema;
pub mod sql;
pub mod value;

pub use client::GenericClient;
pub use config::RepositoryConfig;
pub use criteria::{Criteria, HandlerRegistry, Orders, criteria, orders};
pub use error::{OrmError, OrmResult};
pub use qb::{Join, QueryBuilder, SortDir};
pub use repository::{QueryOptions, Repository};
pub use row::{FromRow, RowExt};
pub use schema::{SchemaIntrospector, SchemaRegistry, TableMeta, TableSchema};
pub use sql::Sql;
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_env, create_pool_with_config};

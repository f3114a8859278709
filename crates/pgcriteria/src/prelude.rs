//! Convenient imports for typical `pgcriteria` usage.
//!
//! ```ignore
//! use pgcriteria::prelude::*;
//! ```

pub use crate::{
    Criteria, FromRow, GenericClient, HandlerRegistry, OrmError, OrmResult, Orders, QueryBuilder,
    QueryOptions, Repository, RepositoryConfig, RowExt, SchemaRegistry, SortDir, TableMeta, Value,
    criteria, orders,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};

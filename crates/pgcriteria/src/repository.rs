//! Criteria-driven repository facade.
//!
//! A [`Repository`] owns the handler registry and schema capability for one
//! entity type and runs the full compile pipeline:
//!
//! ```text
//! fetch_one:   augment → criteria → selects → dedup → execute (0 or 1 row)
//! fetch_many:  augment → criteria → orders → selects → dedup → execute
//! build_query: augment → selects → criteria → orders → limit/offset → dedup
//! ```
//!
//! Composition is synchronous and never touches the database; only the
//! `fetch_*` methods await the client.
//!
//! # Example
//!
//! ```ignore
//! use pgcriteria::{HandlerRegistry, Repository, SchemaRegistry, criteria, orders};
//! use std::sync::Arc;
//!
//! let mut schema = SchemaRegistry::new();
//! schema.register::<User>();
//!
//! let users: Repository<User> = Repository::new(
//!     HandlerRegistry::new().field_criterion("name").field_order("name"),
//!     Arc::new(schema),
//! );
//!
//! let (rows, _qb) = users
//!     .fetch_many(&client, criteria([("name", vec!["Al", "Bo"])]), &[] as &[&str], &orders([("name", "ASC")]))
//!     .await?;
//! ```

use crate::client::GenericClient;
use crate::config::RepositoryConfig;
use crate::criteria::{
    Criteria, HandlerRegistry, Orders, add_criteria, add_generic_criteria, add_order_bys,
    add_selects, clean_query_builder,
};
use crate::error::{OrmError, OrmResult};
use crate::qb::QueryBuilder;
use crate::row::FromRow;
use crate::schema::{SchemaIntrospector, TableMeta};
use crate::value::{NOT_NULL_SENTINEL, NULL_SENTINEL, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_postgres::Row;

/// Everything needed to compose a list query in one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    pub select: Vec<String>,
    pub criteria: Criteria,
    pub order_by: Orders,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Criteria-driven query facade for entity `E`.
pub struct Repository<E> {
    handlers: Arc<HandlerRegistry>,
    schema: Arc<dyn SchemaIntrospector>,
    config: RepositoryConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            schema: Arc::clone(&self.schema),
            config: self.config.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: TableMeta> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("table", &E::table_name())
            .field("alias", &E::alias())
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .finish()
    }
}

impl<E: FromRow + TableMeta> Repository<E> {
    /// Create a repository with the default [`RepositoryConfig`].
    pub fn new(handlers: HandlerRegistry, schema: Arc<dyn SchemaIntrospector>) -> Self {
        Self::with_config(handlers, schema, RepositoryConfig::default())
    }

    /// Create a repository.
    ///
    /// When the entity declares the status attribute, the status,
    /// excluded-status and status-ordering handlers are added unless
    /// `handlers` already provides them.
    pub fn with_config(
        handlers: HandlerRegistry,
        schema: Arc<dyn SchemaIntrospector>,
        config: RepositoryConfig,
    ) -> Self {
        let handlers = if schema.declares_attribute(E::table_name(), &config.status_field) {
            handlers.with_lifecycle_handlers(&config)
        } else {
            handlers
        };

        Self {
            handlers: Arc::new(handlers),
            schema,
            config,
            _entity: PhantomData,
        }
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// A fresh `SELECT <alias> FROM <table> <alias>` builder.
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(E::table_name(), E::alias())
    }

    /// Add the default soft-delete exclusion to `criteria` (see
    /// [`add_generic_criteria`]).
    pub fn add_generic_criteria(&self, criteria: Criteria) -> Criteria {
        add_generic_criteria(criteria, E::table_name(), self.schema.as_ref(), &self.config)
    }

    // ==================== composition ====================

    /// Compose the single-entity query without executing it.
    pub fn one_query_builder<S: AsRef<str>>(
        &self,
        criteria: Criteria,
        selects: &[S],
    ) -> OrmResult<QueryBuilder> {
        let criteria = self.add_generic_criteria(criteria);
        let mut qb = self.query_builder();
        add_criteria(&mut qb, &self.handlers, &criteria)?;
        add_selects(&mut qb, &self.handlers, selects)?;
        clean_query_builder(&mut qb)?;
        Ok(qb)
    }

    /// Compose the list query without executing it.
    pub fn many_query_builder<S: AsRef<str>>(
        &self,
        criteria: Criteria,
        selects: &[S],
        orders: &Orders,
    ) -> OrmResult<QueryBuilder> {
        let criteria = self.add_generic_criteria(criteria);
        let mut qb = self.query_builder();
        add_criteria(&mut qb, &self.handlers, &criteria)?;
        add_order_bys(&mut qb, &self.handlers, orders)?;
        add_selects(&mut qb, &self.handlers, selects)?;
        clean_query_builder(&mut qb)?;
        Ok(qb)
    }

    /// Compose selections, criteria, orderings and pagination in one call.
    ///
    /// The soft-delete default is applied first, as in `fetch_one` and
    /// `fetch_many`, so the builder excludes deleted rows unless `criteria`
    /// names the status field.
    pub fn build_query(&self, options: QueryOptions) -> OrmResult<QueryBuilder> {
        let QueryOptions {
            select,
            criteria,
            order_by,
            limit,
            offset,
        } = options;

        let criteria = self.add_generic_criteria(criteria);
        let mut qb = self.query_builder();
        add_selects(&mut qb, &self.handlers, &select)?;
        add_criteria(&mut qb, &self.handlers, &criteria)?;
        add_order_bys(&mut qb, &self.handlers, &order_by)?;
        qb.set_max_results(limit).set_first_result(offset);
        clean_query_builder(&mut qb)?;
        Ok(qb)
    }

    /// Compose the primary key lookup used by [`Repository::find_by_id`].
    pub fn id_query_builder(&self, id: Value) -> OrmResult<QueryBuilder> {
        let pk = E::primary_key().ok_or_else(|| {
            OrmError::configuration(format!("{} has no primary key", E::table_name()))
        })?;
        match &id {
            Value::Null | Value::List(_) => {
                return Err(OrmError::validation(format!(
                    "{}.{pk} lookup needs a scalar id",
                    E::table_name()
                )));
            }
            Value::Text(s) if s == NULL_SENTINEL || s == NOT_NULL_SENTINEL => {
                return Err(OrmError::validation(format!(
                    "{}.{pk} lookup cannot use the {s:?} sentinel",
                    E::table_name()
                )));
            }
            _ => {}
        }

        let alias = E::alias();
        let mut qb = self.query_builder();
        qb.and_where(format!("{alias}.{pk} = :{alias}_{pk}"))
            .set_parameter(format!("{alias}_{pk}"), id);
        Ok(qb)
    }

    // ==================== execution ====================

    /// Fetch at most one entity matching `criteria`.
    ///
    /// Returns `Ok(None)` when nothing matches and
    /// [`OrmError::TooManyRows`] when more than one row does.
    pub async fn fetch_one<S: AsRef<str>>(
        &self,
        conn: &impl GenericClient,
        criteria: Criteria,
        selects: &[S],
    ) -> OrmResult<Option<E>> {
        let qb = self.one_query_builder(criteria, selects)?;
        let rows = self.execute(conn, &qb).await?;
        one_or_none(rows)?.map(|row| E::from_row(&row)).transpose()
    }

    /// Fetch every entity matching `criteria`, returning the builder as well
    /// so the caller can compose further (pagination, extra joins, ...).
    pub async fn fetch_many<S: AsRef<str>>(
        &self,
        conn: &impl GenericClient,
        criteria: Criteria,
        selects: &[S],
        orders: &Orders,
    ) -> OrmResult<(Vec<E>, QueryBuilder)> {
        let qb = self.many_query_builder(criteria, selects, orders)?;
        let entities = self.fetch_all(conn, &qb).await?;
        Ok((entities, qb))
    }

    /// Execute any builder and map every row to `E`.
    pub async fn fetch_all(&self, conn: &impl GenericClient, qb: &QueryBuilder) -> OrmResult<Vec<E>> {
        let rows = self.execute(conn, qb).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Fetch one entity by primary key, without the soft-delete default.
    ///
    /// The id always binds as `<alias>.<pk> = :<alias>_<pk>`. Fails with a
    /// configuration error when the entity has no primary key and with a
    /// validation error for a null, list or sentinel id.
    pub async fn find_by_id(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
    ) -> OrmResult<Option<E>> {
        let qb = self.id_query_builder(id.into())?;
        let rows = self.execute(conn, &qb).await?;
        one_or_none(rows)?.map(|row| E::from_row(&row)).transpose()
    }

    async fn execute(&self, conn: &impl GenericClient, qb: &QueryBuilder) -> OrmResult<Vec<Row>> {
        let sql = qb.to_sql()?;
        let exec_sql = sql.to_sql();
        let params = sql.params_ref();

        tracing::debug!(
            target: "pgcriteria.sql",
            tag = E::table_name(),
            param_count = params.len(),
            sql = %truncate_sql(&exec_sql, self.config.max_sql_log_length),
            canonical_sql = %truncate_sql(&qb.to_string(), self.config.max_sql_log_length),
        );

        conn.query_tagged(E::table_name(), &exec_sql, &params).await
    }
}

/// Zero or one item; more is a multiplicity error.
pub(crate) fn one_or_none<T>(mut rows: Vec<T>) -> OrmResult<Option<T>> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        got => Err(OrmError::too_many_rows(1, got)),
    }
}

fn truncate_sql(sql: &str, max_bytes: usize) -> String {
    if sql.len() <= max_bytes {
        return sql.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}

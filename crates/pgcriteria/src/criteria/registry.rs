//! Name → handler dispatch tables for criteria, orderings and selections.
//!
//! Handlers are keyed by their constructed name (see
//! [`handler_name`](super::handler_name)): registering `"name"` as a criterion
//! stores it under `addCriterionName`. A registry is assembled once, then
//! shared read-only (usually behind an `Arc`) by every query a repository
//! composes.

use super::resolve::add_criterion;
use super::{CRITERION_PREFIX, ORDER_PREFIX, SELECT_PREFIX, handler_name};
use crate::config::RepositoryConfig;
use crate::error::{OrmError, OrmResult};
use crate::qb::{QueryBuilder, SortDir};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Applies one criterion value to a builder.
pub type CriterionHandler = Arc<dyn Fn(&mut QueryBuilder, &Value) -> OrmResult<()> + Send + Sync>;

/// Applies one ordering direction (raw, unvalidated text) to a builder.
pub type OrderHandler = Arc<dyn Fn(&mut QueryBuilder, &str) -> OrmResult<()> + Send + Sync>;

/// Applies one named selection (joins + selects) to a builder.
pub type SelectHandler = Arc<dyn Fn(&mut QueryBuilder) -> OrmResult<()> + Send + Sync>;

/// Read-only dispatch tables used by the criteria compiler and composers.
///
/// # Example
///
/// ```ignore
/// use pgcriteria::criteria::HandlerRegistry;
///
/// let handlers = HandlerRegistry::new()
///     .field_criterion("name")
///     .field_order("name")
///     .select("profile", |qb| {
///         qb.left_join("profiles", "p", "p.user_id = u.id").add_select("p");
///         Ok(())
///     });
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    criteria: HashMap<String, CriterionHandler>,
    orders: HashMap<String, OrderHandler>,
    selects: HashMap<String, SelectHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== registration ====================

    /// Register a criterion handler for `field`, replacing any previous one.
    pub fn criterion<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(&mut QueryBuilder, &Value) -> OrmResult<()> + Send + Sync + 'static,
    {
        self.criteria
            .insert(handler_name(CRITERION_PREFIX, field), Arc::new(handler));
        self
    }

    /// Register the generic equality / membership criterion on `<root>.<field>`.
    pub fn field_criterion(self, field: &str) -> Self {
        let column = field.to_string();
        self.criterion(field, move |qb, value| {
            let alias = qb.root_alias().to_string();
            add_criterion(qb, &alias, &column, value, false);
            Ok(())
        })
    }

    /// Register a criterion named `key` that *excludes* values of `<root>.<column>`.
    pub fn excluded_field_criterion(self, key: &str, column: &str) -> Self {
        let column = column.to_string();
        self.criterion(key, move |qb, value| {
            let alias = qb.root_alias().to_string();
            add_criterion(qb, &alias, &column, value, true);
            Ok(())
        })
    }

    /// Register an order handler for `field`, replacing any previous one.
    pub fn order<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(&mut QueryBuilder, &str) -> OrmResult<()> + Send + Sync + 'static,
    {
        self.orders
            .insert(handler_name(ORDER_PREFIX, field), Arc::new(handler));
        self
    }

    /// Register the generic ordering on `<root>.<field>`.
    ///
    /// The direction must be exactly `ASC` or `DESC`; anything else is a
    /// configuration error and nothing is appended.
    pub fn field_order(self, field: &str) -> Self {
        let column = field.to_string();
        self.order(field, move |qb, direction| {
            let dir = SortDir::parse(direction)?;
            let sort = format!("{}.{}", qb.root_alias(), column);
            qb.add_order_by(sort, dir);
            Ok(())
        })
    }

    /// Register a select handler for `alias`, replacing any previous one.
    pub fn select<F>(mut self, alias: &str, handler: F) -> Self
    where
        F: Fn(&mut QueryBuilder) -> OrmResult<()> + Send + Sync + 'static,
    {
        self.selects
            .insert(handler_name(SELECT_PREFIX, alias), Arc::new(handler));
        self
    }

    /// Add the lifecycle handlers (status include, status exclude, status
    /// ordering) unless a handler with the same name is already registered.
    pub fn with_lifecycle_handlers(mut self, config: &RepositoryConfig) -> Self {
        let status = config.status_field.as_str();
        let excluded = config.excluded_status_key.as_str();

        if !self.has_criterion(status) {
            self = self.field_criterion(status);
        }
        if !self.has_criterion(excluded) {
            self = self.excluded_field_criterion(excluded, status);
        }
        if !self.has_order(status) {
            self = self.field_order(status);
        }
        self
    }

    // ==================== lookup ====================

    pub fn has_criterion(&self, field: &str) -> bool {
        self.criteria
            .contains_key(&handler_name(CRITERION_PREFIX, field))
    }

    pub fn has_order(&self, field: &str) -> bool {
        self.orders.contains_key(&handler_name(ORDER_PREFIX, field))
    }

    pub fn has_select(&self, alias: &str) -> bool {
        self.selects.contains_key(&handler_name(SELECT_PREFIX, alias))
    }

    /// Handler for criterion `field`; a configuration error when none is registered.
    pub fn criterion_handler(&self, field: &str) -> OrmResult<&CriterionHandler> {
        let name = handler_name(CRITERION_PREFIX, field);
        self.criteria
            .get(&name)
            .ok_or_else(|| OrmError::configuration(format!("no handler named {name}")))
    }

    /// Handler for ordering `field`; a configuration error when none is registered.
    pub fn order_handler(&self, field: &str) -> OrmResult<&OrderHandler> {
        let name = handler_name(ORDER_PREFIX, field);
        self.orders
            .get(&name)
            .ok_or_else(|| OrmError::configuration(format!("no handler named {name}")))
    }

    /// Handler for selection `alias`, if any. Unregistered aliases are selected verbatim.
    pub fn select_handler(&self, alias: &str) -> Option<&SelectHandler> {
        self.selects.get(&handler_name(SELECT_PREFIX, alias))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut criteria: Vec<_> = self.criteria.keys().collect();
        let mut orders: Vec<_> = self.orders.keys().collect();
        let mut selects: Vec<_> = self.selects.keys().collect();
        criteria.sort();
        orders.sort();
        selects.sort();
        f.debug_struct("HandlerRegistry")
            .field("criteria", &criteria)
            .field("orders", &orders)
            .field("selects", &selects)
            .finish()
    }
}

//! Criteria compilation: turning declarative filters, orderings and
//! selections into [`QueryBuilder`](crate::qb::QueryBuilder) mutations.
//!
//! The pipeline pieces are independent functions over a builder:
//!
//! - [`resolve`] / [`add_criterion`]: value shape → predicate
//! - [`add_criteria`], [`add_order_bys`], [`add_selects`]: dispatch through a
//!   [`HandlerRegistry`]
//! - [`clean_query_builder`]: collapse duplicate joins and selects
//! - [`add_generic_criteria`]: default soft-delete exclusion
//!
//! [`Repository`](crate::Repository) strings them together.

mod augment;
mod compose;
mod dedup;
mod registry;
mod resolve;

pub use augment::add_generic_criteria;
pub use compose::{add_criteria, add_order_bys, add_selects};
pub use dedup::clean_query_builder;
pub use registry::{CriterionHandler, HandlerRegistry, OrderHandler, SelectHandler};
pub use resolve::{Predicate, add_criterion, resolve};

use crate::value::Value;
use indexmap::IndexMap;

/// Field name → filter value, in insertion order.
pub type Criteria = IndexMap<String, Value>;

/// Field name → direction (`ASC` / `DESC`), in insertion order.
pub type Orders = IndexMap<String, String>;

/// Handler name prefix for criteria.
pub const CRITERION_PREFIX: &str = "addCriterion";
/// Handler name prefix for orderings.
pub const ORDER_PREFIX: &str = "addOrderBy";
/// Handler name prefix for selections.
pub const SELECT_PREFIX: &str = "addSelect";

/// Build a handler name: `prefix` followed by `field` with its first
/// character upper-cased (`("addCriterion", "name")` → `addCriterionName`).
pub fn handler_name(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    let mut name = String::with_capacity(prefix.len() + field.len());
    name.push_str(prefix);
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// Build a [`Criteria`] map from `(field, value)` pairs.
///
/// ```ignore
/// let criteria = criteria([("name", Value::from(vec!["Al", "Bo"])), ("status", Value::Null)]);
/// ```
pub fn criteria<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Criteria
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Build an [`Orders`] map from `(field, direction)` pairs.
pub fn orders<K, D>(pairs: impl IntoIterator<Item = (K, D)>) -> Orders
where
    K: Into<String>,
    D: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, d)| (k.into(), d.into()))
        .collect()
}

#[cfg(test)]
mod tests;

//! Mutable query builder used as the compilation target for criteria.
//!
//! A [`QueryBuilder`] holds one ordered sequence of fragments per clause
//! (select, join, where, order by), the named parameters bound so far, and
//! optional limit/offset. Handlers mutate it in place; the deduplication pass
//! reads a part, resets it and re-adds the surviving fragments.
//!
//! ```ignore
//! use pgcriteria::qb::{Join, QueryBuilder, SortDir};
//!
//! let mut qb = QueryBuilder::new("users", "u");
//! qb.join(Join::left("profiles", "p").on("p.user_id = u.id"))
//!     .and_where("u.name = :u_name")
//!     .set_parameter("u_name", "Al")
//!     .add_order_by("u.name", SortDir::Asc)
//!     .set_max_results(Some(10));
//!
//! let sql = qb.to_sql()?;
//! // SELECT u.* FROM users u LEFT JOIN profiles p ON p.user_id = u.id
//! //   WHERE u.name = $1 ORDER BY u.name ASC LIMIT $2
//! ```

mod part;
mod render;

pub use part::{Fragment, Join, JoinType, OrderBy, PartName, Select, SortDir};

use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// A query under construction against a single root table.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    /// Root table
    table: String,
    /// Root alias (the single query root joins are grouped under)
    alias: String,
    /// SELECT fragments (default: the root alias)
    select: Vec<Select>,
    /// JOIN fragments grouped by query root
    join: IndexMap<String, Vec<Join>>,
    /// WHERE conjuncts
    conditions: Vec<String>,
    /// ORDER BY fragments
    order_by: Vec<OrderBy>,
    /// Named parameters referenced as `:name`
    params: IndexMap<String, Value>,
    /// LIMIT
    max_results: Option<i64>,
    /// OFFSET
    first_result: Option<i64>,
}

impl QueryBuilder {
    /// Create a builder selecting `alias` from `table alias`.
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            table: table.into(),
            select: vec![Select::new(alias.clone())],
            alias,
            join: IndexMap::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            params: IndexMap::new(),
            max_results: None,
            first_result: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn root_alias(&self) -> &str {
        &self.alias
    }

    // ==================== SELECT ====================

    /// Replace all SELECT fragments with `expr`.
    pub fn select(&mut self, expr: impl Into<Select>) -> &mut Self {
        self.add(Fragment::Select(expr.into()), false)
    }

    /// Append a SELECT fragment.
    pub fn add_select(&mut self, expr: impl Into<Select>) -> &mut Self {
        self.add(Fragment::Select(expr.into()), true)
    }

    pub fn selects(&self) -> &[Select] {
        &self.select
    }

    // ==================== JOIN ====================

    /// Append a join under the query root.
    pub fn join(&mut self, join: Join) -> &mut Self {
        let root = self.alias.clone();
        self.add(Fragment::Join { root, join }, true)
    }

    /// Append `INNER JOIN target alias ON condition`.
    pub fn inner_join(
        &mut self,
        target: &str,
        alias: &str,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.join(Join::inner(target, alias).on(condition))
    }

    /// Append `LEFT JOIN target alias ON condition`.
    pub fn left_join(
        &mut self,
        target: &str,
        alias: &str,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.join(Join::left(target, alias).on(condition))
    }

    /// Join fragments grouped by query root, in insertion order.
    pub fn joins(&self) -> &IndexMap<String, Vec<Join>> {
        &self.join
    }

    /// All aliases known to this query: the root alias followed by join aliases.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.alias.as_str()).chain(
            self.join
                .values()
                .flatten()
                .map(|join| join.alias.as_str()),
        )
    }

    // ==================== WHERE / parameters ====================

    /// Add a conjunct to the WHERE clause.
    pub fn and_where(&mut self, condition: impl Into<String>) -> &mut Self {
        self.add(Fragment::Where(condition.into()), true)
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Bind a named parameter, replacing any previous value under that name.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    // ==================== ORDER BY ====================

    pub fn add_order_by(&mut self, sort: impl Into<String>, dir: SortDir) -> &mut Self {
        self.add(Fragment::OrderBy(OrderBy::new(sort, dir)), true)
    }

    pub fn order_bys(&self) -> &[OrderBy] {
        &self.order_by
    }

    // ==================== LIMIT / OFFSET ====================

    pub fn set_max_results(&mut self, limit: Option<i64>) -> &mut Self {
        self.max_results = limit;
        self
    }

    pub fn set_first_result(&mut self, offset: Option<i64>) -> &mut Self {
        self.first_result = offset;
        self
    }

    pub fn max_results(&self) -> Option<i64> {
        self.max_results
    }

    pub fn first_result(&self) -> Option<i64> {
        self.first_result
    }

    // ==================== Named parts ====================

    /// Add a fragment to its part. With `append == false` the part is
    /// replaced by this single fragment.
    pub fn add(&mut self, fragment: Fragment, append: bool) -> &mut Self {
        if !append {
            self.reset_part(fragment.part_name());
        }
        match fragment {
            Fragment::Select(select) => self.select.push(select),
            Fragment::Join { root, join } => self.join.entry(root).or_default().push(join),
            Fragment::Where(condition) => self.conditions.push(condition),
            Fragment::OrderBy(order) => self.order_by.push(order),
        }
        self
    }

    /// Remove every fragment of a part.
    pub fn reset_part(&mut self, name: PartName) -> &mut Self {
        match name {
            PartName::Select => self.select.clear(),
            PartName::Join => self.join.clear(),
            PartName::Where => self.conditions.clear(),
            PartName::OrderBy => self.order_by.clear(),
        }
        self
    }

    /// Number of fragments currently held by a part.
    pub fn part_len(&self, name: PartName) -> usize {
        match name {
            PartName::Select => self.select.len(),
            PartName::Join => self.join.values().map(Vec::len).sum(),
            PartName::Where => self.conditions.len(),
            PartName::OrderBy => self.order_by.len(),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Canonical text form with named `:parameters` (no LIMIT/OFFSET).
impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        write_list(f, &self.select, ", ")?;
        write!(f, " FROM {} {}", self.table, self.alias)?;
        for join in self.join.values().flatten() {
            write!(f, " {join}")?;
        }
        match self.conditions.as_slice() {
            [] => {}
            [single] => write!(f, " WHERE {single}")?,
            many => {
                f.write_str(" WHERE (")?;
                write_list(f, many, ") AND (")?;
                f.write_str(")")?;
            }
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by, ", ")?;
        }
        Ok(())
    }
}

//! Clause fragments held by a [`QueryBuilder`](super::QueryBuilder).
//!
//! Every fragment renders to a canonical text form via `Display`; the
//! deduplication pass keys on that text.

use crate::error::{OrmError, OrmResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDir {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }

    /// Parse a direction. Only the exact strings `ASC` and `DESC` are accepted.
    pub fn parse(direction: &str) -> OrmResult<Self> {
        match direction {
            "ASC" => Ok(SortDir::Asc),
            "DESC" => Ok(SortDir::Desc),
            other => Err(OrmError::configuration(format!(
                "{other} is not a valid value for order by \"direction\" parameter"
            ))),
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Join flavour. Rendered as the single token preceding `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn to_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

/// A JOIN fragment: `<TYPE> JOIN <target> <alias> [ON <condition>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub target: String,
    pub alias: String,
    pub condition: Option<String>,
}

impl Join {
    pub fn new(join_type: JoinType, target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            join_type,
            target: target.into(),
            alias: alias.into(),
            condition: None,
        }
    }

    /// Create an INNER JOIN
    pub fn inner(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(JoinType::Inner, target, alias)
    }

    /// Create a LEFT JOIN
    pub fn left(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(JoinType::Left, target, alias)
    }

    /// Create a RIGHT JOIN
    pub fn right(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(JoinType::Right, target, alias)
    }

    /// Set the ON condition. May reference bound `:parameters`.
    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} JOIN {} {}",
            self.join_type.to_sql(),
            self.target,
            self.alias
        )?;
        if let Some(condition) = &self.condition {
            write!(f, " ON {condition}")?;
        }
        Ok(())
    }
}

/// A SELECT fragment. Text naming a query alias selects that alias' columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Select(String);

impl Select {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Select {
    fn from(expr: &str) -> Self {
        Select::new(expr)
    }
}

impl From<String> for Select {
    fn from(expr: String) -> Self {
        Select::new(expr)
    }
}

/// An ORDER BY fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub sort: String,
    pub dir: SortDir,
}

impl OrderBy {
    pub fn new(sort: impl Into<String>, dir: SortDir) -> Self {
        Self {
            sort: sort.into(),
            dir,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sort, self.dir)
    }
}

/// Names of the clause parts that can be read, reset and re-added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartName {
    Select,
    Join,
    Where,
    OrderBy,
}

/// A single fragment to add to a named part.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Select(Select),
    /// A join grouped under the query root `root`.
    Join { root: String, join: Join },
    Where(String),
    OrderBy(OrderBy),
}

impl Fragment {
    pub fn part_name(&self) -> PartName {
        match self {
            Fragment::Select(_) => PartName::Select,
            Fragment::Join { .. } => PartName::Join,
            Fragment::Where(_) => PartName::Where,
            Fragment::OrderBy(_) => PartName::OrderBy,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Select(select) => select.fmt(f),
            Fragment::Join { join, .. } => join.fmt(f),
            Fragment::Where(condition) => f.write_str(condition),
            Fragment::OrderBy(order) => order.fmt(f),
        }
    }
}

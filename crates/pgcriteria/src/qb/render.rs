//! Rendering a [`QueryBuilder`] to executable PostgreSQL.
//!
//! Named `:parameter` references in join and where fragments are replaced by
//! numbered placeholders. A list parameter expands to one placeholder per
//! element, so `IN (:ids)` becomes `IN ($1, $2, $3)`.

use super::QueryBuilder;
use crate::error::{OrmError, OrmResult};
use crate::sql::Sql;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;

impl QueryBuilder {
    /// Render this query to SQL with `$1, $2, ...` placeholders and bound values.
    ///
    /// Fails with a configuration error when a fragment references a parameter
    /// that was never bound, and with a validation error when the root table or
    /// alias is not a plain identifier.
    pub fn to_sql(&self) -> OrmResult<Sql> {
        let aliases: HashSet<&str> = self.aliases().collect();
        let mut sql = Sql::new("SELECT ");

        if self.select.is_empty() {
            sql.push("*");
        }
        for (i, select) in self.select.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            if aliases.contains(select.as_str()) {
                sql.push_ident(select.as_str())?.push(".*");
            } else {
                sql.push(select.as_str());
            }
        }

        sql.push(" FROM ");
        sql.push_ident(&self.table)?.push(" ");
        sql.push_ident(&self.alias)?;

        for join in self.join.values().flatten() {
            sql.push(" ");
            push_expr(&mut sql, &join.to_string(), &self.params)?;
        }

        match self.conditions.as_slice() {
            [] => {}
            [single] => {
                sql.push(" WHERE ");
                push_expr(&mut sql, single, &self.params)?;
            }
            many => {
                sql.push(" WHERE ");
                for (i, condition) in many.iter().enumerate() {
                    sql.push(if i == 0 { "(" } else { ") AND (" });
                    push_expr(&mut sql, condition, &self.params)?;
                }
                sql.push(")");
            }
        }

        if !self.order_by.is_empty() {
            sql.push(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                sql.push(&order.to_string());
            }
        }

        if let Some(limit) = self.max_results {
            sql.push(" LIMIT ");
            sql.push_bind(limit);
        }
        if let Some(offset) = self.first_result {
            sql.push(" OFFSET ");
            sql.push_bind(offset);
        }

        Ok(sql)
    }
}

/// Append `text`, replacing `:name` references with bound placeholders.
///
/// `::` casts and single-quoted literals are copied verbatim.
fn push_expr(sql: &mut Sql, text: &str, params: &IndexMap<String, Value>) -> OrmResult<()> {
    let bytes = text.as_bytes();
    let mut copied = 0;
    let mut i = 0;
    let mut in_literal = false;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_literal = !in_literal,
            b':' if !in_literal => {
                if bytes.get(i + 1) == Some(&b':') {
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let len = bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                if len > 0 {
                    let name = &text[start..start + len];
                    let value = params.get(name).ok_or_else(|| {
                        OrmError::configuration(format!(
                            "parameter ':{name}' is referenced but was never bound"
                        ))
                    })?;
                    sql.push(&text[copied..i]);
                    match value {
                        Value::List(items) => sql.push_bind_list(items.iter().cloned()),
                        other => sql.push_bind(other.clone()),
                    };
                    i = start + len;
                    copied = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    sql.push(&text[copied..]);
    Ok(())
}

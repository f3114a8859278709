//! Dispatching criteria, orderings and selections to registered handlers.
//!
//! Empty keys are skipped. The first failing handler aborts the pass; the
//! builder keeps whatever earlier handlers already added.

use super::registry::HandlerRegistry;
use super::{Criteria, Orders};
use crate::error::OrmResult;
use crate::qb::QueryBuilder;

/// Apply each `(field, value)` through its criterion handler.
pub fn add_criteria(
    qb: &mut QueryBuilder,
    handlers: &HandlerRegistry,
    criteria: &Criteria,
) -> OrmResult<()> {
    let mut applied = 0usize;
    for (field, value) in criteria {
        if field.is_empty() {
            continue;
        }
        let handler = handlers.criterion_handler(field)?;
        handler(qb, value)?;
        applied += 1;
    }

    tracing::trace!(
        target: "pgcriteria.compile",
        applied,
        conditions = qb.conditions().len(),
        "criteria applied"
    );
    Ok(())
}

/// Apply each `(field, direction)` through its order handler, in input order.
pub fn add_order_bys(
    qb: &mut QueryBuilder,
    handlers: &HandlerRegistry,
    orders: &Orders,
) -> OrmResult<()> {
    for (field, direction) in orders {
        if field.is_empty() {
            continue;
        }
        let handler = handlers.order_handler(field)?;
        handler(qb, direction)?;
    }

    tracing::trace!(
        target: "pgcriteria.compile",
        order_bys = qb.order_bys().len(),
        "orderings applied"
    );
    Ok(())
}

/// Apply each selection alias through its select handler, or append the alias
/// itself as a select fragment when no handler is registered.
pub fn add_selects<S: AsRef<str>>(
    qb: &mut QueryBuilder,
    handlers: &HandlerRegistry,
    selects: &[S],
) -> OrmResult<()> {
    for alias in selects {
        let alias = alias.as_ref();
        if alias.is_empty() {
            continue;
        }
        match handlers.select_handler(alias) {
            Some(handler) => handler(qb)?,
            None => {
                qb.add_select(alias);
            }
        }
    }

    tracing::trace!(
        target: "pgcriteria.compile",
        selects = qb.selects().len(),
        "selections applied"
    );
    Ok(())
}

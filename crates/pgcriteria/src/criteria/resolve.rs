//! Value-shape driven predicate generation.

use crate::qb::QueryBuilder;
use crate::value::{NOT_NULL_SENTINEL, NULL_SENTINEL, Value};

/// A WHERE conjunct with its optional named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub condition: String,
    /// `None` for `IS NULL` / `IS NOT NULL`.
    pub param: Option<(String, Value)>,
}

/// Resolve one criterion on `alias.field` into a predicate.
///
/// | value             | predicate                                  |
/// |-------------------|--------------------------------------------|
/// | `Null`            | none                                       |
/// | empty list        | none                                       |
/// | non-empty list    | `a.f IN (:a_f)` / `NOT IN` when `exclude`  |
/// | `"NULL"`          | `a.f IS NULL`                              |
/// | `"NOT NULL"`      | `a.f IS NOT NULL`                          |
/// | any other scalar  | `a.f = :a_f` / `!=` when `exclude`         |
///
/// Scalars bind as given, so `0`, `false` and `""` still filter.
/// Names are not validated.
pub fn resolve(alias: &str, field: &str, value: &Value, exclude: bool) -> Option<Predicate> {
    let column = format!("{alias}.{field}");
    let param_name = format!("{alias}_{field}");

    match value {
        Value::Null => None,
        Value::List(items) if items.is_empty() => None,
        Value::List(_) => {
            let op = if exclude { "NOT IN" } else { "IN" };
            Some(Predicate {
                condition: format!("{column} {op} (:{param_name})"),
                param: Some((param_name, value.clone())),
            })
        }
        Value::Text(s) if s == NULL_SENTINEL => Some(Predicate {
            condition: format!("{column} IS NULL"),
            param: None,
        }),
        Value::Text(s) if s == NOT_NULL_SENTINEL => Some(Predicate {
            condition: format!("{column} IS NOT NULL"),
            param: None,
        }),
        scalar => {
            let op = if exclude { "!=" } else { "=" };
            Some(Predicate {
                condition: format!("{column} {op} :{param_name}"),
                param: Some((param_name, scalar.clone())),
            })
        }
    }
}

/// Resolve a criterion and apply it to `qb`. Returns whether a condition was added.
pub fn add_criterion(
    qb: &mut QueryBuilder,
    alias: &str,
    field: &str,
    value: &Value,
    exclude: bool,
) -> bool {
    let Some(predicate) = resolve(alias, field, value, exclude) else {
        return false;
    };

    qb.and_where(predicate.condition);
    if let Some((name, value)) = predicate.param {
        qb.set_parameter(name, value);
    }
    true
}

//! Collapsing duplicate join and select fragments.
//!
//! Select handlers are free to add the same join more than once (two
//! selections both needing `profiles p`, say). Join identity is the alias
//! token read back from each fragment's rendered text.

use crate::error::{OrmError, OrmResult};
use crate::qb::{Fragment, Join, PartName, QueryBuilder, Select};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn join_pattern() -> &'static Regex {
    static JOIN_RE: OnceLock<Regex> = OnceLock::new();
    JOIN_RE.get_or_init(|| {
        Regex::new(r"^(?P<joinType>[^ ]+) JOIN (?P<join>[^ ]+) (?P<alias>[^ ]+)")
            .expect("invalid built-in join regex")
    })
}

/// Remove duplicate joins and selects from `qb`, in place.
///
/// - joins: within each root group the first fragment per alias is kept, in
///   order; only the first root group survives
/// - selects: the first fragment per distinct text is kept, in order
///
/// Every join fragment is parsed before anything is changed: an unparseable
/// fragment is a configuration error and leaves `qb` untouched. Running the
/// pass twice gives the same result as running it once.
pub fn clean_query_builder(qb: &mut QueryBuilder) -> OrmResult<()> {
    let mut root: Option<String> = None;
    let mut joins: Vec<Join> = Vec::new();

    for (index, (group_root, group)) in qb.joins().iter().enumerate() {
        let mut aliases = HashSet::new();
        for join in group {
            let text = join.to_string();
            let caps = join_pattern().captures(&text).ok_or_else(|| {
                OrmError::configuration(format!("unable to parse join fragment \"{text}\""))
            })?;
            if index == 0 && aliases.insert(caps["alias"].to_string()) {
                joins.push(join.clone());
            }
        }
        if index == 0 {
            root = Some(group_root.clone());
        }
    }

    let mut texts = HashSet::new();
    let selects: Vec<Select> = qb
        .selects()
        .iter()
        .filter(|select| texts.insert(select.to_string()))
        .cloned()
        .collect();

    let dropped_joins = qb.part_len(PartName::Join) - joins.len();
    let dropped_selects = qb.part_len(PartName::Select) - selects.len();

    qb.reset_part(PartName::Join);
    if let Some(root) = root {
        for join in joins {
            qb.add(
                Fragment::Join {
                    root: root.clone(),
                    join,
                },
                true,
            );
        }
    }

    qb.reset_part(PartName::Select);
    for select in selects {
        qb.add(Fragment::Select(select), true);
    }

    if dropped_joins > 0 || dropped_selects > 0 {
        tracing::debug!(
            target: "pgcriteria.compile",
            dropped_joins,
            dropped_selects,
            "removed duplicate fragments"
        );
    }
    Ok(())
}

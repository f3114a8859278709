//! Default soft-delete exclusion.

use super::Criteria;
use crate::config::RepositoryConfig;
use crate::schema::SchemaIntrospector;
use crate::value::Value;

/// Inject the default "exclude soft-deleted rows" criterion.
///
/// Applies only when `entity` declares the status attribute and `criteria`
/// has no status key at all. The presence of the key is what counts: an
/// explicit `status: null` opts out of the default just like a real status
/// filter does.
///
/// The excluded-status entry becomes a list: the caller's value (missing or
/// null → empty, scalar → one element) followed by the deleted status.
pub fn add_generic_criteria(
    mut criteria: Criteria,
    entity: &str,
    schema: &dyn SchemaIntrospector,
    config: &RepositoryConfig,
) -> Criteria {
    if criteria.contains_key(&config.status_field)
        || !schema.declares_attribute(entity, &config.status_field)
    {
        return criteria;
    }

    let mut excluded = criteria
        .get(&config.excluded_status_key)
        .cloned()
        .unwrap_or_default()
        .into_list();
    excluded.push(config.deleted_status.clone());
    criteria.insert(config.excluded_status_key.clone(), Value::List(excluded));
    criteria
}

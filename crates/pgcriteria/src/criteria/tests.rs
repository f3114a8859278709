use super::*;
use crate::config::RepositoryConfig;
use crate::qb::{Fragment, Join, PartName, QueryBuilder, Select};
use crate::schema::{SchemaRegistry, TableSchema};
use crate::value::Value;

fn users() -> QueryBuilder {
    QueryBuilder::new("users", "u")
}

fn user_handlers() -> HandlerRegistry {
    HandlerRegistry::new()
        .field_criterion("name")
        .field_criterion("age")
        .field_order("name")
        .field_order("age")
        .with_lifecycle_handlers(&RepositoryConfig::default())
}

fn schema_with_status() -> SchemaRegistry {
    let mut schema = SchemaRegistry::new();
    schema.register_table(TableSchema::new("public", "users").with_columns(&["id", "name", "status"]));
    schema
}

// ==================== handler names ====================

#[test]
fn handler_name_capitalizes_first_letter() {
    assert_eq!(handler_name(CRITERION_PREFIX, "name"), "addCriterionName");
    assert_eq!(handler_name(CRITERION_PREFIX, "excludedStatus"), "addCriterionExcludedStatus");
    assert_eq!(handler_name(ORDER_PREFIX, "createdAt"), "addOrderByCreatedAt");
    assert_eq!(handler_name(SELECT_PREFIX, ""), "addSelect");
}

// ==================== resolver ====================

#[test]
fn null_value_resolves_to_nothing() {
    assert_eq!(resolve("u", "name", &Value::Null, false), None);
    assert_eq!(resolve("u", "name", &Value::Null, true), None);
}

#[test]
fn empty_list_resolves_to_nothing() {
    assert_eq!(resolve("u", "name", &Value::List(vec![]), false), None);
}

#[test]
fn list_resolves_to_membership() {
    let value = Value::from(vec!["Al", "Bo"]);
    let included = resolve("u", "name", &value, false).unwrap();
    assert_eq!(included.condition, "u.name IN (:u_name)");
    assert_eq!(included.param, Some(("u_name".to_string(), value.clone())));

    let excluded = resolve("u", "name", &value, true).unwrap();
    assert_eq!(excluded.condition, "u.name NOT IN (:u_name)");
}

#[test]
fn sentinels_resolve_to_nullability_without_parameter() {
    let is_null = resolve("u", "deleted_at", &Value::from("NULL"), false).unwrap();
    assert_eq!(is_null.condition, "u.deleted_at IS NULL");
    assert_eq!(is_null.param, None);

    let not_null = resolve("u", "deleted_at", &Value::from("NOT NULL"), true).unwrap();
    assert_eq!(not_null.condition, "u.deleted_at IS NOT NULL");
    assert_eq!(not_null.param, None);
}

#[test]
fn scalar_resolves_to_equality() {
    let eq = resolve("u", "age", &Value::from(30), false).unwrap();
    assert_eq!(eq.condition, "u.age = :u_age");
    assert_eq!(eq.param, Some(("u_age".to_string(), Value::Int(30))));

    let ne = resolve("u", "age", &Value::from(30), true).unwrap();
    assert_eq!(ne.condition, "u.age != :u_age");
}

#[test]
fn falsy_scalars_still_filter() {
    for value in [Value::from(0), Value::from(false), Value::from("")] {
        let predicate = resolve("u", "flag", &value, false).unwrap();
        assert_eq!(predicate.condition, "u.flag = :u_flag");
        assert_eq!(predicate.param.unwrap().1, value);
    }
}

#[test]
fn add_criterion_reports_whether_it_applied() {
    let mut qb = users();
    assert!(!add_criterion(&mut qb, "u", "name", &Value::Null, false));
    assert!(qb.conditions().is_empty());
    assert!(qb.parameters().is_empty());

    assert!(add_criterion(&mut qb, "u", "name", &Value::from("Al"), false));
    assert_eq!(qb.conditions(), &["u.name = :u_name".to_string()]);
    assert_eq!(qb.parameter("u_name"), Some(&Value::from("Al")));
}

// ==================== criteria compiler ====================

#[test]
fn criteria_dispatch_to_registered_handlers() {
    let mut qb = users();
    let input = criteria([
        ("name", Value::from(vec!["Al", "Bo"])),
        ("age", Value::Null),
        ("", Value::from(1)),
    ]);
    add_criteria(&mut qb, &user_handlers(), &input).unwrap();

    assert_eq!(qb.conditions(), &["u.name IN (:u_name)".to_string()]);
    assert!(qb.parameter("u_age").is_none());
    assert_eq!(qb.parameters().len(), 1);
}

#[test]
fn unregistered_criterion_is_configuration_error() {
    let mut qb = users();
    let err = add_criteria(&mut qb, &user_handlers(), &criteria([("email", "a@b.c")])).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("addCriterionEmail"));
}

#[test]
fn custom_criterion_handler_is_used() {
    let handlers = HandlerRegistry::new().criterion("search", |qb, value| {
        qb.and_where("u.name ILIKE :search")
            .set_parameter("search", value.clone());
        Ok(())
    });
    let mut qb = users();
    add_criteria(&mut qb, &handlers, &criteria([("search", "%al%")])).unwrap();

    assert_eq!(qb.conditions(), &["u.name ILIKE :search".to_string()]);
}

#[test]
fn lifecycle_handlers_do_not_replace_caller_handlers() {
    let handlers = HandlerRegistry::new()
        .criterion("status", |qb, _| {
            qb.and_where("u.status = 'custom'");
            Ok(())
        })
        .with_lifecycle_handlers(&RepositoryConfig::default());

    let mut qb = users();
    add_criteria(&mut qb, &handlers, &criteria([("status", "active")])).unwrap();
    assert_eq!(qb.conditions(), &["u.status = 'custom'".to_string()]);
    assert!(handlers.has_criterion("excludedStatus"));
    assert!(handlers.has_order("status"));
}

#[test]
fn excluded_status_excludes_on_status_column() {
    let mut qb = users();
    let input = criteria([("excludedStatus", Value::from(vec!["deleted"]))]);
    add_criteria(&mut qb, &user_handlers(), &input).unwrap();

    assert_eq!(qb.conditions(), &["u.status NOT IN (:u_status)".to_string()]);
}

// ==================== order composer ====================

#[test]
fn orders_keep_input_order() {
    let mut qb = users();
    add_order_bys(&mut qb, &user_handlers(), &orders([("name", "ASC"), ("age", "DESC")])).unwrap();

    let rendered: Vec<String> = qb.order_bys().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["u.name ASC", "u.age DESC"]);
}

#[test]
fn invalid_direction_adds_no_order_by() {
    let mut qb = users();
    let err = add_order_bys(&mut qb, &user_handlers(), &orders([("name", "asc")])).unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(
        err.to_string(),
        "Configuration error: asc is not a valid value for order by \"direction\" parameter"
    );
    assert!(qb.order_bys().is_empty());
}

#[test]
fn unregistered_order_is_configuration_error() {
    let mut qb = users();
    let err = add_order_bys(&mut qb, &user_handlers(), &orders([("email", "ASC")])).unwrap_err();
    assert!(err.to_string().contains("addOrderByEmail"));
}

// ==================== select composer ====================

fn profile_handlers() -> HandlerRegistry {
    HandlerRegistry::new().select("profile", |qb| {
        qb.left_join("profiles", "p", "p.user_id = u.id").add_select("p");
        Ok(())
    })
}

#[test]
fn selects_use_handler_or_fall_back_to_alias() {
    let mut qb = users();
    add_selects(&mut qb, &profile_handlers(), &["profile", "", "COUNT(*)"]).unwrap();

    let selects: Vec<&str> = qb.selects().iter().map(Select::as_str).collect();
    assert_eq!(selects, vec!["u", "p", "COUNT(*)"]);
    assert_eq!(qb.joins()["u"].len(), 1);
}

#[test]
fn repeated_select_handler_is_collapsed_by_dedup() {
    let mut qb = users();
    add_selects(&mut qb, &profile_handlers(), &["profile", "profile"]).unwrap();
    assert_eq!(qb.joins()["u"].len(), 2);

    clean_query_builder(&mut qb).unwrap();
    assert_eq!(
        qb.to_string(),
        "SELECT u, p FROM users u LEFT JOIN profiles p ON p.user_id = u.id"
    );
}

// ==================== deduplicator ====================

#[test]
fn duplicate_selects_keep_first_occurrence() {
    let mut qb = users();
    qb.select("a").add_select("b").add_select("a").add_select("c");
    clean_query_builder(&mut qb).unwrap();

    let selects: Vec<&str> = qb.selects().iter().map(Select::as_str).collect();
    assert_eq!(selects, vec!["a", "b", "c"]);
}

#[test]
fn duplicate_join_alias_keeps_first_in_position() {
    let mut qb = users();
    qb.left_join("profiles", "p", "p.user_id = u.id")
        .inner_join("teams", "t", "t.id = u.team_id")
        .inner_join("profiles", "p", "p.owner_id = u.id")
        .left_join("roles", "r", "r.id = u.role_id");
    clean_query_builder(&mut qb).unwrap();

    let joins: Vec<String> = qb.joins()["u"].iter().map(ToString::to_string).collect();
    assert_eq!(
        joins,
        vec![
            "LEFT JOIN profiles p ON p.user_id = u.id",
            "INNER JOIN teams t ON t.id = u.team_id",
            "LEFT JOIN roles r ON r.id = u.role_id",
        ]
    );
}

#[test]
fn only_first_join_root_survives() {
    let mut qb = users();
    qb.left_join("profiles", "p", "p.user_id = u.id");
    qb.add(
        Fragment::Join {
            root: "x".to_string(),
            join: Join::inner("extras", "e").on("e.id = u.extra_id"),
        },
        true,
    );
    clean_query_builder(&mut qb).unwrap();

    assert_eq!(qb.joins().len(), 1);
    assert_eq!(qb.joins().keys().next().map(String::as_str), Some("u"));
    assert_eq!(qb.part_len(PartName::Join), 1);
}

#[test]
fn dedup_is_idempotent() {
    let mut qb = users();
    qb.add_select("p")
        .add_select("p")
        .left_join("profiles", "p", "p.user_id = u.id")
        .left_join("profiles", "p", "p.user_id = u.id");

    clean_query_builder(&mut qb).unwrap();
    let once = qb.to_string();
    clean_query_builder(&mut qb).unwrap();
    assert_eq!(qb.to_string(), once);
}

#[test]
fn unparseable_join_is_error_and_leaves_builder_untouched() {
    let mut qb = users();
    qb.add_select("u")
        .left_join("profiles", "p", "p.user_id = u.id")
        .join(Join::left("profiles", ""));
    let before = qb.to_string();

    let err = clean_query_builder(&mut qb).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(qb.to_string(), before);
}

// ==================== augmenter ====================

#[test]
fn augment_excludes_deleted_by_default() {
    let config = RepositoryConfig::default();
    let out = add_generic_criteria(criteria([("name", "Al")]), "users", &schema_with_status(), &config);

    assert_eq!(out.get("excludedStatus"), Some(&Value::from(vec!["deleted"])));
}

#[test]
fn augment_wraps_scalar_excluded_status() {
    let config = RepositoryConfig::default();
    let out = add_generic_criteria(
        criteria([("excludedStatus", "archived")]),
        "users",
        &schema_with_status(),
        &config,
    );

    assert_eq!(
        out.get("excludedStatus"),
        Some(&Value::from(vec!["archived", "deleted"]))
    );
}

#[test]
fn augment_treats_null_excluded_status_as_empty() {
    let config = RepositoryConfig::default();
    let out = add_generic_criteria(
        criteria([("excludedStatus", Value::Null)]),
        "users",
        &schema_with_status(),
        &config,
    );

    assert_eq!(out.get("excludedStatus"), Some(&Value::from(vec!["deleted"])));
}

#[test]
fn status_key_presence_suppresses_default() {
    let config = RepositoryConfig::default();
    let input = criteria([
        ("status", Value::Null),
        ("name", Value::from(vec!["Al", "Bo"])),
    ]);
    let out = add_generic_criteria(input, "users", &schema_with_status(), &config);
    assert!(!out.contains_key("excludedStatus"));

    let mut qb = users();
    add_criteria(&mut qb, &user_handlers(), &out).unwrap();
    assert_eq!(qb.conditions(), &["u.name IN (:u_name)".to_string()]);
    assert_eq!(qb.parameter("u_name"), Some(&Value::from(vec!["Al", "Bo"])));
}

#[test]
fn augment_skips_entities_without_status() {
    let mut schema = SchemaRegistry::new();
    schema.register_table(TableSchema::new("public", "users").with_columns(&["id", "name"]));

    let out = add_generic_criteria(Criteria::new(), "users", &schema, &RepositoryConfig::default());
    assert!(out.is_empty());
}

#[test]
fn augment_uses_configured_names() {
    let config = RepositoryConfig::new()
        .status_field("state")
        .excluded_status_key("notState")
        .deleted_status(9);
    let mut schema = SchemaRegistry::new();
    schema.register_table(TableSchema::new("public", "users").with_columns(&["state"]));

    let out = add_generic_criteria(Criteria::new(), "users", &schema, &config);
    assert_eq!(out.get("notState"), Some(&Value::from(vec![9])));
}

#[test]
fn criteria_deserialize_from_json_in_order() {
    let input: Criteria =
        serde_json::from_str(r#"{"status": null, "name": ["Al", "Bo"], "age": 30}"#).unwrap();
    let keys: Vec<&str> = input.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["status", "name", "age"]);
    assert!(input["status"].is_null());
}

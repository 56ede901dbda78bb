use super::{parse_params, row};
use crate::filter::{Comparison, FilterNode, Operator, eval, eval_all};
use serde_json::json;

#[test]
fn or_and_group_semantics() {
    let filters = parse_params(&[(
        "or",
        "(full_name.eq.20,and(full_name.eq.Test Name,email.eq.test@mail.com))",
    )]);

    assert!(eval_all(
        &row(json!({ "full_name": "Test Name", "email": "test@mail.com" })),
        &filters
    ));
    assert!(eval_all(
        &row(json!({ "full_name": 20, "email": "other@mail.com" })),
        &filters
    ));
    assert!(!eval_all(
        &row(json!({ "full_name": "Test Name", "email": "other@mail.com" })),
        &filters
    ));
}

#[test]
fn empty_groups_follow_boolean_identities() {
    let row = row(json!({ "id": 1 }));

    assert!(eval(&row, &FilterNode::and(Vec::new())));
    assert!(!eval(&row, &FilterNode::or(Vec::new())));
    assert!(eval_all(&row, &[]));
}

#[test]
fn numbers_match_numeric_strings() {
    let filters = parse_params(&[("id", "eq.123")]);

    assert!(eval_all(&row(json!({ "id": "123" })), &filters));
    assert!(eval_all(&row(json!({ "id": 123 })), &filters));
    assert!(!eval_all(&row(json!({ "id": 124 })), &filters));
}

#[test]
fn range_operators() {
    let row = row(json!({ "age": 30, "name": "m" }));

    assert!(eval_all(&row, &parse_params(&[("age", "gt.29"), ("age", "lte.30")])));
    assert!(!eval_all(&row, &parse_params(&[("age", "lt.30")])));
    assert!(eval_all(&row, &parse_params(&[("name", "gte.a")])));
}

#[test]
fn missing_field_fails_even_when_negated() {
    let row = row(json!({ "id": 1 }));

    assert!(!eval_all(&row, &parse_params(&[("name", "eq.x")])));
    assert!(!eval_all(&row, &parse_params(&[("name", "not.eq.x")])));
    assert!(eval_all(&row, &parse_params(&[("name", "is.null")])));
    assert!(!eval_all(&row, &parse_params(&[("name", "not.is.null")])));
}

#[test]
fn negation_inverts_present_fields() {
    let row = row(json!({ "status": "open" }));

    assert!(eval_all(&row, &parse_params(&[("status", "not.eq.closed")])));
    assert!(!eval_all(&row, &parse_params(&[("status", "not.eq.open")])));
}

#[test]
fn is_operator() {
    let filters = parse_params(&[("done", "is.true")]);

    assert!(eval_all(&row(json!({ "done": true })), &filters));
    assert!(!eval_all(&row(json!({ "done": false })), &filters));
    assert!(eval_all(
        &row(json!({ "done": null })),
        &parse_params(&[("done", "is.null")])
    ));
}

#[test]
fn pattern_operators() {
    let row = row(json!({ "name": "Hello World" }));

    assert!(eval_all(&row, &parse_params(&[("name", "like.%World")])));
    assert!(!eval_all(&row, &parse_params(&[("name", "like.%world")])));
    assert!(eval_all(&row, &parse_params(&[("name", "ilike.%world")])));
    assert!(eval_all(&row, &parse_params(&[("name", "fts.hello")])));
}

#[test]
fn list_operators() {
    let row = row(json!({ "id": "test2", "tags": ["a", "b", "c"] }));

    assert!(eval_all(&row, &parse_params(&[("id", "in.(test1,test2)")])));
    assert!(!eval_all(&row, &parse_params(&[("id", "in.(test1,test3)")])));
    assert!(eval_all(&row, &parse_params(&[("tags", "cs.{a,c}")])));
    assert!(!eval_all(&row, &parse_params(&[("tags", "cs.{a,z}")])));
    assert!(eval_all(&row, &parse_params(&[("tags", "cd.{a,b,c,d}")])));
    assert!(!eval_all(&row, &parse_params(&[("tags", "cd.{a,b}")])));
}

#[test]
fn json_containment() {
    let row = row(json!({ "meta": { "role": "admin", "level": 3 } }));

    assert!(eval_all(&row, &parse_params(&[("meta", "cs.{\"role\":\"admin\"}")])));
    assert!(!eval_all(&row, &parse_params(&[("meta", "cs.{\"role\":\"user\"}")])));
}

#[test]
fn json_arrow_paths_walk_columns() {
    let filters = parse_params(&[("meta->nested->>leaf", "eq.3")]);

    assert!(eval_all(
        &row(json!({ "meta": { "nested": { "leaf": 3 } } })),
        &filters
    ));
}

#[test]
fn alias_is_used_for_lookup() {
    let mut cmp = Comparison::new("some_column", Operator::Eq, json!(123));
    cmp.alias = Some("test".to_string());
    let node = FilterNode::Comparison(cmp);

    assert!(eval(&row(json!({ "test": 123 })), &node));
    assert!(!eval(&row(json!({ "some_column": 123 })), &node));
}

#[test]
fn embedded_arrays_match_any_element() {
    let filters = parse_params(&[("cities.name", "eq.Paris")]);

    assert!(eval_all(
        &row(json!({ "cities": [{ "name": "Lyon" }, { "name": "Paris" }] })),
        &filters
    ));
}

use crate::query::{
    QueryDescription,
    key::{body_key, parse_query_key, query_key, render_body_key},
};
use serde_json::json;

#[test]
fn query_key_is_commutative_over_filter_order() {
    let forward = QueryDescription::table("contact")
        .select("*")
        .eq("id", 123)
        .contains("id", &json!("456"));
    let reverse = QueryDescription::table("contact")
        .select("*")
        .contains("id", &json!("456"))
        .eq("id", 123);

    let key = query_key(&forward).expect("query key should build");

    assert_eq!(key, "id=cs.456&id=eq.123&select=*");
    assert_eq!(query_key(&reverse).expect("query key should build"), key);
}

#[test]
fn query_key_ignores_order_and_pagination() {
    let plain = QueryDescription::table("contact").select("id").eq("id", 1);
    let ordered = plain.clone().order("id", true, false).range(0, 9);

    assert_eq!(query_key(&plain), query_key(&ordered));
}

#[test]
fn query_key_canonicalizes_group_bodies() {
    let left = QueryDescription::table("contact")
        .select("id, name")
        .or("name.eq.b,id.eq.1");
    let right = QueryDescription::table("contact")
        .select("id,name")
        .or("id.eq.1, name.eq.b");

    let key = query_key(&left).expect("query key should build");

    assert_eq!(key, "or=(id.eq.1,name.eq.b)&select=id,name");
    assert_eq!(query_key(&right).expect("query key should build"), key);
}

#[test]
fn query_key_without_select_lists_filters_only() {
    let desc = QueryDescription::table("contact").gt("age", 30);

    assert_eq!(query_key(&desc).expect("query key should build"), "age=gt.30");
}

#[test]
fn body_key_is_invariant_to_object_key_order() {
    let left = QueryDescription::rpc(
        "contacts_by_ref",
        json!({ "some": { "nested": "value", "another": 1 }, "another": "value" }),
    );
    let right = QueryDescription::rpc(
        "contacts_by_ref",
        json!({ "another": "value", "some": { "another": 1, "nested": "value" } }),
    );

    let key = body_key(&left).expect("rpc body key");

    assert_eq!(key, "another=value&some.another=1&some.nested=value");
    assert_eq!(body_key(&right), Some(key));
}

#[test]
fn body_key_renders_arrays_and_null_as_json() {
    assert_eq!(
        render_body_key(&json!({ "ids": [1, 2], "tag": null, "ok": true })),
        "ids=[1,2]&ok=true&tag=null"
    );
}

#[test]
fn body_key_of_non_object_body_is_its_json() {
    assert_eq!(render_body_key(&json!([1, "a"])), "[1,\"a\"]");
}

#[test]
fn tables_have_no_body_key() {
    let desc = QueryDescription::table("contact").with_body(json!({ "a": 1 }));

    assert_eq!(body_key(&desc), None);
}

#[test]
fn query_key_splits_back_into_parameters() {
    let description = QueryDescription::table("contact")
        .select("id,name")
        .eq("id", 1)
        .or("name.eq.\"a,b\",id.eq.2");
    let key = query_key(&description).expect("query key should build");

    let params = parse_query_key(&key).expect("key should split");
    let rebuilt = QueryDescription {
        params,
        ..QueryDescription::table("contact")
    };

    assert_eq!(query_key(&rebuilt).expect("rebuilt key"), key);
    assert_eq!(parse_query_key(""), Ok(Vec::new()));
    assert!(parse_query_key("select").is_err());
}

#[test]
fn query_key_quotes_values_containing_delimiters() {
    let description = QueryDescription::table("contact").select("id").eq("dept", "R&D");
    let key = query_key(&description).expect("query key should build");

    assert_eq!(key, "dept=eq.\"R&D\"&select=id");
    assert_eq!(
        parse_query_key(&key),
        Ok(vec![
            ("dept".to_string(), "eq.\"R&D\"".to_string()),
            ("select".to_string(), "id".to_string()),
        ])
    );

    let joined = QueryDescription::table("contact").eq("name", "a&b=eq.c");
    let split = QueryDescription::table("contact").eq("name", "a").eq("b", "c");
    assert_ne!(query_key(&joined), query_key(&split));
}

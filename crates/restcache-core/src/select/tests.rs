use crate::{
    error::{ParseError, QueryError, WildcardNotSupportedError},
    select::{PathDescriptor, SelectNode, extract_paths, parse_select},
};

fn plain(path: &str) -> PathDescriptor {
    PathDescriptor::new(path)
}

fn aliased(alias: &str, path: &str) -> PathDescriptor {
    PathDescriptor::aliased(alias, path)
}

#[test]
fn nested_paths_list_leaves_before_embedded_resources() {
    let paths = extract_paths(
        "
        name,
        city:cities (
          test:name
        ),
        countries (
          capital,
          population,
          some_ref (
            test:first,
            second
          )
        ),
        test (prop),
        prop2,
        prop3
        ",
    )
    .expect("select should parse");

    assert_eq!(
        paths,
        vec![
            plain("name"),
            plain("prop2"),
            plain("prop3"),
            aliased("city.test", "cities.name"),
            plain("countries.capital"),
            plain("countries.population"),
            aliased("countries.some_ref.test", "countries.some_ref.first"),
            plain("countries.some_ref.second"),
            plain("test.prop"),
        ]
    );
}

#[test]
fn wildcard_is_rejected_at_any_depth() {
    for select in [
        "*",
        "name,*",
        "name,cities(*)",
        "countries(capital,some_ref(*))",
        "alias:*",
    ] {
        assert_eq!(
            extract_paths(select),
            Err(QueryError::Wildcard(WildcardNotSupportedError)),
            "{select}"
        );
    }
}

#[test]
fn renamed_resource_uses_referenced_name_in_path() {
    let paths = extract_paths("name, organisation:organisation_id ( test:name )")
        .expect("select should parse");

    assert_eq!(
        paths,
        vec![plain("name"), aliased("organisation.test", "organisation_id.name")]
    );
}

#[test]
fn fk_hint_resolves_to_table_name() {
    let paths = extract_paths("name, organisation!contact_organisation_id_fkey ( test:name )")
        .expect("select should parse");

    assert_eq!(
        paths,
        vec![plain("name"), aliased("organisation.test", "organisation.name")]
    );
}

#[test]
fn renamed_resource_aliases_unrenamed_children() {
    let paths = extract_paths("city:cities(name)").expect("select should parse");

    assert_eq!(paths, vec![aliased("city.name", "cities.name")]);
}

#[test]
fn json_operators_are_preserved() {
    let paths = extract_paths("field:name -> nested, meta->>key").expect("select should parse");

    assert_eq!(
        paths,
        vec![aliased("field", "name->nested"), plain("meta->>key")]
    );
}

#[test]
fn casts_are_not_part_of_the_path() {
    let paths = extract_paths("amount::text, total:sum::int").expect("select should parse");

    assert_eq!(paths, vec![plain("amount"), aliased("total", "sum")]);
}

#[test]
fn tree_keeps_hints() {
    let nodes = parse_select("org:organisation!inner(name)").expect("select should parse");

    assert_eq!(
        nodes,
        vec![SelectNode::Embedded {
            alias: Some("org".to_string()),
            name: "organisation".to_string(),
            hint: Some("inner".to_string()),
            children: vec![SelectNode::Field {
                alias: None,
                path: "name".to_string(),
            }],
        }]
    );
}

#[test]
fn unbalanced_select_is_a_parse_error() {
    assert!(matches!(
        extract_paths("name,cities(name"),
        Err(QueryError::Parse(ParseError::Unbalanced { .. }))
    ));
}

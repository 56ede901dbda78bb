use crate::query::{
    QueryDescription,
    key::{query_key, render_body_key},
};
use proptest::prelude::*;
use serde_json::{Map, Value};

const COLUMNS: [&str; 4] = ["id", "name", "age", "cities.name"];
const OPERATORS: [&str; 5] = ["eq", "neq", "gte", "like", "cs"];

fn arb_param() -> impl Strategy<Value = (String, String)> {
    (
        prop::sample::select(COLUMNS.to_vec()),
        prop::sample::select(OPERATORS.to_vec()),
        "[a-z0-9]{1,5}",
    )
        .prop_map(|(column, op, value)| (column.to_string(), format!("{op}.{value}")))
}

fn describe(params: &[(String, String)]) -> QueryDescription {
    let mut desc = QueryDescription::table("contact").select("id,name,age,cities(name)");
    desc.params.extend(params.iter().cloned());
    desc
}

fn arb_body() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(
        "[a-e]{1,3}",
        prop_oneof![
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
            prop::collection::btree_map("[f-h]{1,2}", any::<bool>().prop_map(Value::from), 0..3)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ],
        0..5,
    )
    .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #[test]
    fn query_key_is_invariant_to_filter_application_order(
        (params, shuffled) in prop::collection::vec(arb_param(), 0..6).prop_flat_map(|params| {
            let shuffled = Just(params.clone()).prop_shuffle();
            (Just(params), shuffled)
        })
    ) {
        prop_assert_eq!(
            query_key(&describe(&params)).expect("generated query should parse"),
            query_key(&describe(&shuffled)).expect("generated query should parse")
        );
    }

    #[test]
    fn body_key_is_invariant_to_insertion_order(entries in arb_body()) {
        let forward: Map<String, Value> = entries.iter().cloned().collect();
        let reverse: Map<String, Value> = entries.iter().rev().cloned().collect();

        prop_assert_eq!(
            render_body_key(&Value::Object(forward)),
            render_body_key(&Value::Object(reverse))
        );
    }
}

use crate::repo::tests::setup_test_db;
use diesel::sql_types::Text;
use diesel::{QueryableByName, RunQueryDsl};
use proptest::prelude::*;
use serde_json::{Number, Value};

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Checks that the migrations create every table the service reads and writes
#[test]
fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    for table in ["maintenance_requests", "activity_logs", "__diesel_schema_migrations"] {
        assert!(
            table_names.iter().any(|t| t.name == table),
            "Table '{}' not found in database",
            table
        );
        let result = diesel::sql_query(format!("SELECT COUNT(*) FROM {}", table)).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }
}

/// Generates strings the way callers and transcription actually produce them:
/// padded with whitespace, mixed case, sometimes empty or a placeholder
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[ \t\n]{0,3}[A-Za-z0-9 ,.'!?-]{0,24}[ \t\n]{0,3}",
        1 => ".{0,16}",
        1 => prop::sample::select(vec!["", " ", "null", "N/A", "undefined", "None"]).prop_map(str::to_string),
    ]
}

pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        any::<f64>()
            .prop_filter_map("f64s must be representable as JSON numbers", Number::from_f64)
            .prop_map(Value::Number),
        arb_messy_string().prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,12}", inner, 0..8)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

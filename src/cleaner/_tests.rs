pub mod fixtures {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use serde_json::Value;

    use crate::query::Query;

    pub fn query(value: Value) -> Query {
        Query::try_from(value).expect("Failed to parse query")
    }

    pub fn json_of(query: &Query) -> Value {
        Value::from(query)
    }

    /// Collects formatted log output so tests can assert on it.
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            let bytes = self.0.lock().expect("log buffer poisoned").clone();
            String::from_utf8(bytes).expect("logs are utf-8")
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::fixtures::{json_of, query, with_captured_logs};
    use crate::{
        cleaner::{clean_query, clean_query_value, CleanerConfig, QueryCleaner, HARD_ROW_LIMIT},
        query::{FieldRef, OrderBy, Query, QueryError},
    };

    // ---------- whole query ----------

    #[test]
    fn empty_aggregation_is_removed_and_exact_sort_kept() {
        let q = query(json!({
            "aggregation": [],
            "breakout": [["field", 1, null]],
            "order-by": [["asc", ["field", 1, null]]]
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned),
            json!({
                "breakout": [["field", 1, null]],
                "order-by": [["asc", ["field", 1, null]]]
            })
        );
    }

    #[test]
    fn sort_takes_the_breakout_temporal_unit() {
        let q = query(json!({
            "aggregation": [["count"]],
            "breakout": [["field", 1, {"temporal-unit": "day"}]],
            "order-by": [["asc", ["field", 1, null]]]
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned)["order-by"],
            json!([["asc", ["field", 1, {"temporal-unit": "day"}]]])
        );
    }

    #[test]
    fn sort_takes_the_breakout_fk_path() {
        let q = query(json!({
            "aggregation": [["count"]],
            "breakout": [["fk->", ["field-id", 10], ["field-id", 4]]],
            "order-by": [["desc", ["field-id", 4]]]
        }));

        let cleaned = q.clean();

        assert_eq!(
            cleaned.order_by,
            Some(vec![OrderBy::desc(FieldRef::from(json!(["fk->", ["field-id", 10], ["field-id", 4]])))])
        );
    }

    #[test]
    fn bare_rows_keeps_sort_without_breakout() {
        let q = query(json!({"order-by": [["desc", ["field", 2, null]]]}));

        let cleaned = q.clean();

        assert_eq!(json_of(&cleaned), json!({"order-by": [["desc", ["field", 2, null]]]}));
    }

    #[test]
    fn aggregated_query_without_breakout_drops_sort() {
        let q = query(json!({
            "aggregation": [["count"]],
            "order-by": [["desc", ["field", 2, null]]]
        }));

        let cleaned = q.clean();

        assert_eq!(cleaned.order_by, None);
        assert_eq!(json_of(&cleaned), json!({"aggregation": [["count"]]}));
    }

    #[test]
    fn incomplete_filter_is_removed() {
        let q = query(json!({"filter": [null, ["=", ["field", 1, null], null]]}));
        assert_eq!(q.clean().filter, None);

        let q = query(json!({"filter": ["=", ["field", 1, null], null]}));
        assert_eq!(q.clean().filter, None);
    }

    #[test]
    fn missing_query_passes_through() {
        assert_eq!(clean_query(None), None);
        assert_eq!(clean_query_value(Value::Null), Ok(Value::Null));
    }

    // ---------- aggregation / breakout ----------

    #[test]
    fn null_slots_are_dropped_from_aggregation_and_breakout() {
        let q = query(json!({
            "aggregation": [null, ["count"], null],
            "breakout": [null, ["field", 3, null]]
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned),
            json!({"aggregation": [["count"]], "breakout": [["field", 3, null]]})
        );
    }

    #[test]
    fn all_null_breakout_is_removed() {
        let cleaned = query(json!({"breakout": [null, null]})).clean();
        assert_eq!(cleaned.breakout, None);
    }

    #[test]
    fn aggregations_without_operator_are_removed() {
        let q = query(json!({
            "aggregation": [[], [null], "count", 3],
            "order-by": [["asc", ["field", 1, null]]]
        }));

        let cleaned = q.clean();

        assert_eq!(json_of(&cleaned), json!({"order-by": [["asc", ["field", 1, null]]]}));
    }

    #[test]
    fn scalar_aggregation_slots_do_not_shift_sorts_on_reclean() {
        let raw = json!({
            "aggregation": [null, "count", ["sum", ["field", 1, null]]],
            "breakout": [["field", 1, null]],
            "order-by": [["desc", ["aggregation", 0]]]
        });

        let once = clean_query_value(raw).expect("query should clean");
        let twice = clean_query_value(once.clone()).expect("query should clean");

        assert_eq!(
            once,
            json!({
                "aggregation": [["sum", ["field", 1, null]]],
                "breakout": [["field", 1, null]],
                "order-by": [["desc", ["aggregation", 0]]]
            })
        );
        assert_eq!(once, twice);

        let once = clean_query_value(json!({"aggregation": [null, "rows"]})).expect("query should clean");
        assert_eq!(once, json!({}));
        assert_eq!(clean_query_value(once.clone()), Ok(once));
    }

    #[test]
    fn rows_aggregation_is_removed() {
        let cleaned = query(json!({"aggregation": ["rows"]})).clean();
        assert_eq!(cleaned.aggregation, None);
    }

    // ---------- filter ----------

    #[test]
    fn filter_keeps_complete_conditions_only() {
        let q = query(json!({
            "filter": [
                "and",
                ["=", ["field", 1, null], 5],
                ["=", ["field", 2, null], null],
                ["not-null", ["field", 3, null]]
            ]
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned)["filter"],
            json!(["and", ["=", ["field", 1, null], 5], ["not-null", ["field", 3, null]]])
        );
    }

    #[test]
    fn filter_with_one_survivor_is_unwrapped() {
        let q = query(json!({
            "filter": ["and", ["=", ["field", 1, null], 5], ["=", null, 3]]
        }));

        assert_eq!(json_of(&q.clean())["filter"], json!(["=", ["field", 1, null], 5]));
    }

    // ---------- order-by ----------

    #[test]
    fn incomplete_sorts_are_dropped() {
        let q = query(json!({
            "order-by": [
                [null, ["field", 1, null]],
                ["asc", null],
                ["asc", ["field", "", null]],
                ["asc", ["unknown-clause", 1]],
                "asc",
                ["desc", ["field", 4, null]]
            ]
        }));

        let cleaned = q.clean();

        assert_eq!(cleaned.order_by, Some(vec![OrderBy::desc(FieldRef::field(4))]));
    }

    #[test]
    fn sort_with_any_non_null_direction_is_kept() {
        let q = query(json!({
            "order-by": [
                ["sideways", ["field", 1, null]],
                ["asc", ["field", 2, null], "extra"]
            ]
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned),
            json!({"order-by": [["sideways", ["field", 1, null]], ["asc", ["field", 2, null]]]})
        );
    }

    #[test]
    fn sort_by_aggregation_needs_breakout() {
        let grouped = query(json!({
            "aggregation": [["count"]],
            "breakout": [["field", 1, null]],
            "order-by": [["desc", ["aggregation", 0]]]
        }));
        assert_eq!(grouped.clean().order_by, Some(vec![OrderBy::desc(FieldRef::aggregation(0))]));

        let ungrouped = query(json!({
            "aggregation": [["count"]],
            "order-by": [["desc", ["aggregation", 0]]]
        }));
        assert_eq!(ungrouped.clean().order_by, None);
    }

    #[test]
    fn sort_by_missing_or_incomplete_aggregation_is_dropped() {
        let q = query(json!({
            "aggregation": [["count"], [null]],
            "breakout": [["field", 1, null]],
            "order-by": [["desc", ["aggregation", 1]], ["asc", ["aggregation", 7]]]
        }));

        assert_eq!(q.clean().order_by, None);
    }

    #[test]
    fn sort_without_breakout_match_is_dropped() {
        let q = query(json!({
            "aggregation": [["count"]],
            "breakout": [["field", 1, null]],
            "order-by": [["asc", ["field", 2, null]], ["asc", ["field", 1, null]]]
        }));

        assert_eq!(q.clean().order_by, Some(vec![OrderBy::asc(FieldRef::field(1))]));
    }

    #[test]
    fn ambiguous_sort_uses_first_breakout_and_warns() {
        let q = query(json!({
            "aggregation": [["count"]],
            "breakout": [
                ["field", 1, {"temporal-unit": "month"}],
                ["field", 1, {"temporal-unit": "year"}]
            ],
            "order-by": [["asc", ["field", 1, null]]]
        }));

        let (cleaned, logs) = with_captured_logs(|| q.clean());

        assert_eq!(
            json_of(&cleaned)["order-by"],
            json!([["asc", ["field", 1, {"temporal-unit": "month"}]]])
        );
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Sort clause matches more than one breakout field"));
    }

    #[test]
    fn unambiguous_sort_does_not_warn() {
        let q = query(json!({
            "breakout": [["field", 1, {"temporal-unit": "month"}], ["field", 2, null]],
            "order-by": [["asc", ["field", 1, null]]]
        }));

        let (_, logs) = with_captured_logs(|| q.clean());

        assert!(logs.is_empty());
    }

    #[test]
    fn empty_order_by_is_removed() {
        let cleaned = query(json!({"order-by": []})).clean();
        assert_eq!(cleaned.order_by, None);
    }

    // ---------- limit / expressions ----------

    #[test]
    fn non_numeric_limit_is_removed() {
        for limit in [json!("10"), json!(null), json!(true), json!([10]), json!({"n": 10})] {
            let cleaned = query(json!({ "limit": limit })).clean();
            assert_eq!(cleaned.limit, None);
        }
        assert_eq!(query(json!({"limit": 25})).clean().limit, Some(json!(25)));
        assert_eq!(query(json!({"limit": 2.5})).clean().limit, Some(json!(2.5)));
    }

    #[test]
    fn limit_cap() {
        let cleaner = QueryCleaner::new(CleanerConfig::capped());
        assert_eq!(cleaner.config().row_limit_cap, Some(HARD_ROW_LIMIT));

        let cleaned = cleaner.clean(query(json!({"limit": 10000})));
        assert_eq!(cleaned.limit, Some(json!(HARD_ROW_LIMIT)));

        let cleaned = cleaner.clean(query(json!({"limit": 50})));
        assert_eq!(cleaned.limit, Some(json!(50)));

        let cleaned = QueryCleaner::default().clean(query(json!({"limit": 10000})));
        assert_eq!(cleaned.limit, Some(json!(10000)));
    }

    #[test]
    fn empty_named_expression_is_removed() {
        let q = query(json!({
            "expressions": {"": ["+", 1, 1], "double": ["*", ["field", 1, null], 2]}
        }));

        let cleaned = q.clean();

        assert_eq!(
            json_of(&cleaned),
            json!({"expressions": {"double": ["*", ["field", 1, null], 2]}})
        );
    }

    #[test]
    fn expressions_left_empty_are_kept() {
        let cleaned = query(json!({"expressions": {"": ["+", 1, 1]}})).clean();
        assert_eq!(json_of(&cleaned), json!({"expressions": {}}));
    }

    // ---------- pass-through / json entry point ----------

    #[test]
    fn unrelated_keys_are_untouched() {
        let raw = json!({
            "source-table": 12,
            "joins": [{"alias": "Orders", "source-table": 3}],
            "fields": [["field", 1, null]]
        });
        assert_eq!(json_of(&query(raw.clone()).clean()), raw);
    }

    #[test]
    fn clean_query_value_round_trip() {
        let cleaned = clean_query_value(json!({
            "aggregation": [],
            "limit": "all",
            "source-table": 1
        }))
        .expect("query should clean");

        assert_eq!(cleaned, json!({"source-table": 1}));
        assert_eq!(clean_query_value(json!(42)), Err(QueryError::NotAnObject("number".to_string())));
    }

    #[test]
    fn cleaning_twice_changes_nothing() {
        let q = query(json!({
            "aggregation": [null, ["count"], ["sum", ["field", 5, null]]],
            "breakout": [["field", 1, {"temporal-unit": "week"}], null],
            "filter": ["and", ["=", ["field", 1, null], 3], [">", ["field", 2, null], null]],
            "order-by": [["asc", ["field", 1, null]], ["desc", ["aggregation", 1]], ["asc", ["field", 9, null]]],
            "limit": "x",
            "expressions": {"": 1, "a": 2}
        }));

        let once = q.clean();
        let twice = once.clone().clean();

        assert_eq!(once, twice);
        assert_eq!(clean_query(Some(Query::new())), Some(Query::new()));
    }
}

mod common;

use common::*;
use docgraph::{
    codes,
    testing::{new_test_store, MapTranslator, StaticPermission},
};
use docgraph_lib::config::{DocgraphConfig, GraphQLConfig};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn harness(depth_limit: usize, enable_introspection: bool) -> Harness {
    Harness::build(
        new_test_store(),
        StaticPermission::new(),
        MapTranslator::new(),
        DocgraphConfig {
            graphql: GraphQLConfig {
                depth_limit,
                enable_introspection,
            },
            ..DocgraphConfig::default()
        },
    )
}

#[tokio::test]
async fn test_deep_queries_are_rejected_before_any_fetch() {
    let harness = harness(2, false);
    let response = harness.run("{ a { b { c } } }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(codes(&response), vec![codes::GRAPHQL_VALIDATION_FAILED]);
    assert_eq!(response.http_status_hint(), 400);
    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test]
async fn test_fragments_count_toward_depth() {
    let harness = harness(3, false);
    let response = harness
        .run(
            r#"
            { User(name: "alice") { ...WithRoles } }
            fragment WithRoles on User { roles { role { name } } }
            "#,
        )
        .await;

    assert_eq!(codes(&response), vec![codes::GRAPHQL_VALIDATION_FAILED]);
    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test]
async fn test_queries_within_the_limit_run() {
    let harness = harness(3, false);
    let response = harness
        .run(r#"{ User(name: "alice") { language { name } } }"#)
        .await;

    assert!(response.is_ok(), "{:?}", response.errors);
}

#[tokio::test]
async fn test_introspection_follows_the_config() {
    let query = "{ __schema { queryType { name } } }";

    let closed = harness(10, false).run(query).await;
    assert_eq!(closed.data, Value::Null);
    assert_eq!(codes(&closed), vec![codes::GRAPHQL_VALIDATION_FAILED]);

    let open = harness(10, true).run(query).await;
    assert!(open.is_ok(), "{:?}", open.errors);
    assert_eq!(open.data["__schema"]["queryType"]["name"], "Query");
}

#[tokio::test]
async fn test_unparsable_queries_report_a_parse_error() {
    let response = harness(10, false).run("{ Users(").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(codes(&response), vec![codes::GRAPHQL_PARSE_FAILED]);
}

#[tokio::test]
async fn test_unknown_fields_fail_validation() {
    let response = harness(10, false).run("{ Ghosts { name } }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(codes(&response), vec![codes::GRAPHQL_VALIDATION_FAILED]);
}

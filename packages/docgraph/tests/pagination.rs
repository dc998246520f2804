mod common;

use assert_matches::assert_matches;
use common::*;
use docgraph::{codes, store::Requester, Response};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const PAGE: &str = r#"
    query ($first: Int, $last: Int, $after: String, $before: String) {
        Users(
            first: $first, last: $last, after: $after, before: $before,
            sortBy: { field: NAME, direction: ASC }
        ) {
            totalCount
            edges { cursor node { name } }
            pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
        }
    }
"#;

async fn page(harness: &Harness, variables: Value) -> Response {
    harness
        .run_with(PAGE, variables, Requester::default())
        .await
}

fn names(response: &Response) -> Vec<String> {
    nodes(response, "/Users")
        .iter()
        .map(|node| node["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_forward_pages_cover_every_row_once() {
    let harness = Harness::new();

    let first = page(&harness, json!({ "first": 2 })).await;
    assert!(first.is_ok(), "{:?}", first.errors);
    assert_eq!(names(&first), vec!["alice", "bob"]);
    assert_eq!(first.data["Users"]["totalCount"], json!(5));
    assert_eq!(
        first.data["Users"]["pageInfo"]["hasNextPage"],
        json!(true)
    );
    assert_eq!(
        first.data["Users"]["pageInfo"]["hasPreviousPage"],
        json!(false)
    );

    let end_cursor = first.data["Users"]["pageInfo"]["endCursor"].clone();
    let second = page(&harness, json!({ "first": 2, "after": end_cursor })).await;
    assert_eq!(names(&second), vec!["carol", "dave"]);
    assert_eq!(second.data["Users"]["totalCount"], json!(5));
    assert_eq!(
        second.data["Users"]["pageInfo"]["hasPreviousPage"],
        json!(true)
    );

    let end_cursor = second.data["Users"]["pageInfo"]["endCursor"].clone();
    let third = page(&harness, json!({ "first": 2, "after": end_cursor })).await;
    assert_eq!(names(&third), vec!["erin"]);
    assert_eq!(
        third.data["Users"]["pageInfo"]["hasNextPage"],
        json!(false)
    );
}

#[tokio::test]
async fn test_page_cursors_match_their_edges() {
    let harness = Harness::new();
    let response = page(&harness, json!({ "first": 3 })).await;

    let connection = &response.data["Users"];
    let edges = connection["edges"].as_array().unwrap();
    assert_eq!(connection["pageInfo"]["startCursor"], edges[0]["cursor"]);
    assert_eq!(connection["pageInfo"]["endCursor"], edges[2]["cursor"]);
    // base64 of ["alice"]
    assert_eq!(edges[0]["cursor"], json!("WyJhbGljZSJd"));
}

#[tokio::test]
async fn test_backward_pages_keep_the_sort_order() {
    let harness = Harness::new();

    let last = page(&harness, json!({ "last": 2 })).await;
    assert!(last.is_ok(), "{:?}", last.errors);
    assert_eq!(names(&last), vec!["dave", "erin"]);

    let start_cursor = last.data["Users"]["pageInfo"]["startCursor"].clone();
    let before = page(&harness, json!({ "last": 2, "before": start_cursor })).await;
    assert_eq!(names(&before), vec!["bob", "carol"]);
    assert_eq!(
        before.data["Users"]["pageInfo"]["hasPreviousPage"],
        json!(true)
    );
    assert_eq!(
        before.data["Users"]["pageInfo"]["hasNextPage"],
        json!(true)
    );
}

#[tokio::test]
async fn test_empty_listing_has_no_cursors() {
    let harness = Harness::new();
    let response = harness
        .run(
            r#"{
                Users(first: 3, filter: [{ fieldname: "full_name", operator: EQ, value: "Nobody" }]) {
                    totalCount
                    edges { cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }"#,
        )
        .await;

    assert_eq!(
        response.data,
        json!({
            "Users": {
                "totalCount": 0,
                "edges": [],
                "pageInfo": {
                    "hasNextPage": false,
                    "hasPreviousPage": false,
                    "startCursor": null,
                    "endCursor": null
                }
            }
        })
    );
}

#[tokio::test]
async fn test_filters_and_default_sort() {
    let harness = Harness::new();
    let response = harness
        .run(
            r#"{
                ToDos(first: 5, filter: [{ fieldname: "status", operator: EQ, value: "Open" }]) {
                    totalCount
                    edges { node { name priority } }
                }
                Notes(first: 5, filter: [{ fieldname: "title", operator: LIKE, value: "%a%" }]) {
                    edges { node { name } }
                }
            }"#,
        )
        .await;

    assert!(response.is_ok(), "{:?}", response.errors);
    assert_eq!(response.data["ToDos"]["totalCount"], json!(2));
    // Most recently modified first.
    assert_eq!(
        nodes(&response, "/ToDos"),
        vec![
            json!({ "name": "todo-3", "priority": 3 }),
            json!({ "name": "todo-1", "priority": 2 }),
        ]
    );
    assert_eq!(
        nodes(&response, "/Notes"),
        vec![json!({ "name": "note-3" }), json!({ "name": "note-2" })]
    );
}

#[tokio::test]
async fn test_malformed_paging_rejects_the_whole_query() {
    let harness = Harness::new();

    for variables in [
        json!({}),
        json!({ "first": 0 }),
        json!({ "last": -1 }),
        json!({ "first": 1, "last": 1 }),
        json!({ "first": 1, "before": "WyJhbGljZSJd" }),
        json!({ "last": 1, "after": "WyJhbGljZSJd" }),
        json!({ "first": 1, "after": "not a cursor" }),
    ] {
        let response = page(&harness, variables.clone()).await;
        assert_eq!(response.data, Value::Null, "{variables}");
        assert_eq!(codes(&response), vec![codes::BAD_USER_INPUT], "{variables}");
        assert_eq!(response.http_status_hint(), 400);
    }

    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test]
async fn test_unknown_filter_fields_fail_only_their_connection() {
    let harness = Harness::new();
    let response = harness
        .run(
            r#"{
                Users(first: 1, filter: [{ fieldname: "roles", operator: EQ, value: "x" }]) {
                    totalCount
                }
                Roles(first: 1) { totalCount }
            }"#,
        )
        .await;

    assert_eq!(response.data["Users"], Value::Null);
    assert_eq!(response.data["Roles"]["totalCount"], json!(3));
    assert_matches!(codes(&response).as_slice(), [code] if *code == codes::BAD_USER_INPUT);
}

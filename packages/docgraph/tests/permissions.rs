mod common;

use common::*;
use docgraph::{
    codes,
    testing::{new_test_store, StaticPermission},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn test_denied_root_record_errors_without_failing_siblings() {
    let harness = Harness::with_permission(StaticPermission::new().deny_record("User", "bob"));
    let response = harness
        .run(
            r#"{
                User(name: "bob") { name }
                alice: User(name: "alice") { name }
            }"#,
        )
        .await;

    assert_eq!(
        response.data,
        json!({ "User": null, "alice": { "name": "alice" } })
    );
    assert_eq!(codes(&response), vec![codes::PERMISSION_DENIED]);
    assert_eq!(response.errors[0].path, vec![json!("User")]);
    assert_eq!(response.http_status_hint(), 403);
}

#[tokio::test]
async fn test_unreadable_links_resolve_to_null() {
    let harness = Harness::with_permission(StaticPermission::new().deny_record("User", "bob"));
    let response = harness
        .run(
            r#"{
                ToDo(name: "todo-2") {
                    reference_name__name
                    reference_name { name }
                }
            }"#,
        )
        .await;

    assert!(response.is_ok(), "{:?}", response.errors);
    assert_eq!(
        response.data,
        json!({ "ToDo": { "reference_name__name": "bob", "reference_name": null } })
    );
}

#[tokio::test]
async fn test_listed_rows_are_not_checked_again() {
    let harness = Harness::with_permission(StaticPermission::new().deny_record("User", "bob"));
    let response = harness
        .run(
            r#"{
                Users(first: 5, sortBy: { field: NAME, direction: ASC }) {
                    edges { node { name full_name } }
                }
            }"#,
        )
        .await;

    assert!(response.is_ok(), "{:?}", response.errors);
    assert_eq!(nodes(&response, "/Users")[1]["full_name"], json!("Bob Baker"));
    assert_eq!(
        harness.permission.checks().await,
        vec![("User".to_string(), None)]
    );
}

#[tokio::test]
async fn test_denied_kind_cannot_be_listed() {
    let harness = Harness::with_permission(StaticPermission::new().deny_kind("Note"));
    let response = harness
        .run(
            r#"{
                Notes(first: 1) { totalCount }
                Users(first: 1) { totalCount }
            }"#,
        )
        .await;

    assert_eq!(response.data["Notes"], Value::Null);
    assert_eq!(response.data["Users"]["totalCount"], json!(5));
    assert_eq!(codes(&response), vec![codes::PERMISSION_DENIED]);
    assert!(harness
        .store
        .calls()
        .await
        .iter()
        .all(|call| call.kind() != "Note"));
}

#[tokio::test]
async fn test_store_failures_stay_on_their_fields() {
    let harness = Harness::with_store(new_test_store().fail_kind("Language"));
    let response = harness
        .run(
            r#"{
                Users(first: 5, sortBy: { field: NAME, direction: ASC }) {
                    edges { node { name language { language_name } } }
                }
            }"#,
        )
        .await;

    let users = nodes(&response, "/Users");
    assert_eq!(users.len(), 5);
    assert!(users.iter().all(|user| user["language"].is_null()));
    assert_eq!(users[0]["name"], json!("alice"));

    assert_eq!(response.errors.len(), 5);
    assert!(response
        .errors
        .iter()
        .all(|error| error.code() == codes::STORE_ERROR));
    assert_eq!(response.http_status_hint(), 500);
}

#[tokio::test]
async fn test_failed_links_null_only_themselves() {
    let harness = Harness::with_store(new_test_store().fail_kind("Language"));
    let response = harness
        .run(r#"{ User(name: "alice") { name full_name language { language_name } } }"#)
        .await;

    assert_eq!(
        response.data,
        json!({ "User": { "name": "alice", "full_name": "Alice Archer", "language": null } })
    );
    assert_eq!(codes(&response), vec![codes::STORE_ERROR]);
    assert_eq!(response.errors[0].path, vec![json!("User"), json!("language")]);
}

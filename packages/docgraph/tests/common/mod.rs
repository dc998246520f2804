#![allow(dead_code)]

use docgraph::{
    store::{Requester, Store},
    testing::{fixture_kinds, new_test_store, MapTranslator, MemoryStore, StaticPermission},
    Executor, Response,
};
use docgraph_lib::config::DocgraphConfig;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub permission: Arc<StaticPermission>,
    pub executor: Executor,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            new_test_store(),
            StaticPermission::new(),
            MapTranslator::new(),
            DocgraphConfig::default(),
        )
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(
            store,
            StaticPermission::new(),
            MapTranslator::new(),
            DocgraphConfig::default(),
        )
    }

    pub fn with_permission(permission: StaticPermission) -> Self {
        Self::build(
            new_test_store(),
            permission,
            MapTranslator::new(),
            DocgraphConfig::default(),
        )
    }

    pub fn build(
        store: MemoryStore,
        permission: StaticPermission,
        translator: MapTranslator,
        config: DocgraphConfig,
    ) -> Self {
        let store = Arc::new(store);
        let permission = Arc::new(permission);
        let executor = Executor::builder(fixture_kinds(), store.clone() as Arc<dyn Store>)
            .permission(permission.clone())
            .translator(Arc::new(translator))
            .config(config)
            .build()
            .unwrap();
        Self {
            store,
            permission,
            executor,
        }
    }

    pub async fn run(&self, query: &str) -> Response {
        self.run_with(query, json!({}), Requester::default()).await
    }

    pub async fn run_with(&self, query: &str, variables: Value, requester: Requester) -> Response {
        self.executor.resolve(query, variables, requester).await
    }
}

/// Error codes of a response, in order.
pub fn codes(response: &Response) -> Vec<&str> {
    response.errors.iter().map(|error| error.code()).collect()
}

/// `node` objects of a connection at `pointer`.
pub fn nodes(response: &Response, pointer: &str) -> Vec<Value> {
    response
        .data
        .pointer(pointer)
        .and_then(|connection| connection["edges"].as_array().cloned())
        .unwrap_or_default()
        .into_iter()
        .map(|edge| edge["node"].clone())
        .collect()
}

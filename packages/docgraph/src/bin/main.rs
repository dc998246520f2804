use anyhow::Context;
use docgraph::{
    store::{Requester, Store},
    testing::Fixture,
    Executor,
};
use docgraph_lib::{
    config::{DocgraphArgs, DocgraphConfig, Parser},
    utils::init_logging,
};
use std::sync::Arc;
use tracing::info;

/// `@path` reads the query from a file, anything else is the query itself.
async fn read_query(query: &str) -> anyhow::Result<String> {
    match query.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read query file `{path}`")),
        None => Ok(query.to_string()),
    }
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let args = DocgraphArgs::parse();

    let config = match &args.config {
        Some(path) => DocgraphConfig::from_file(path)?,
        None => DocgraphConfig::try_from(args.clone())?,
    };

    init_logging(&config)?;

    info!("Configuration: {:?}", config);

    let fixture = Fixture::from_path(&args.fixtures)
        .await
        .with_context(|| format!("Failed to load fixtures from {}", args.fixtures.display()))?;
    let (kinds, store) = fixture.into_parts()?;
    let store: Arc<dyn Store> = Arc::new(store);

    let executor = Executor::builder(kinds, store).config(config).build()?;

    let query = read_query(&args.query).await?;
    let variables = match &args.variables {
        Some(raw) => serde_json::from_str(raw).context("`--variables` is not valid JSON")?,
        None => serde_json::Value::Null,
    };

    let response = executor
        .resolve(&query, variables, Requester::new(args.user, args.locale))
        .await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

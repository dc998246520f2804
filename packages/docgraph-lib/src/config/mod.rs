pub mod graphql;
pub mod loader;

pub use crate::{
    config::{graphql::GraphQLConfig, loader::LoaderConfig},
    defaults,
};
pub use clap::{Args, Parser};
use serde::Deserialize;
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

/// Result type returned by configuration operations.
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Environment variables that override file and CLI settings.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "DOCGRAPH_DEPTH_LIMIT")]
    DepthLimit,
    #[strum(serialize = "DOCGRAPH_ENABLE_INTROSPECTION")]
    EnableIntrospection,
    #[strum(serialize = "DOCGRAPH_BATCH_DELAY_MS")]
    BatchDelayMs,
}

/// Parse an optional environment variable.
pub(crate) fn env_var<T: FromStr>(var: EnvVar) -> ConfigResult<Option<T>> {
    match std::env::var(var.as_ref()) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: var.as_ref().to_string(),
                expected: std::any::type_name::<T>(),
            }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "docgraph",
    about = "Resolve a graph query against a fixture record store.",
    version
)]
pub struct DocgraphArgs {
    /// Log level passed to the subscriber.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn", "trace"]), help = "Log level passed to the subscriber.")]
    pub log_level: String,

    /// Docgraph config file.
    #[clap(short, long, value_name = "FILE", help = "Docgraph config file.")]
    pub config: Option<PathBuf>,

    /// JSON file holding the records served by the in-memory store.
    #[clap(
        long,
        value_name = "FILE",
        help = "JSON file holding the records served by the in-memory store."
    )]
    pub fixtures: PathBuf,

    /// Query text, or `@path` to read it from a file.
    #[clap(short, long, help = "Query text, or @path to read it from a file.")]
    pub query: String,

    /// Query variables as a JSON object.
    #[clap(long, help = "Query variables as a JSON object.")]
    pub variables: Option<String>,

    /// Identity the query runs as.
    #[clap(long, default_value = defaults::REQUESTER, help = "Identity the query runs as.")]
    pub user: String,

    /// Locale used for translatable fields.
    #[clap(long, default_value = defaults::LOCALE, help = "Locale used for translatable fields.")]
    pub locale: String,

    /// Maximum nesting depth of a query.
    #[clap(long, default_value_t = defaults::DEPTH_LIMIT, help = "Maximum nesting depth of a query.")]
    pub depth_limit: usize,

    /// Allow introspection queries.
    #[clap(long, help = "Allow introspection queries.")]
    pub enable_introspection: bool,

    /// Milliseconds a loader waits to collect a batch.
    #[clap(long, default_value_t = defaults::BATCH_DELAY_MS, help = "Milliseconds a loader waits to collect a batch.")]
    pub batch_delay_ms: u64,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()>;
}

/// Docgraph engine configuration.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct DocgraphConfig {
    pub log_level: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub graphql: GraphQLConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Default for DocgraphConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            graphql: GraphQLConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl TryFrom<DocgraphArgs> for DocgraphConfig {
    type Error = ConfigError;

    fn try_from(args: DocgraphArgs) -> ConfigResult<Self> {
        let mut config = DocgraphConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            graphql: GraphQLConfig {
                depth_limit: args.depth_limit,
                enable_introspection: args.enable_introspection,
            },
            loader: LoaderConfig {
                batch_delay_ms: args.batch_delay_ms,
            },
        };

        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

fn yaml_key(name: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(name.into())
}

fn invalid(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        expected,
    }
}

fn as_bool(value: &serde_yaml::Value, key: &str) -> ConfigResult<bool> {
    value.as_bool().ok_or_else(|| invalid(key, "bool"))
}

fn as_u64(value: &serde_yaml::Value, key: &str) -> ConfigResult<u64> {
    value.as_u64().ok_or_else(|| invalid(key, "unsigned integer"))
}

impl DocgraphConfig {
    // Keys and sections missing from the file keep their default value.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let file = File::open(path)?;

        let mut config = DocgraphConfig::default();

        let content: serde_yaml::Value = serde_yaml::from_reader(file)?;

        if let Some(log_level) = content.get(yaml_key("log_level")) {
            config.log_level = log_level
                .as_str()
                .ok_or_else(|| invalid("log_level", "string"))?
                .to_string();
        }

        if let Some(verbose) = content.get(yaml_key("verbose")) {
            config.verbose = as_bool(verbose, "verbose")?;
        }

        if let Some(section) = content.get(yaml_key("graphql")) {
            if let Some(depth_limit) = section.get(yaml_key("depth_limit")) {
                config.graphql.depth_limit =
                    as_u64(depth_limit, "graphql.depth_limit")? as usize;
            }

            if let Some(enabled) = section.get(yaml_key("enable_introspection")) {
                config.graphql.enable_introspection =
                    as_bool(enabled, "graphql.enable_introspection")?;
            }
        }

        if let Some(section) = content.get(yaml_key("loader")) {
            if let Some(delay) = section.get(yaml_key("batch_delay_ms")) {
                config.loader.batch_delay_ms = as_u64(delay, "loader.batch_delay_ms")?;
            }
        }

        config.inject_opt_env_vars()?;

        Ok(config)
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        self.graphql.inject_opt_env_vars()?;
        self.loader.inject_opt_env_vars()?;

        Ok(())
    }
}

/// Held by tests that read or write `DOCGRAPH_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

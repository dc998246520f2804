use crate::{
    config::{env_var, ConfigResult, Env, EnvVar},
    defaults,
};
use serde::Deserialize;

/// Query validation settings applied before any resolver runs.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct GraphQLConfig {
    /// Maximum nesting depth of a query.
    #[serde(default = "default_depth_limit")]
    pub depth_limit: usize,

    /// Allow `__schema` and `__type` queries.
    #[serde(default)]
    pub enable_introspection: bool,
}

fn default_depth_limit() -> usize {
    defaults::DEPTH_LIMIT
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            depth_limit: defaults::DEPTH_LIMIT,
            enable_introspection: defaults::ENABLE_INTROSPECTION,
        }
    }
}

impl Env for GraphQLConfig {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        if let Some(depth_limit) = env_var::<usize>(EnvVar::DepthLimit)? {
            self.depth_limit = depth_limit;
        }
        if let Some(enabled) = env_var::<bool>(EnvVar::EnableIntrospection)? {
            self.enable_introspection = enabled;
        }
        Ok(())
    }
}

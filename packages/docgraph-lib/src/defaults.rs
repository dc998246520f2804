pub const LOG_LEVEL: &str = "info";

pub const VERBOSE_LOGGING: bool = false;

/// Maximum nesting depth of a query's selection tree.
pub const DEPTH_LIMIT: usize = 10;

pub const ENABLE_INTROSPECTION: bool = false;

/// Time a loader waits to collect sibling `load` calls before dispatching.
pub const BATCH_DELAY_MS: u64 = 1;

pub const REQUESTER: &str = "Guest";

pub const LOCALE: &str = "en";

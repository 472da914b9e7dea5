#![forbid(unsafe_code)]

//! Optional JSON log output for host pages and native harnesses.

use tracing_subscriber::EnvFilter;

/// Install a global JSON subscriber filtered by `filter` (an `EnvFilter`
/// directive such as `"wkit_runtime=debug,info"`).
///
/// Returns `false` if a global subscriber was already set or the directive
/// does not parse.
pub fn init_json_logging(filter: &str) -> bool {
    let Ok(filter) = EnvFilter::try_new(filter) else {
        return false;
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

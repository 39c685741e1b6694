//! Command-line interface for the search engines.
//! This module is not part of the public library API.

pub mod args;
pub mod commands;

#[cfg(test)]
mod tests;

pub use args::Gametree;

use env_logger::{Builder, Env};

/// Logger for the binary. Filters at `info` so `--verbose` summaries show
/// up unless the filter variable of `env` says otherwise.
pub fn logger(env: Env<'_>) -> Builder {
    Builder::from_env(env.default_filter_or("info"))
}

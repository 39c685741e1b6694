use thiserror::Error;

use crate::arena::ArenaError;
use crate::setting::ConfigError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid search setting: {0}")]
    Configuration(#[from] ConfigError),
    #[error("no available actions")]
    NoAvailableActions,
    #[error("node arena error: {0}")]
    Arena(#[from] ArenaError),
    #[error(
        "worker {worker} enumerated different root actions than worker 0; \
         the rules are not deterministic or have side effects"
    )]
    InconsistentEnumeration { worker: usize },
    #[error("failed to start search workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

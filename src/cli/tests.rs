//! CLI tests.
//!
//! Test coverage:
//! - Default and overridden logger filters
//! - `--verbose` parsing for both subcommands

use env_logger::Env;
use log::LevelFilter;
use structopt::StructOpt;

use super::*;

#[test]
fn test_logger_defaults_to_info() {
    let env = Env::new().filter("GAMETREE_TEST_UNSET_LOG_FILTER");
    assert_eq!(logger(env).build().filter(), LevelFilter::Info);
}

#[test]
fn test_logger_filter_variable_overrides_default() {
    std::env::set_var("GAMETREE_TEST_WARN_LOG_FILTER", "warn");
    let env = Env::new().filter("GAMETREE_TEST_WARN_LOG_FILTER");
    assert_eq!(logger(env).build().filter(), LevelFilter::Warn);
}

#[test]
fn test_verbose_flag_parses_for_both_subcommands() {
    match Gametree::from_iter(["gametree", "mcts", "--verbose"]) {
        Gametree::Mcts(args) => assert!(args.verbose),
        Gametree::Minimax(_) => panic!("parsed the wrong subcommand"),
    }
    match Gametree::from_iter(["gametree", "minimax", "-v"]) {
        Gametree::Minimax(args) => assert!(args.verbose),
        Gametree::Mcts(_) => panic!("parsed the wrong subcommand"),
    }
}

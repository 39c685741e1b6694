//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{mcts::MctsArgs, minimax::MinimaxArgs};

#[derive(StructOpt)]
#[structopt(
    name = "gametree",
    about = "Minimax and parallel MCTS search over tic-tac-toe positions"
)]
pub enum Gametree {
    #[structopt(
        name = "minimax",
        about = "Search the position given with `--board` (default: empty board) using negamax with alpha-beta pruning to the given `--depth` (default: 9). Pass `--no-pruning` to search every node."
    )]
    Minimax(MinimaxArgs),
    #[structopt(
        name = "mcts",
        about = "Search the position given with `--board` (default: empty board) using Monte Carlo Tree Search on `--threads` workers (default: 4), each running up to `--iterations` iterations (default: 10000) or `--timeout` seconds (default: 30, 0 for no limit). Pass `--seed` for a reproducible search."
    )]
    Mcts(MctsArgs),
}

impl crate::cli::commands::Command for Gametree {
    fn execute(self) {
        macro_rules! execute_command {
            ($($variant:ident($cmd:ident)),+ $(,)?) => {
                match self {
                    $(Self::$variant($cmd) => $cmd.execute(),)+
                }
            };
        }

        execute_command! {
            Minimax(cmd),
            Mcts(cmd),
        }
    }
}

//! CLI command implementations.

use gametree::games::tic_tac_toe::{Board, GameResult, Placement};

pub trait Command {
    fn execute(self);
}

pub mod mcts;
pub mod minimax;

/// Board string accepted by `--board` for the empty position.
pub(crate) const EMPTY_BOARD: &str = ".........";

pub(crate) fn board_to_str(board: &Board) -> String {
    board.to_string().replace('\n', " / ")
}

pub(crate) fn placement_to_str(placement: &Placement) -> String {
    placement.to_string()
}

pub(crate) fn result_to_str(result: &GameResult) -> String {
    result.to_string()
}

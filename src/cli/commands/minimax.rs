//! Minimax command - evaluate a position with negamax.

use gametree::games::tic_tac_toe::{self, Board, TicTacToe};
use gametree::minimax::{MinimaxSearch, Pruning};
use gametree::SearchSetting;
use structopt::StructOpt;

use super::{board_to_str, placement_to_str, result_to_str, Command, EMPTY_BOARD};

#[derive(StructOpt)]
pub struct MinimaxArgs {
    #[structopt(short, long, default_value = "9")]
    pub depth: usize,
    #[structopt(long = "board", default_value = EMPTY_BOARD)]
    pub board: Board,
    /// Search every node instead of pruning with alpha-beta.
    #[structopt(long)]
    pub no_pruning: bool,
    /// Log the setting and the per-move table at info level.
    /// `RUST_LOG` overrides the default `info` filter.
    #[structopt(short, long)]
    pub verbose: bool,
}

impl Command for MinimaxArgs {
    fn execute(self) {
        let setting = SearchSetting::default().with_max_depth(self.depth);
        let pruning = if self.no_pruning {
            Pruning::Disabled
        } else {
            Pruning::AlphaBeta
        };

        let mut search = MinimaxSearch::new(TicTacToe, tic_tac_toe::evaluate);
        search.install_formatters(board_to_str, placement_to_str, result_to_str);
        if self.verbose {
            search.enable_log();
        }

        println!("{}\n", self.board);
        match search.search(&self.board, &setting, pruning, true) {
            Ok(decision) => match decision.action {
                Some(action) => {
                    println!("best move: {}", action);
                    if let Some(evaluation) = decision.evaluation {
                        println!("evaluation: {}", evaluation);
                    }
                    println!(
                        "nodes: {}, leaf evaluations: {}",
                        search.node_count(),
                        search.leaf_count()
                    );
                }
                None => eprintln!("There are no valid moves in the given position."),
            },
            Err(err) => eprintln!("Failed to calculate best move: {}", err),
        }
    }
}

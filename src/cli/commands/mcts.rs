//! MCTS command - search a position with parallel Monte Carlo Tree Search.

use gametree::games::tic_tac_toe::{Board, TicTacToe};
use gametree::{MctsSearch, SearchSetting};
use structopt::StructOpt;

use super::{board_to_str, placement_to_str, result_to_str, Command, EMPTY_BOARD};

#[derive(StructOpt)]
pub struct MctsArgs {
    #[structopt(long = "board", default_value = EMPTY_BOARD)]
    pub board: Board,
    #[structopt(short, long, default_value = "4")]
    pub threads: usize,
    #[structopt(short, long, default_value = "10000")]
    pub iterations: u64,
    /// Wall-clock limit per worker in seconds; 0 disables it.
    #[structopt(long, default_value = "30")]
    pub timeout: f64,
    #[structopt(long, default_value = "100000")]
    pub capacity: usize,
    #[structopt(short, long, default_value = "1.4142135623730951")]
    pub exploration: f64,
    #[structopt(long)]
    pub seed: Option<u64>,
    /// Log the setting, worker summaries and the per-move table at info level.
    /// `RUST_LOG` overrides the default `info` filter.
    #[structopt(short, long)]
    pub verbose: bool,
}

impl MctsArgs {
    fn setting(&self) -> SearchSetting {
        let setting = SearchSetting::default()
            .with_thread_count(self.threads)
            .with_iteration_budget(self.iterations)
            .with_time_budget(self.timeout)
            .with_node_capacity(self.capacity)
            .with_exploration_constant(self.exploration);
        match self.seed {
            Some(seed) => setting.with_seed(seed),
            None => setting,
        }
    }
}

impl Command for MctsArgs {
    fn execute(self) {
        let setting = self.setting();
        let mut search = MctsSearch::new(TicTacToe);
        search.install_formatters(board_to_str, placement_to_str, result_to_str);
        if self.verbose {
            search.enable_log();
        }

        println!("{}\n", self.board);
        match search.search_with_report(&self.board, &setting) {
            Ok(report) => {
                println!("best move: {}", report.action);
                println!(
                    "visits: {} of {} at the root, nodes: {}, time: {:?}",
                    report.best_visits(),
                    report.root_visits,
                    report.node_count,
                    report.duration
                );
            }
            Err(err) => eprintln!("Failed to calculate best move: {}", err),
        }
    }
}

//! Minimax tests on Nim and tic-tac-toe.
//!
//! Test coverage:
//! - Basic search (winning moves, losing positions)
//! - Root special cases (single action, terminal root, zero depth)
//! - Alpha-beta and plain negamax agreement
//! - Leaf and node accounting
//! - Visual tree recording and formatters

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::error::SearchError;
use crate::games::tic_tac_toe::{self, Board, TicTacToe, CORNERS};
use crate::rules::{AgentIndex, GameRules};
use crate::search_log::{NodeValue, ALPHA_KEY, BETA_KEY, EVALUATION_KEY, LEAF_COUNT_KEY};
use crate::setting::{ConfigError, SearchSetting};

/// Nim: players take 1-3 objects, whoever takes the last one wins.
#[derive(Clone, Debug)]
struct NimState {
    pile: u8,
    to_move: AgentIndex,
}

impl NimState {
    fn new(pile: u8) -> Self {
        Self { pile, to_move: 1 }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct NimMove {
    take: u8,
}

struct Nim;

impl GameRules for Nim {
    type State = NimState;
    type Action = NimMove;
    type Outcome = AgentIndex;

    fn apply(&self, state: &mut NimState, action: &NimMove) {
        state.pile -= action.take;
        state.to_move = -state.to_move;
    }

    fn actions(&self, state: &NimState) -> Vec<NimMove> {
        (1..=std::cmp::min(3, state.pile))
            .map(|take| NimMove { take })
            .collect()
    }

    fn winner(&self, state: &NimState) -> AgentIndex {
        if state.pile == 0 {
            -state.to_move
        } else {
            0
        }
    }

    fn outcome(&self, _state: &NimState, winner: AgentIndex) -> AgentIndex {
        winner
    }

    fn credits(&self, state: &NimState, outcome: &AgentIndex) -> bool {
        *outcome == -state.to_move
    }
}

fn nim_evaluator(state: &NimState, winner: AgentIndex) -> f64 {
    if winner != 0 {
        // only the agent that just moved can have taken the last object
        -100.0
    } else if state.pile % 4 == 0 {
        -1.0
    } else {
        1.0
    }
}

type NimEvaluator = fn(&NimState, AgentIndex) -> f64;
type BoardEvaluator = fn(&Board, AgentIndex) -> f64;

fn nim_search() -> MinimaxSearch<Nim, NimEvaluator> {
    MinimaxSearch::new(Nim, nim_evaluator as NimEvaluator)
}

fn tic_tac_toe_search() -> MinimaxSearch<TicTacToe, BoardEvaluator> {
    MinimaxSearch::new(TicTacToe, tic_tac_toe::evaluate as BoardEvaluator)
}

fn depth(depth: usize) -> SearchSetting {
    SearchSetting::default().with_max_depth(depth)
}

#[test]
fn test_finds_winning_nim_move() {
    let mut search = nim_search();
    let state = NimState::new(5);

    let negamax = search.run_negamax(&state, &depth(5)).unwrap();
    assert_eq!(negamax, NimMove { take: 1 });

    let alpha_beta = search.run_alpha_beta(&state, &depth(5)).unwrap();
    assert_eq!(alpha_beta, NimMove { take: 1 });
    assert_eq!(search.last_evaluation(), Some(100.0));
}

#[test]
fn test_takes_last_object_immediately() {
    let mut search = nim_search();
    let action = search.run_alpha_beta(&NimState::new(3), &depth(4)).unwrap();
    assert_eq!(action, NimMove { take: 3 });
}

#[test]
fn test_losing_position_breaks_ties_by_enumeration_order() {
    let mut search = nim_search();
    let action = search.run_negamax(&NimState::new(4), &depth(6)).unwrap();

    assert_eq!(action, NimMove { take: 1 });
    assert_eq!(search.last_evaluation(), Some(-100.0));
}

#[test]
fn test_single_action_short_circuits() {
    let mut search = nim_search();
    let action = search.run_negamax(&NimState::new(1), &depth(4)).unwrap();

    assert_eq!(action, NimMove { take: 1 });
    assert_eq!(search.leaf_count(), 0);
    assert_eq!(search.node_count(), 1);
    assert_eq!(search.last_evaluation(), None);
}

#[test]
fn test_evaluation_searches_single_action() {
    let mut search = nim_search();
    let evaluation = search.evaluation(&NimState::new(1), &depth(4)).unwrap();

    assert_eq!(evaluation, 100.0);
    assert_eq!(search.leaf_count(), 1);
    assert_eq!(search.node_count(), 2);
}

#[test]
fn test_terminal_root_is_evaluated_once() {
    let mut search = nim_search();
    let state = NimState::new(0);

    let result = search.run_alpha_beta(&state, &depth(4));
    assert!(matches!(result, Err(SearchError::NoAvailableActions)));
    assert_eq!(search.leaf_count(), 1);
    assert_eq!(search.node_count(), 1);

    let evaluation = search.evaluation(&state, &depth(4)).unwrap();
    assert_eq!(evaluation, -100.0);
    assert_eq!(search.leaf_count(), 1);
}

#[test]
fn test_terminal_states_are_never_expanded() {
    let calls = AtomicUsize::new(0);
    let evaluator = |state: &Board, winner: AgentIndex| {
        calls.fetch_add(1, Ordering::SeqCst);
        tic_tac_toe::evaluate(state, winner)
    };
    let mut search = MinimaxSearch::new(TicTacToe, evaluator);

    // X already won; O to move still has empty cells
    let state: Board = "XXXOO....".parse().unwrap();
    let evaluation = search.evaluation(&state, &depth(9)).unwrap();

    assert_eq!(evaluation, -14.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(search.node_count(), 1);
}

#[test]
fn test_zero_depth_is_a_configuration_error() {
    let mut search = nim_search();
    let result = search.run_negamax(&NimState::new(5), &depth(0));
    assert!(matches!(
        result,
        Err(SearchError::Configuration(ConfigError::DepthTooLow))
    ));
}

#[test]
fn test_depth_one_evaluates_every_child() {
    let mut search = nim_search();
    search.run_negamax(&NimState::new(5), &depth(1)).unwrap();

    assert_eq!(search.leaf_count(), 3);
    assert_eq!(search.node_count(), 4);
}

#[test]
fn test_alpha_beta_matches_negamax_on_nim() {
    for pile in 2..=12 {
        for max_depth in 1..=6 {
            let state = NimState::new(pile);
            let setting = depth(max_depth);

            let mut negamax = nim_search();
            let plain = negamax
                .search(&state, &setting, Pruning::Disabled, false)
                .unwrap();

            let mut alpha_beta = nim_search();
            let pruned = alpha_beta
                .search(&state, &setting, Pruning::AlphaBeta, false)
                .unwrap();

            assert_eq!(plain.action, pruned.action, "pile {pile}, depth {max_depth}");
            assert_eq!(
                plain.evaluation, pruned.evaluation,
                "pile {pile}, depth {max_depth}"
            );
            assert!(alpha_beta.node_count() <= negamax.node_count());
        }
    }
}

#[test]
fn test_alpha_beta_matches_negamax_on_tic_tac_toe() {
    let positions = ["....X....", "X........", "X...O....", "XO..X....", "XOX.O...."];
    for position in positions {
        let state: Board = position.parse().unwrap();
        let setting = depth(9);

        let mut negamax = tic_tac_toe_search();
        let plain = negamax
            .search(&state, &setting, Pruning::Disabled, false)
            .unwrap();
        let mut alpha_beta = tic_tac_toe_search();
        let pruned = alpha_beta
            .search(&state, &setting, Pruning::AlphaBeta, false)
            .unwrap();

        assert_eq!(plain.action, pruned.action, "position {position}");
        assert_eq!(plain.evaluation, pruned.evaluation, "position {position}");
        assert!(alpha_beta.node_count() <= negamax.node_count());
    }
}

#[test]
fn test_alpha_beta_prunes_opening_tree() {
    let state: Board = "....X....".parse().unwrap();

    let mut negamax = tic_tac_toe_search();
    negamax.run_negamax(&state, &depth(9)).unwrap();
    let mut alpha_beta = tic_tac_toe_search();
    alpha_beta.run_alpha_beta(&state, &depth(9)).unwrap();

    assert!(alpha_beta.node_count() < negamax.node_count());
    assert!(alpha_beta.leaf_count() < negamax.leaf_count());
}

#[test]
fn test_center_opening_is_answered_with_a_corner() {
    let mut search = tic_tac_toe_search();
    let state: Board = "....X....".parse().unwrap();

    let action = search.run_alpha_beta(&state, &depth(9)).unwrap();

    assert!(CORNERS.contains(&action.cell), "{} is not a corner", action);
    assert_eq!(search.last_evaluation(), Some(0.0));
}

#[test]
fn test_blocks_immediate_threat() {
    let mut search = tic_tac_toe_search();
    // X threatens the top row; O must take cell 2
    let state: Board = "XX..O....".parse().unwrap();

    let action = search.run_negamax(&state, &depth(9)).unwrap();
    assert_eq!(action.cell, 2);
}

#[test]
fn test_last_empty_cell_is_returned_without_search() {
    let mut search = tic_tac_toe_search();
    let state: Board = "XOXXOOOX.".parse().unwrap();

    let action = search.run_alpha_beta(&state, &depth(9)).unwrap();

    assert_eq!(action.cell, 8);
    assert_eq!(search.node_count(), 1);
    assert_eq!(search.leaf_count(), 0);
}

#[test]
fn test_visual_tree_records_every_node() {
    let mut search = nim_search();
    search.enable_visual_tree();
    search.run_alpha_beta(&NimState::new(6), &depth(4)).unwrap();

    let tree = search.take_visual_tree().unwrap();
    assert_eq!(tree.len(), search.node_count());

    let root = tree.root();
    assert_eq!(
        tree.value(root, LEAF_COUNT_KEY),
        Some(&NodeValue::Integer(search.leaf_count() as i64))
    );
    assert_eq!(
        tree.value(root, EVALUATION_KEY),
        Some(&NodeValue::Float(100.0))
    );

    let mut bounded = 0;
    tree.traverse(|_, node| {
        if node.value(ALPHA_KEY).is_some() && node.value(BETA_KEY).is_some() {
            bounded += 1;
        }
    });
    assert!(bounded > 0);
}

#[test]
fn test_visual_tree_disabled_by_default() {
    let mut search = nim_search();
    search.run_alpha_beta(&NimState::new(6), &depth(3)).unwrap();
    assert!(search.take_visual_tree().is_none());
}

#[test]
fn test_formatters_and_logging_do_not_change_decision() {
    let state: Board = "X...O....".parse().unwrap();

    let mut quiet = tic_tac_toe_search();
    let expected = quiet.run_alpha_beta(&state, &depth(9)).unwrap();

    let mut verbose = tic_tac_toe_search();
    verbose.install_formatters(
        |board| board.to_string(),
        |placement| placement.to_string(),
        |result| result.to_string(),
    );
    verbose.enable_log();
    verbose.enable_visual_tree();
    let action = verbose.run_alpha_beta(&state, &depth(9)).unwrap();

    assert_eq!(action, expected);
    assert_eq!(verbose.node_count(), quiet.node_count());
}

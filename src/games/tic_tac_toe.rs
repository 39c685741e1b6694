//! 3x3 tic-tac-toe, the reference game for the engines, the CLI and the
//! benchmarks.
//!
//! Boards are written as nine characters, row by row: `X`, `O`, and `.` (or
//! `_`/`-`) for an empty cell. `X` moves first, so the side to move is
//! derived from the mark counts.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::rules::{AgentIndex, GameRules, DEFAULT_NO_WINNER};

pub const X_AGENT: AgentIndex = 1;
pub const O_AGENT: AgentIndex = -1;
pub const DRAW: AgentIndex = 2;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    Empty,
    X,
    O,
}

impl Mark {
    pub fn agent(self) -> AgentIndex {
        match self {
            Mark::X => X_AGENT,
            Mark::O => O_AGENT,
            Mark::Empty => DEFAULT_NO_WINNER,
        }
    }

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
            Mark::Empty => Mark::Empty,
        }
    }

    fn to_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
            Mark::Empty => '.',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Mark; 9],
    to_move: Mark,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [Mark::Empty; 9],
            to_move: Mark::X,
        }
    }
}

impl Board {
    pub fn get(&self, cell: usize) -> Mark {
        self.cells[cell]
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// The mark that made the last move.
    pub fn last_mover(&self) -> Mark {
        self.to_move.opponent()
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(move |&cell| self.cells[cell] == Mark::Empty)
    }

    fn line_winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a];
            (mark != Mark::Empty && mark == self.cells[b] && mark == self.cells[c]).then_some(mark)
        })
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BoardParseError {
    #[error("expected 9 cells, found {0}")]
    WrongLength(usize),
    #[error("invalid cell character {0:?}")]
    InvalidCell(char),
    #[error("mark counts are impossible: {x} X and {o} O")]
    ImpossibleCounts { x: usize, o: usize },
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace() && *c != '/').collect();
        if chars.len() != 9 {
            return Err(BoardParseError::WrongLength(chars.len()));
        }

        let mut cells = [Mark::Empty; 9];
        for (cell, c) in cells.iter_mut().zip(chars) {
            *cell = match c {
                'X' | 'x' => Mark::X,
                'O' | 'o' => Mark::O,
                '.' | '_' | '-' => Mark::Empty,
                other => return Err(BoardParseError::InvalidCell(other)),
            };
        }

        let x = cells.iter().filter(|&&m| m == Mark::X).count();
        let o = cells.iter().filter(|&&m| m == Mark::O).count();
        let to_move = match x.checked_sub(o) {
            Some(0) => Mark::X,
            Some(1) => Mark::O,
            _ => return Err(BoardParseError::ImpossibleCounts { x, o }),
        };

        Ok(Self { cells, to_move })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let line: String = self.cells[row * 3..row * 3 + 3]
                .iter()
                .map(|m| m.to_char())
                .collect();
            writeln!(f, "{}", line)?;
        }
        write!(f, "{} to move", self.to_move.to_char())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub cell: usize,
    pub mark: Mark,
}

impl Placement {
    pub fn row(&self) -> usize {
        self.cell / 3
    }

    pub fn column(&self) -> usize {
        self.cell % 3
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ({}, {})", self.mark.to_char(), self.row(), self.column())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Win(Mark),
    Draw,
    Unfinished,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win(mark) => write!(f, "{} wins", mark.to_char()),
            GameResult::Draw => write!(f, "draw"),
            GameResult::Unfinished => write!(f, "unfinished"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TicTacToe;

impl GameRules for TicTacToe {
    type State = Board;
    type Action = Placement;
    type Outcome = GameResult;

    fn apply(&self, state: &mut Board, action: &Placement) {
        state.cells[action.cell] = action.mark;
        state.to_move = action.mark.opponent();
    }

    fn actions(&self, state: &Board) -> Vec<Placement> {
        let mark = state.to_move;
        state
            .empty_cells()
            .map(|cell| Placement { cell, mark })
            .collect()
    }

    fn winner(&self, state: &Board) -> AgentIndex {
        match state.line_winner() {
            Some(mark) => mark.agent(),
            None if state.empty_cells().next().is_none() => DRAW,
            None => DEFAULT_NO_WINNER,
        }
    }

    fn outcome(&self, _state: &Board, winner: AgentIndex) -> GameResult {
        match winner {
            X_AGENT => GameResult::Win(Mark::X),
            O_AGENT => GameResult::Win(Mark::O),
            DRAW => GameResult::Draw,
            _ => GameResult::Unfinished,
        }
    }

    // A draw credits both sides, so each agent maximises its chance of not
    // losing.
    fn credits(&self, state: &Board, outcome: &GameResult) -> bool {
        match outcome {
            GameResult::Win(mark) => *mark == state.last_mover(),
            GameResult::Draw => true,
            GameResult::Unfinished => false,
        }
    }
}

/// Minimax leaf score for the side to move: a loss is worse the sooner it
/// happens, draws and unfinished positions are 0.
pub fn evaluate(state: &Board, winner: AgentIndex) -> f64 {
    let empty = state.empty_cells().count() as f64;
    match winner {
        X_AGENT | O_AGENT if winner == state.to_move.agent() => 10.0 + empty,
        X_AGENT | O_AGENT => -(10.0 + empty),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let board: Board = "X.O/.X./..O".parse().unwrap();
        assert_eq!(board.get(0), Mark::X);
        assert_eq!(board.get(2), Mark::O);
        assert_eq!(board.to_move(), Mark::X);
        assert_eq!(board.to_string(), "X.O\n.X.\n..O\nX to move");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "X.O".parse::<Board>(),
            Err(BoardParseError::WrongLength(3))
        );
        assert_eq!(
            "X.O..Z...".parse::<Board>(),
            Err(BoardParseError::InvalidCell('Z'))
        );
        assert_eq!(
            "XX.......".parse::<Board>(),
            Err(BoardParseError::ImpossibleCounts { x: 2, o: 0 })
        );
    }

    #[test]
    fn test_actions_follow_cell_order() {
        let board: Board = "....X....".parse().unwrap();
        let actions = TicTacToe.actions(&board);
        let cells: Vec<usize> = actions.iter().map(|a| a.cell).collect();
        assert_eq!(cells, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert!(actions.iter().all(|a| a.mark == Mark::O));
    }

    #[test]
    fn test_winner_detection() {
        let rules = TicTacToe;
        assert_eq!(rules.winner(&"XXXOO....".parse().unwrap()), X_AGENT);
        assert_eq!(rules.winner(&"XXO.O.O.X".parse().unwrap()), O_AGENT);
        assert_eq!(rules.winner(&"XOXXOOOXX".parse().unwrap()), DRAW);
        assert_eq!(rules.winner(&Board::default()), DEFAULT_NO_WINNER);
    }

    #[test]
    fn test_credits_last_mover_and_draws() {
        let rules = TicTacToe;
        let board: Board = "XXXOO....".parse().unwrap();
        let outcome = rules.outcome(&board, rules.winner(&board));
        assert_eq!(outcome, GameResult::Win(Mark::X));
        assert!(rules.credits(&board, &outcome));

        let after_o: Board = "XX.OOO.X.".parse().unwrap();
        assert!(!rules.credits(&after_o, &GameResult::Win(Mark::X)));
        assert!(rules.credits(&after_o, &GameResult::Draw));
        assert!(!rules.credits(&after_o, &GameResult::Unfinished));
    }

    #[test]
    fn test_evaluate_is_side_to_move_relative() {
        let board: Board = "XXXOO....".parse().unwrap();
        // O to move, X already won
        assert_eq!(evaluate(&board, X_AGENT), -14.0);
        assert_eq!(evaluate(&board, DRAW), 0.0);
        assert_eq!(evaluate(&Board::default(), DEFAULT_NO_WINNER), 0.0);
    }
}

//! Tic-Tac-Toe against a heuristic computer opponent.
//!
//! The opponent is deliberately not a minimax search. It evaluates, in strict
//! priority order: win now, block the visitor, take the center, take a random
//! open corner, take a random open cell. A careful visitor can occasionally
//! beat it.
//!
//! This module is `no_std` friendly (fixed-size board, no `Vec`).

use serde::{Deserialize, Serialize};

use crate::prng::Prng;

pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];

pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Win { mark: Mark, line: [usize; 3] },
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicTacToeEvent {
    /// Input rejected (not the visitor's turn, occupied cell, round over...).
    Ignored,
    /// A mark was placed and the round continues.
    Placed { index: usize, mark: Mark },
    /// The computer started its thinking delay.
    ComputerThinking,
    /// The placement at `index` ended the round.
    Finished { index: usize, outcome: Outcome },
    None,
}

/// First uniform, non-empty line on the board, if any.
pub fn calculate_winner(board: &Board) -> Option<(Mark, [usize; 3])> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(m) if board[b] == Some(m) && board[c] == Some(m) => Some((m, [a, b, c])),
        _ => None,
    })
}

pub fn is_full(board: &Board) -> bool {
    board.iter().all(Option::is_some)
}

fn completes_line(board: &Board, index: usize, mark: Mark) -> bool {
    let mut test = *board;
    test[index] = Some(mark);
    matches!(calculate_winner(&test), Some((m, _)) if m == mark)
}

/// Pick the computer's cell with the fixed five-rule priority policy.
pub fn computer_move(board: &Board, computer: Mark, rng: &mut Prng) -> Option<usize> {
    let player = computer.other();
    let mut empty = [0usize; 9];
    let mut n = 0;
    for (i, cell) in board.iter().enumerate() {
        if cell.is_none() {
            empty[n] = i;
            n += 1;
        }
    }
    let empty = &empty[..n];
    if empty.is_empty() {
        return None;
    }

    if let Some(&i) = empty.iter().find(|&&i| completes_line(board, i, computer)) {
        return Some(i);
    }
    if let Some(&i) = empty.iter().find(|&&i| completes_line(board, i, player)) {
        return Some(i);
    }
    if board[CENTER].is_none() {
        return Some(CENTER);
    }

    let mut corners = [0usize; 4];
    let mut c = 0;
    for &i in CORNERS.iter() {
        if board[i].is_none() {
            corners[c] = i;
            c += 1;
        }
    }
    if let Some(&i) = rng.choose(&corners[..c]) {
        return Some(i);
    }

    rng.choose(empty).copied()
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: Board,
    player: Option<Mark>,
    x_to_move: bool,
    outcome: Option<Outcome>,
    computer_delay_ms: u32,
    thinking_remaining_ms: Option<u32>,
    rng: Prng,
}

impl TicTacToe {
    pub fn new(seed: u64, computer_delay_ms: u32) -> Self {
        Self {
            board: [None; 9],
            player: None,
            x_to_move: true,
            outcome: None,
            computer_delay_ms,
            thinking_remaining_ms: None,
            rng: Prng::new(seed),
        }
    }

    /// Start from an arbitrary position. `x_to_move` follows from the mark counts.
    pub fn from_board(seed: u64, board: Board, player: Mark) -> Self {
        let xs = board.iter().filter(|c| **c == Some(Mark::X)).count();
        let os = board.iter().filter(|c| **c == Some(Mark::O)).count();
        let mut game = Self::new(seed, 0);
        game.board = board;
        game.player = Some(player);
        game.x_to_move = xs == os;
        game.refresh_outcome();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> Option<Mark> {
        self.player
    }

    pub fn computer(&self) -> Option<Mark> {
        self.player.map(Mark::other)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking_remaining_ms.is_some()
    }

    pub fn to_move(&self) -> Mark {
        if self.x_to_move {
            Mark::X
        } else {
            Mark::O
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.player == Some(self.to_move())
    }

    /// Visitor picks a side. X always moves first, so choosing O hands the
    /// opening move to the computer.
    pub fn choose_mark(&mut self, mark: Mark) -> TicTacToeEvent {
        if self.player.is_some() {
            return TicTacToeEvent::Ignored;
        }
        self.player = Some(mark);
        self.schedule_computer()
    }

    pub fn play(&mut self, index: usize) -> TicTacToeEvent {
        if index >= 9
            || self.board[index].is_some()
            || self.outcome.is_some()
            || self.is_thinking()
            || !self.is_player_turn()
        {
            return TicTacToeEvent::Ignored;
        }
        let mark = self.to_move();
        let event = self.place(index, mark);
        if self.outcome.is_none() {
            return match self.schedule_computer() {
                TicTacToeEvent::ComputerThinking => TicTacToeEvent::ComputerThinking,
                _ => event,
            };
        }
        event
    }

    /// Count down the computer's thinking delay and move once it elapses.
    pub fn advance(&mut self, dt_ms: u32) -> TicTacToeEvent {
        let Some(remaining) = self.thinking_remaining_ms else {
            return TicTacToeEvent::None;
        };
        if dt_ms < remaining {
            self.thinking_remaining_ms = Some(remaining - dt_ms);
            return TicTacToeEvent::None;
        }
        self.thinking_remaining_ms = None;

        let Some(computer) = self.computer() else {
            return TicTacToeEvent::None;
        };
        match computer_move(&self.board, computer, &mut self.rng) {
            Some(index) => self.place(index, computer),
            None => TicTacToeEvent::None,
        }
    }

    fn schedule_computer(&mut self) -> TicTacToeEvent {
        if self.outcome.is_none() && self.computer() == Some(self.to_move()) {
            self.thinking_remaining_ms = Some(self.computer_delay_ms);
            TicTacToeEvent::ComputerThinking
        } else {
            TicTacToeEvent::None
        }
    }

    fn place(&mut self, index: usize, mark: Mark) -> TicTacToeEvent {
        self.board[index] = Some(mark);
        self.x_to_move = !self.x_to_move;
        self.refresh_outcome();
        match self.outcome {
            Some(outcome) => TicTacToeEvent::Finished { index, outcome },
            None => TicTacToeEvent::Placed { index, mark },
        }
    }

    fn refresh_outcome(&mut self) {
        self.outcome = match calculate_winner(&self.board) {
            Some((mark, line)) => Some(Outcome::Win { mark, line }),
            None if is_full(&self.board) => Some(Outcome::Draw),
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn winner_iff_uniform_line() {
        assert_eq!(calculate_winner(&[E; 9]), None);
        let b = [X, X, X, O, O, E, E, E, E];
        assert_eq!(calculate_winner(&b), Some((Mark::X, [0, 1, 2])));
        let b = [O, X, X, E, O, X, E, E, O];
        assert_eq!(calculate_winner(&b), Some((Mark::O, [0, 4, 8])));
        let b = [X, O, X, X, O, O, O, X, X];
        assert_eq!(calculate_winner(&b), None);
    }

    #[test]
    fn computer_blocks_before_taking_center() {
        let board = [X, X, E, O, O, E, E, E, E];
        // O to move: completing its own row at 5 outranks blocking X at 2.
        let mut rng = Prng::new(1);
        assert_eq!(computer_move(&board, Mark::O, &mut rng), Some(5));

        // Without an own win, block the visitor at 2 instead of the open center.
        let board = [X, X, E, O, E, E, E, E, E];
        assert_eq!(computer_move(&board, Mark::O, &mut rng), Some(2));
    }

    #[test]
    fn computer_prefers_center_then_corners() {
        let mut rng = Prng::new(5);
        assert_eq!(computer_move(&[E; 9], Mark::X, &mut rng), Some(4));

        let board = [E, E, E, E, X, E, E, E, E];
        for seed in 0..20 {
            let mut rng = Prng::new(seed);
            let pick = computer_move(&board, Mark::O, &mut rng);
            assert!(matches!(pick, Some(0 | 2 | 6 | 8)));
        }
    }

    #[test]
    fn choosing_o_lets_computer_open_in_the_center() {
        let mut game = TicTacToe::new(9, 500);
        assert_eq!(game.choose_mark(Mark::O), TicTacToeEvent::ComputerThinking);
        assert_eq!(game.play(0), TicTacToeEvent::Ignored);
        assert_eq!(game.advance(499), TicTacToeEvent::None);
        assert_eq!(
            game.advance(1),
            TicTacToeEvent::Placed {
                index: 4,
                mark: Mark::X
            }
        );
        assert!(game.is_player_turn());
    }

    #[test]
    fn visitor_win_ends_round_and_blocks_input() {
        let board = [X, X, E, O, O, E, E, E, E];
        let mut game = TicTacToe::from_board(1, board, Mark::X);
        assert!(game.is_player_turn());
        let ev = game.play(2);
        assert_eq!(
            ev,
            TicTacToeEvent::Finished {
                index: 2,
                outcome: Outcome::Win {
                    mark: Mark::X,
                    line: [0, 1, 2]
                }
            }
        );
        assert_eq!(game.play(5), TicTacToeEvent::Ignored);
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board = [X, O, X, X, O, O, O, X, E];
        let mut game = TicTacToe::from_board(1, board, Mark::X);
        assert_eq!(
            game.play(8),
            TicTacToeEvent::Finished {
                index: 8,
                outcome: Outcome::Draw
            }
        );
    }
}

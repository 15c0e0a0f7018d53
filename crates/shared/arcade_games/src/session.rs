//! Lifecycle shared by every mini-game.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused
//!                    |  ^--resume------'
//!                    '--end--> Over
//! reset: Running | Paused | Over --> Idle
//! ```
//!
//! The session only tracks phase and score; world state lives in the
//! simulation structs and is discarded on reset/close by their owner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    TicTacToe,
    Snake,
    Memory,
    Flappy,
}

impl GameId {
    pub const ALL: [GameId; 4] = [
        GameId::TicTacToe,
        GameId::Snake,
        GameId::Memory,
        GameId::Flappy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameId::TicTacToe => "tictactoe",
            GameId::Snake => "snake",
            GameId::Memory => "memory",
            GameId::Flappy => "flappy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tictactoe" | "tic-tac-toe" => Some(GameId::TicTacToe),
            "snake" => Some(GameId::Snake),
            "memory" => Some(GameId::Memory),
            "flappy" => Some(GameId::Flappy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Over,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Over => "over",
        }
    }
}

/// Visitor-issued lifecycle commands. `end` is never a command: only the
/// simulation decides when a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    TogglePause,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    game: GameId,
    phase: Phase,
    score: u32,
    high_score: u32,
}

impl Session {
    pub fn new(game: GameId, high_score: u32) -> Self {
        Self {
            game,
            phase: Phase::Idle,
            score: 0,
            high_score,
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn start(&mut self) -> bool {
        self.transition(Phase::Idle, Phase::Running)
    }

    pub fn pause(&mut self) -> bool {
        self.transition(Phase::Running, Phase::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(Phase::Paused, Phase::Running)
    }

    pub fn end(&mut self) -> bool {
        self.transition(Phase::Running, Phase::Over)
    }

    pub fn reset(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.phase = Phase::Idle;
        self.score = 0;
        true
    }

    pub fn apply(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(),
            SessionCommand::TogglePause => match self.phase {
                Phase::Running => self.pause(),
                Phase::Paused => self.resume(),
                _ => false,
            },
            SessionCommand::Reset => self.reset(),
        }
    }

    /// Update the score; returns `true` when it raised the high score.
    pub fn set_score(&mut self, score: u32) -> bool {
        self.score = score;
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    fn transition(&mut self, from: Phase, to: Phase) -> bool {
        if self.phase != from {
            return false;
        }
        self.phase = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_follows_allowed_edges() {
        let mut s = Session::new(GameId::Snake, 0);
        assert!(!s.pause());
        assert!(!s.end());
        assert!(s.start());
        assert!(!s.start());
        assert!(s.pause());
        assert!(!s.end(), "a paused session cannot end");
        assert!(s.resume());
        assert!(s.end());
        assert!(!s.resume());
        assert_eq!(s.phase(), Phase::Over);
        assert!(s.reset());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.reset());
    }

    #[test]
    fn reset_keeps_high_score() {
        let mut s = Session::new(GameId::Flappy, 3);
        s.start();
        assert!(!s.set_score(2));
        assert!(s.set_score(5));
        assert_eq!(s.high_score(), 5);
        s.reset();
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(), 5);
    }

    #[test]
    fn toggle_pause_only_moves_between_running_and_paused() {
        let mut s = Session::new(GameId::Memory, 0);
        assert!(!s.apply(SessionCommand::TogglePause));
        s.start();
        assert!(s.apply(SessionCommand::TogglePause));
        assert_eq!(s.phase(), Phase::Paused);
        assert!(s.apply(SessionCommand::TogglePause));
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn game_ids_round_trip_through_names() {
        for id in GameId::ALL {
            assert_eq!(GameId::parse(id.as_str()), Some(id));
        }
        assert_eq!(GameId::parse("pong"), None);
    }
}

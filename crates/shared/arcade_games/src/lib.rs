#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod input;
pub mod prng;
pub mod session;
pub mod tictactoe;

// These simulations keep variable-length world state (bodies, pipes, decks) and
// need heap allocations. Keep them behind `std` so `no_std` consumers can still
// use the fixed-size pieces (TicTacToe, the session machine, input parsing).
#[cfg(feature = "std")]
pub mod flappy;
#[cfg(feature = "std")]
pub mod memory;
#[cfg(feature = "std")]
pub mod snake;

pub use session::{GameId, Phase, Session};

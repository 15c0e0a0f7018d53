//! # arcade
//!
//! A hidden mini-game arcade: visitors stumble on games and collectibles
//! through secret triggers, the arcade remembers what they found, and the
//! games themselves run as deterministic virtual-time simulations.
//!
//! ## Quick Start
//!
//! ```
//! use arcade::prelude::*;
//!
//! let config = ArcadeConfig { seed: Some(42), ..ArcadeConfig::default() };
//! let mut arcade = Arcade::new(config, Progress::in_memory(), 0);
//!
//! // Typing the secret word unlocks and opens a collectible.
//! for c in "thor".chars() {
//!     arcade.handle(Input::Key(Key::Char(c)));
//! }
//! assert_eq!(arcade.open_collectible_id(), Some("thor"));
//!
//! // Time only moves when the host says so.
//! arcade.advance(16);
//! let snapshot = arcade.snapshot();
//! assert_eq!(snapshot.discovered_collectibles, 1);
//! ```
//!
//! ## Modules
//!
//! - [`progress`]: discovered ids and high scores over a [`storage`] backend
//! - [`discovery`]: appearance, secret-code, and double-activate triggers
//! - [`arcade`]: the context object tying sessions, triggers, and toasts together
//! - [`catalog`]: display metadata and the collection view

pub mod arcade;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod notify;
pub mod progress;
pub mod storage;
pub mod timer;
pub mod unlock;

pub use arcade_games as games;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::arcade::{Arcade, ArcadeEvent, ArcadeSnapshot, Input, SessionView, WorldView};
    pub use crate::catalog::{Catalog, CollectionView};
    pub use crate::config::{ArcadeConfig, DiscoveryConfig};
    pub use crate::discovery::{Discovery, Edge, Target, TriggerSpec};
    pub use crate::error::{ArcadeError, StorageError};
    pub use crate::notify::{Notification, NotificationKind};
    pub use crate::progress::Progress;
    pub use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
    pub use crate::unlock::UnlockKind;
    pub use arcade_games::input::{Direction, Key, TouchPoint};
    pub use arcade_games::session::SessionCommand;
    pub use arcade_games::tictactoe::Mark;
    pub use arcade_games::{GameId, Phase};
}

//! Display metadata for games and collectibles, plus the collection view.

use serde::Serialize;

use crate::progress::Progress;
use crate::unlock::UnlockKind;

pub const PLACEHOLDER_ICON: &str = "❓";
pub const MASKED_NAME: &str = "???";
pub const MASKED_DESCRIPTION: &str = "Not discovered yet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectibleInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quote: String,
    pub description: String,
}

impl GameInfo {
    fn new(id: &str, name: &str, icon: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
        }
    }

    pub fn placeholder(id: &str) -> Self {
        Self::new(id, id, PLACEHOLDER_ICON, "")
    }
}

impl CollectibleInfo {
    fn new(id: &str, name: &str, quote: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: format!("/easter-eggs/{id}.png"),
            quote: quote.into(),
            description: description.into(),
        }
    }

    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.into(),
            name: id.into(),
            image: PLACEHOLDER_ICON.into(),
            quote: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    games: Vec<GameInfo>,
    collectibles: Vec<CollectibleInfo>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            games: vec![
                GameInfo::new("tictactoe", "Tic-Tac-Toe", "⭕", "Classic X and O game"),
                GameInfo::new("snake", "Snake", "🐍", "Eat and grow longer"),
                GameInfo::new("memory", "Memory Match", "🧠", "Find matching pairs"),
                GameInfo::new("flappy", "Flappy Bird", "🐦", "Fly through the pipes"),
            ],
            collectibles: vec![
                CollectibleInfo::new(
                    "ironman",
                    "Iron Man",
                    "I am Iron Man",
                    "Genius, billionaire, playboy, philanthropist",
                ),
                CollectibleInfo::new(
                    "spiderman",
                    "Spider-Man",
                    "With great power comes great responsibility",
                    "Your friendly neighborhood Spider-Man",
                ),
                CollectibleInfo::new("thor", "Thor", "I am Thor, son of Odin", "God of Thunder"),
                CollectibleInfo::new(
                    "captainamerica",
                    "Captain America",
                    "I can do this all day",
                    "The First Avenger",
                ),
                CollectibleInfo::new("hulk", "Hulk", "Hulk Smash!", "The strongest Avenger"),
                CollectibleInfo::new(
                    "blackwidow",
                    "Black Widow",
                    "I have red in my ledger",
                    "Master spy and assassin",
                ),
                CollectibleInfo::new(
                    "doctorstrange",
                    "Doctor Strange",
                    "We are in the endgame now",
                    "Master of the Mystic Arts",
                ),
                CollectibleInfo::new(
                    "blackpanther",
                    "Black Panther",
                    "Wakanda Forever",
                    "King of Wakanda",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionEntry {
    pub id: String,
    pub discovered: bool,
    pub name: String,
    /// Game icon or collectible image; empty while undiscovered.
    pub art: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSection {
    pub discovered: usize,
    pub total: usize,
    pub entries: Vec<CollectionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionView {
    pub games: CollectionSection,
    pub collectibles: CollectionSection,
}

impl Catalog {
    pub fn new(games: Vec<GameInfo>, collectibles: Vec<CollectibleInfo>) -> Self {
        Self {
            games,
            collectibles,
        }
    }

    pub fn games(&self) -> &[GameInfo] {
        &self.games
    }

    pub fn collectibles(&self) -> &[CollectibleInfo] {
        &self.collectibles
    }

    /// Never fails; unknown ids get a placeholder.
    pub fn game(&self, id: &str) -> GameInfo {
        self.games
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .unwrap_or_else(|| GameInfo::placeholder(id))
    }

    pub fn collectible(&self, id: &str) -> CollectibleInfo {
        self.collectibles
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| CollectibleInfo::placeholder(id))
    }

    /// Display name for a discovery notification.
    pub fn display_name(&self, kind: UnlockKind, id: &str) -> String {
        match kind {
            UnlockKind::Game => self.game(id).name,
            UnlockKind::Collectible => self.collectible(id).name,
        }
    }

    pub fn collection(&self, progress: &Progress) -> CollectionView {
        let games = self
            .games
            .iter()
            .map(|g| (g.id.as_str(), g.name.as_str(), g.icon.as_str(), g.description.as_str()));
        let collectibles = self
            .collectibles
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str(), c.image.as_str(), c.description.as_str()));
        CollectionView {
            games: section(games, progress, UnlockKind::Game),
            collectibles: section(collectibles, progress, UnlockKind::Collectible),
        }
    }
}

fn section<'a>(
    known: impl Iterator<Item = (&'a str, &'a str, &'a str, &'a str)>,
    progress: &Progress,
    kind: UnlockKind,
) -> CollectionSection {
    let mut entries: Vec<CollectionEntry> = known
        .map(|(id, name, art, description)| {
            if progress.has(kind, id) {
                CollectionEntry {
                    id: id.into(),
                    discovered: true,
                    name: name.into(),
                    art: art.into(),
                    description: description.into(),
                }
            } else {
                CollectionEntry {
                    id: id.into(),
                    discovered: false,
                    name: MASKED_NAME.into(),
                    art: String::new(),
                    description: MASKED_DESCRIPTION.into(),
                }
            }
        })
        .collect();

    // Discovered ids the catalog no longer knows about.
    let extra: Vec<CollectionEntry> = progress
        .all(kind)
        .filter(|id| !entries.iter().any(|e| e.id == *id))
        .map(|id| CollectionEntry {
            id: id.into(),
            discovered: true,
            name: id.into(),
            art: PLACEHOLDER_ICON.into(),
            description: String::new(),
        })
        .collect();
    entries.extend(extra);

    CollectionSection {
        discovered: entries.iter().filter(|e| e.discovered).count(),
        total: entries.len(),
        entries,
    }
}

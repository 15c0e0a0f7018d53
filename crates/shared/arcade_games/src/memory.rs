use serde::{Deserialize, Serialize};

use crate::prng::Prng;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSymbol {
    pub name: String,
    pub icon: String,
}

impl CardSymbol {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// The tech-stack deck used by default: eight pairs.
pub fn default_symbols() -> Vec<CardSymbol> {
    vec![
        CardSymbol::new("React", "/assets/react.svg"),
        CardSymbol::new("Node.js", "/assets/nodejs.svg"),
        CardSymbol::new("Python", "/assets/python.svg"),
        CardSymbol::new("JavaScript", "/assets/javascript.svg"),
        CardSymbol::new("MongoDB", "/assets/mongodb.svg"),
        CardSymbol::new("Next.js", "/assets/nextjs.svg"),
        CardSymbol::new("Firebase", "/assets/firebase.svg"),
        CardSymbol::new("Express", "/assets/express.svg"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Index into the symbol list; two cards share each value.
    pub symbol: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    /// Click rejected: a pair is pending, or the card is already up or matched.
    Ignored,
    /// First card of a pair turned up.
    Flipped,
    Matched,
    /// Second card did not match; both flip back after the delay.
    Mismatched,
    /// The pending mismatch flipped face down.
    FlippedBack,
    /// The last pair matched.
    Won,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCardView {
    pub face_up: bool,
    pub matched: bool,
    /// Only revealed for face-up or matched cards.
    pub symbol: Option<CardSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub cards: Vec<MemoryCardView>,
    pub moves: u32,
    pub pairs_matched: u32,
    pub won: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    symbols: Vec<CardSymbol>,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    matched: Vec<usize>,
    moves: u32,
    mismatch_delay_ms: u32,
    mismatch_remaining_ms: Option<u32>,
    rng: Prng,
}

impl MemoryGame {
    pub fn new(seed: u64, mismatch_delay_ms: u32) -> Self {
        Self::with_symbols(seed, default_symbols(), mismatch_delay_ms)
    }

    pub fn with_symbols(seed: u64, symbols: Vec<CardSymbol>, mismatch_delay_ms: u32) -> Self {
        let mut game = Self {
            symbols,
            cards: Vec::new(),
            flipped: Vec::with_capacity(2),
            matched: Vec::new(),
            moves: 0,
            mismatch_delay_ms,
            mismatch_remaining_ms: None,
            rng: Prng::new(seed),
        };
        game.deal();
        game
    }

    /// Reshuffle a fresh deck and clear all progress.
    pub fn deal(&mut self) {
        self.cards = (0..self.symbols.len())
            .flat_map(|symbol| [Card { symbol }, Card { symbol }])
            .collect();
        self.rng.shuffle(&mut self.cards);
        self.flipped.clear();
        self.matched.clear();
        self.moves = 0;
        self.mismatch_remaining_ms = None;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn pairs_matched(&self) -> u32 {
        (self.matched.len() / 2) as u32
    }

    pub fn is_won(&self) -> bool {
        !self.cards.is_empty() && self.matched.len() == self.cards.len()
    }

    pub fn symbol(&self, card: usize) -> Option<&CardSymbol> {
        self.cards
            .get(card)
            .and_then(|c| self.symbols.get(c.symbol))
    }

    pub fn click(&mut self, index: usize) -> MemoryEvent {
        if index >= self.cards.len()
            || self.flipped.len() == 2
            || self.flipped.contains(&index)
            || self.matched.contains(&index)
        {
            return MemoryEvent::Ignored;
        }

        self.flipped.push(index);
        if self.flipped.len() < 2 {
            return MemoryEvent::Flipped;
        }

        self.moves += 1;
        let (a, b) = (self.flipped[0], self.flipped[1]);
        if self.cards[a].symbol == self.cards[b].symbol {
            self.matched.push(a);
            self.matched.push(b);
            self.flipped.clear();
            if self.is_won() {
                MemoryEvent::Won
            } else {
                MemoryEvent::Matched
            }
        } else {
            self.mismatch_remaining_ms = Some(self.mismatch_delay_ms);
            MemoryEvent::Mismatched
        }
    }

    /// Count down a pending mismatch; flips the pair back once it elapses.
    pub fn advance(&mut self, dt_ms: u32) -> MemoryEvent {
        let Some(remaining) = self.mismatch_remaining_ms else {
            return MemoryEvent::None;
        };
        if dt_ms < remaining {
            self.mismatch_remaining_ms = Some(remaining - dt_ms);
            return MemoryEvent::None;
        }
        self.mismatch_remaining_ms = None;
        self.flipped.clear();
        MemoryEvent::FlippedBack
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let cards = (0..self.cards.len())
            .map(|i| {
                let face_up = self.flipped.contains(&i);
                let matched = self.matched.contains(&i);
                MemoryCardView {
                    face_up,
                    matched,
                    symbol: (face_up || matched)
                        .then(|| self.symbol(i).cloned())
                        .flatten(),
                }
            })
            .collect();
        MemorySnapshot {
            cards,
            moves: self.moves,
            pairs_matched: self.pairs_matched(),
            won: self.is_won(),
        }
    }
}

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockKind {
    Game,
    Collectible,
}

impl UnlockKind {
    /// Durable key holding this kind's discovered ids.
    pub fn storage_key(self) -> &'static str {
        match self {
            UnlockKind::Game => "discoveredGames",
            UnlockKind::Collectible => "discoveredEasterEggs",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnlockKind::Game => "game",
            UnlockKind::Collectible => "collectible",
        }
    }
}

/// Append-only set of discovered ids.
///
/// Membership goes through a hash set; discovery order is kept only so the
/// serialized list and the collection view are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl UnlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Returns `true` only the first time `id` is recorded.
    pub fn record(&mut self, id: &str) -> bool {
        if self.index.contains(id) {
            return false;
        }
        self.index.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn all(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.order)
    }

    /// Parse a JSON string list. Duplicate entries collapse to one.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let ids: Vec<String> = serde_json::from_str(raw)?;
        Ok(ids.into_iter().collect())
    }
}

impl FromIterator<String> for UnlockSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = UnlockSet::new();
        for id in iter {
            set.record(&id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reports_only_first_discovery() {
        let mut set = UnlockSet::new();
        assert!(!set.has("thor"));
        assert!(set.record("thor"));
        assert!(!set.record("thor"));
        assert!(set.has("thor"));
        assert_eq!(set.all().filter(|id| *id == "thor").count(), 1);
    }

    #[test]
    fn json_round_trip_keeps_ids() {
        let mut set = UnlockSet::new();
        set.record("snake");
        set.record("flappy");
        let raw = set.to_json().unwrap();
        assert_eq!(raw, r#"["snake","flappy"]"#);
        assert_eq!(UnlockSet::from_json(&raw).unwrap(), set);
    }

    #[test]
    fn duplicate_entries_in_storage_collapse() {
        let set = UnlockSet::from_json(r#"["a","b","a"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.all().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

//! Tunables for the arcade. Every field has a serde default so a partial (or
//! empty) `config.json` is valid.

use serde::{Deserialize, Serialize};

use crate::discovery::{Edge, Target, TriggerSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_appear_delay_min_ms")]
    pub appear_delay_min_ms: u64,
    #[serde(default = "default_appear_delay_max_ms")]
    pub appear_delay_max_ms: u64,
    #[serde(default = "default_visible_min_ms")]
    pub visible_min_ms: u64,
    #[serde(default = "default_visible_max_ms")]
    pub visible_max_ms: u64,
    /// Edges a hidden collectible may peek in from.
    #[serde(default = "default_sides")]
    pub sides: Vec<Edge>,
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
}

fn default_appear_delay_min_ms() -> u64 {
    8_000
}

fn default_appear_delay_max_ms() -> u64 {
    30_000
}

fn default_visible_min_ms() -> u64 {
    5_000
}

fn default_visible_max_ms() -> u64 {
    8_000
}

fn default_sides() -> Vec<Edge> {
    vec![Edge::Left, Edge::Right]
}

fn default_double_tap_window_ms() -> u64 {
    300
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            appear_delay_min_ms: default_appear_delay_min_ms(),
            appear_delay_max_ms: default_appear_delay_max_ms(),
            visible_min_ms: default_visible_min_ms(),
            visible_max_ms: default_visible_max_ms(),
            sides: default_sides(),
            double_tap_window_ms: default_double_tap_window_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcadeConfig {
    #[serde(default = "default_snake_tick_ms")]
    pub snake_tick_ms: u64,
    #[serde(default = "default_flappy_frame_ms")]
    pub flappy_frame_ms: u64,
    #[serde(default = "default_memory_mismatch_ms")]
    pub memory_mismatch_ms: u64,
    #[serde(default = "default_tictactoe_delay_ms")]
    pub tictactoe_delay_ms: u64,
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
    #[serde(default = "default_max_notifications")]
    pub max_notifications: usize,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerSpec>,
    /// Fixed seed for every random source; `None` lets the host pick one.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_snake_tick_ms() -> u64 {
    150
}

fn default_flappy_frame_ms() -> u64 {
    16
}

fn default_memory_mismatch_ms() -> u64 {
    1_000
}

fn default_tictactoe_delay_ms() -> u64 {
    500
}

fn default_notification_ms() -> u64 {
    3_000
}

fn default_max_notifications() -> usize {
    5
}

/// One hidden trigger per game, plus the peeking Thor and its secret word.
pub fn default_triggers() -> Vec<TriggerSpec> {
    let double = |element: &str, game: &str| TriggerSpec::DoubleActivate {
        element: element.to_string(),
        target: Target::game(game),
    };
    vec![
        double("logo", "tictactoe"),
        double("clock", "snake"),
        double("skills", "memory"),
        double("drone", "flappy"),
        TriggerSpec::Appearance {
            target: Target::collectible("thor"),
        },
        TriggerSpec::SecretCode {
            code: "thor".to_string(),
            target: Target::collectible("thor"),
        },
    ]
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            snake_tick_ms: default_snake_tick_ms(),
            flappy_frame_ms: default_flappy_frame_ms(),
            memory_mismatch_ms: default_memory_mismatch_ms(),
            tictactoe_delay_ms: default_tictactoe_delay_ms(),
            notification_ms: default_notification_ms(),
            max_notifications: default_max_notifications(),
            discovery: DiscoveryConfig::default(),
            triggers: default_triggers(),
            seed: None,
        }
    }
}

impl ArcadeConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = ArcadeConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ArcadeConfig::default());
        assert_eq!(cfg.snake_tick_ms, 150);
        assert_eq!(cfg.discovery.double_tap_window_ms, 300);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = ArcadeConfig::from_json(
            r#"{
                "snake_tick_ms": 100,
                "seed": 42,
                "discovery": { "sides": ["top"] },
                "triggers": [
                    { "trigger": "secret_code", "code": "hulk",
                      "target": { "kind": "collectible", "id": "hulk" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.snake_tick_ms, 100);
        assert_eq!(cfg.flappy_frame_ms, 16);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.discovery.sides, vec![Edge::Top]);
        assert_eq!(cfg.discovery.appear_delay_min_ms, 8_000);
        assert_eq!(cfg.triggers.len(), 1);
    }
}

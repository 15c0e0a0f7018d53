//! Input vocabulary shared by every game: keys, headings, swipes.
//!
//! Key names follow the DOM `KeyboardEvent.key` convention (`"ArrowUp"`, `" "`,
//! `"p"`), so a browser front end can forward events verbatim.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    /// Any named key the games do not bind (Shift, Tab, F1...).
    Other,
}

impl Key {
    pub fn parse(name: &str) -> Self {
        match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            " " | "Space" | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            _ => None,
        }
    }

    /// Lower-cased printable character, if this key produces one.
    pub fn char_lower(self) -> Option<char> {
        match self {
            Key::Char(c) => Some(c.to_ascii_lowercase()),
            Key::Space => Some(' '),
            _ => None,
        }
    }

    pub fn is_char(self, wanted: char) -> bool {
        self.char_lower() == Some(wanted.to_ascii_lowercase())
    }
}

/// A touch point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Infer a swipe direction from a touch start/end pair.
///
/// The dominant axis wins; the gesture must travel strictly more than
/// `min_distance` pixels along it. Screen y grows downward.
pub fn infer_swipe(start: TouchPoint, end: TouchPoint, min_distance: f32) -> Option<Direction> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() > dy.abs() {
        if dx.abs() <= min_distance {
            return None;
        }
        Some(if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        if dy.abs() <= min_distance {
            return None;
        }
        Some(if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dom_key_names() {
        assert_eq!(Key::parse("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("T"), Key::Char('T'));
        assert_eq!(Key::parse("Shift"), Key::Other);
        assert_eq!(Key::parse("Enter"), Key::Other);
        assert!(Key::parse("P").is_char('p'));
    }

    #[test]
    fn swipe_uses_dominant_axis_and_threshold() {
        let o = TouchPoint::new(100.0, 100.0);
        assert_eq!(
            infer_swipe(o, TouchPoint::new(150.0, 110.0), 30.0),
            Some(Direction::Right)
        );
        assert_eq!(
            infer_swipe(o, TouchPoint::new(95.0, 40.0), 30.0),
            Some(Direction::Up)
        );
        assert_eq!(infer_swipe(o, TouchPoint::new(120.0, 100.0), 30.0), None);
    }
}

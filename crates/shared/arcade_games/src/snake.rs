//! Grid Snake simulation.
//!
//! Coordinate system: `(x, y)` cells in `[0, grid) x [0, grid)`, `y` grows
//! downward (screen convention, so `Up` is `y - 1`).

use serde::{Deserialize, Serialize};

use crate::input::Direction;
use crate::prng::Prng;

pub type Cell = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    Moved,
    Ate,
    HitWall,
    HitSelf,
    /// The body covers every cell, so no food can be placed.
    BoardFull,
}

impl SnakeEvent {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SnakeEvent::HitWall | SnakeEvent::HitSelf | SnakeEvent::BoardFull
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SnakeEvent::Moved => "moved",
            SnakeEvent::Ate => "ate",
            SnakeEvent::HitWall => "hit_wall",
            SnakeEvent::HitSelf => "hit_self",
            SnakeEvent::BoardFull => "board_full",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeParams {
    pub grid: i32,
    pub start: Cell,
    pub start_direction: Direction,
    pub first_food: Cell,
    pub points_per_food: u32,
    /// Real-time interval between steps.
    pub tick_ms: u32,
}

impl Default for SnakeParams {
    fn default() -> Self {
        Self {
            grid: 15,
            start: (7, 7),
            start_direction: Direction::Right,
            first_food: (5, 5),
            points_per_food: 10,
            tick_ms: 150,
        }
    }
}

/// Immutable view for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub grid: i32,
    pub body: Vec<Cell>,
    pub food: Option<Cell>,
    pub direction: Direction,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct SnakeSim {
    pub params: SnakeParams,
    body: Vec<Cell>,
    food: Option<Cell>,
    direction: Direction,
    /// Heading of the last completed step; reversal is judged against this.
    heading: Direction,
    foods_eaten: u32,
    rng: Prng,
}

impl SnakeSim {
    pub fn new(seed: u64) -> Self {
        Self::with_params(seed, SnakeParams::default())
    }

    pub fn with_params(seed: u64, params: SnakeParams) -> Self {
        let mut sim = Self {
            body: Vec::new(),
            food: None,
            direction: params.start_direction,
            heading: params.start_direction,
            foods_eaten: 0,
            rng: Prng::new(seed),
            params,
        };
        sim.reset();
        sim
    }

    pub fn reset(&mut self) {
        self.body.clear();
        self.body.push(self.params.start);
        self.direction = self.params.start_direction;
        self.heading = self.params.start_direction;
        self.foods_eaten = 0;
        self.food = if self.params.first_food != self.params.start
            && self.in_bounds(self.params.first_food)
        {
            Some(self.params.first_food)
        } else {
            self.place_food()
        };
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body.first().copied().unwrap_or(self.params.start)
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn foods_eaten(&self) -> u32 {
        self.foods_eaten
    }

    pub fn score(&self) -> u32 {
        self.foods_eaten.saturating_mul(self.params.points_per_food)
    }

    /// Request a new heading. The exact reverse of the last moved heading is
    /// ignored; returns whether the request was accepted.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if direction == self.heading.opposite() {
            return false;
        }
        self.direction = direction;
        true
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, cell: Cell) {
        if self.in_bounds(cell) && !self.occupies(cell) {
            self.food = Some(cell);
        }
    }

    /// Advance one grid step.
    ///
    /// A terminal event leaves the body untouched.
    pub fn step(&mut self) -> SnakeEvent {
        let (hx, hy) = self.head();
        let (dx, dy) = self.direction.delta();
        let next = (hx + dx, hy + dy);

        if !self.in_bounds(next) {
            return SnakeEvent::HitWall;
        }
        // The tail cell counts too: it has not moved out of the way yet.
        if self.occupies(next) {
            return SnakeEvent::HitSelf;
        }

        self.heading = self.direction;
        self.body.insert(0, next);

        if self.food == Some(next) {
            self.foods_eaten += 1;
            self.food = self.place_food();
            if self.food.is_none() {
                return SnakeEvent::BoardFull;
            }
            SnakeEvent::Ate
        } else {
            self.body.pop();
            SnakeEvent::Moved
        }
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            grid: self.params.grid,
            body: self.body.clone(),
            food: self.food,
            direction: self.direction,
            score: self.score(),
        }
    }

    fn in_bounds(&self, (x, y): Cell) -> bool {
        (0..self.params.grid).contains(&x) && (0..self.params.grid).contains(&y)
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Uniform rejection sampling over free cells; `None` when the board is full.
    fn place_food(&mut self) -> Option<Cell> {
        let grid = self.params.grid.max(1);
        let cells = (grid as usize) * (grid as usize);
        if self.body.len() >= cells {
            return None;
        }
        loop {
            let x = self.rng.gen_range_u32(0, grid as u32) as i32;
            let y = self.rng.gen_range_u32(0, grid as u32) as i32;
            if !self.occupies((x, y)) {
                return Some((x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_moves_right_without_growing() {
        let mut sim = SnakeSim::new(1);
        assert_eq!(sim.body(), &[(7, 7)]);
        assert_eq!(sim.food(), Some((5, 5)));

        assert_eq!(sim.step(), SnakeEvent::Moved);
        assert_eq!(sim.head(), (8, 7));
        assert_eq!(sim.body(), &[(8, 7)]);
    }

    #[test]
    fn reverse_input_is_ignored() {
        let mut sim = SnakeSim::new(1);
        assert!(!sim.steer(Direction::Left));
        assert_eq!(sim.direction(), Direction::Right);
        assert!(!sim.steer(Direction::Left));
        assert_eq!(sim.direction(), Direction::Right);
    }

    #[test]
    fn two_quick_turns_cannot_fold_back() {
        let mut sim = SnakeSim::new(1);
        sim.set_food((8, 7));
        sim.step();
        sim.set_food((9, 7));
        sim.step();
        assert_eq!(sim.body().len(), 3);
        sim.set_food((0, 0));

        // Heading right: up is fine, but left is still judged against "right".
        assert!(sim.steer(Direction::Up));
        assert!(!sim.steer(Direction::Left));
        assert_eq!(sim.step(), SnakeEvent::Moved);
        assert_eq!(sim.head(), (9, 6));
    }

    #[test]
    fn length_tracks_food_eaten() {
        let mut sim = SnakeSim::new(11);
        for i in 0..5 {
            let (hx, hy) = sim.head();
            sim.set_food((hx + 1, hy));
            assert_eq!(sim.step(), SnakeEvent::Ate);
            assert_eq!(sim.body().len() as u32, 1 + sim.foods_eaten());
            assert_eq!(sim.foods_eaten(), i + 1);
            let food = sim.food().unwrap();
            assert!(!sim.body().contains(&food));
        }
        assert_eq!(sim.score(), 50);
        sim.set_food((0, 0));
        assert_eq!(sim.step(), SnakeEvent::Moved);
        assert_eq!(sim.body().len(), 6);
    }

    #[test]
    fn wall_hit_is_terminal_and_head_stays_in_bounds() {
        let mut sim = SnakeSim::new(2);
        sim.set_food((0, 0));
        let mut last = SnakeEvent::Moved;
        for _ in 0..20 {
            last = sim.step();
            let (x, y) = sim.head();
            assert!((0..15).contains(&x) && (0..15).contains(&y));
            if last.is_terminal() {
                break;
            }
        }
        assert_eq!(last, SnakeEvent::HitWall);
        assert_eq!(sim.head(), (14, 7));
    }

    #[test]
    fn running_into_own_body_is_terminal() {
        let mut sim = SnakeSim::new(4);
        for x in 8..12 {
            sim.set_food((x, 7));
            sim.step();
        }
        assert_eq!(sim.body().len(), 5);
        sim.set_food((0, 0));
        sim.steer(Direction::Down);
        sim.step();
        sim.steer(Direction::Left);
        sim.step();
        sim.steer(Direction::Up);
        assert_eq!(sim.step(), SnakeEvent::HitSelf);
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let params = SnakeParams {
            grid: 2,
            start: (0, 0),
            first_food: (1, 0),
            ..SnakeParams::default()
        };
        let mut sim = SnakeSim::with_params(3, params);
        assert_eq!(sim.step(), SnakeEvent::Ate);
        sim.set_food((1, 1));
        sim.steer(Direction::Down);
        assert_eq!(sim.step(), SnakeEvent::Ate);
        sim.set_food((0, 1));
        sim.steer(Direction::Left);
        assert_eq!(sim.step(), SnakeEvent::BoardFull);
        assert_eq!(sim.food(), None);
    }
}

//! Flappy-bird style frame simulation.
//!
//! Coordinate system (matches a 400x400 canvas):
//! - `x` grows to the right, pipes scroll toward `x = 0`
//! - `y` grows downward, `0` is the ceiling and `params.height` the floor
//!
//! One call to [`FlappySim::step`] is one animation frame.

use serde::{Deserialize, Serialize};

use crate::prng::Prng;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlappyParams {
    pub width: f32,
    pub height: f32,
    pub bird_x: f32,
    pub bird_start_y: f32,
    pub bird_radius: f32,
    pub gravity: f32,
    /// Velocity set by a flap (negative is upward).
    pub jump_velocity: f32,
    pub pipe_width: f32,
    pub pipe_gap: f32,
    pub pipe_speed: f32,
    /// Frames between pipe spawns.
    pub pipe_interval: u32,
    /// Minimum distance between the gap and the ceiling/floor.
    pub gap_margin: f32,
    /// Real-time interval between frames.
    pub frame_ms: u32,
}

impl Default for FlappyParams {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            bird_x: 80.0,
            bird_start_y: 250.0,
            bird_radius: 15.0,
            gravity: 0.5,
            jump_velocity: -8.0,
            pipe_width: 60.0,
            pipe_gap: 180.0,
            pipe_speed: 3.0,
            pipe_interval: 90,
            gap_margin: 50.0,
            frame_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    /// Left edge.
    pub x: f32,
    /// Top of the opening; the opening spans `gap_top..gap_top + pipe_gap`.
    pub gap_top: f32,
    pub scored: bool,
}

impl Pipe {
    pub fn gap_center(&self, gap: f32) -> f32 {
        self.gap_top + gap * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlappyEvent {
    None,
    /// One or more pipes were passed this frame.
    Scored(u32),
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlappySnapshot {
    pub width: f32,
    pub height: f32,
    pub bird_x: f32,
    pub bird_y: f32,
    pub bird_velocity: f32,
    pub bird_radius: f32,
    pub pipe_width: f32,
    pub pipe_gap: f32,
    pub pipes: Vec<Pipe>,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct FlappySim {
    pub params: FlappyParams,
    bird_y: f32,
    bird_velocity: f32,
    pipes: Vec<Pipe>,
    frame: u32,
    score: u32,
    rng: Prng,
}

impl FlappySim {
    pub fn new(seed: u64) -> Self {
        Self::with_params(seed, FlappyParams::default())
    }

    pub fn with_params(seed: u64, params: FlappyParams) -> Self {
        Self {
            bird_y: params.bird_start_y,
            bird_velocity: 0.0,
            pipes: Vec::new(),
            frame: 0,
            score: 0,
            rng: Prng::new(seed),
            params,
        }
    }

    pub fn reset(&mut self) {
        self.bird_y = self.params.bird_start_y;
        self.bird_velocity = 0.0;
        self.pipes.clear();
        self.frame = 0;
        self.score = 0;
    }

    pub fn bird_y(&self) -> f32 {
        self.bird_y
    }

    pub fn bird_velocity(&self) -> f32 {
        self.bird_velocity
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Flap: the upward impulse replaces whatever velocity gravity built up.
    pub fn flap(&mut self) {
        self.bird_velocity = self.params.jump_velocity;
    }

    #[cfg(test)]
    pub(crate) fn push_pipe(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    #[cfg(test)]
    pub(crate) fn set_bird(&mut self, y: f32, velocity: f32) {
        self.bird_y = y;
        self.bird_velocity = velocity;
    }

    pub fn step(&mut self) -> FlappyEvent {
        let p = &self.params;
        let (r, bx, gap, w) = (p.bird_radius, p.bird_x, p.pipe_gap, p.pipe_width);

        self.bird_velocity += p.gravity;
        self.bird_y += self.bird_velocity;

        self.frame = self.frame.wrapping_add(1);
        if p.pipe_interval > 0 && self.frame % p.pipe_interval == 0 {
            let low = p.gap_margin;
            let high = (p.height - gap - p.gap_margin).max(low);
            let gap_top = self.rng.gen_range_f32(low, high);
            self.pipes.push(Pipe {
                x: p.width,
                gap_top,
                scored: false,
            });
        }

        let speed = self.params.pipe_speed;
        let bird_y = self.bird_y;
        let mut crashed = false;
        let mut passed = 0u32;
        for pipe in self.pipes.iter_mut() {
            pipe.x -= speed;

            let overlaps_x = bx + r > pipe.x && bx - r < pipe.x + w;
            let outside_gap = bird_y - r < pipe.gap_top || bird_y + r > pipe.gap_top + gap;
            if overlaps_x && outside_gap {
                crashed = true;
            }

            if !pipe.scored && pipe.x + w < bx {
                pipe.scored = true;
                passed += 1;
            }
        }
        self.pipes.retain(|pipe| pipe.x > -w);
        self.score += passed;

        if self.bird_y + r > self.params.height || self.bird_y - r < 0.0 {
            crashed = true;
        }

        if crashed {
            FlappyEvent::Crashed
        } else if passed > 0 {
            FlappyEvent::Scored(passed)
        } else {
            FlappyEvent::None
        }
    }

    pub fn snapshot(&self) -> FlappySnapshot {
        FlappySnapshot {
            width: self.params.width,
            height: self.params.height,
            bird_x: self.params.bird_x,
            bird_y: self.bird_y,
            bird_velocity: self.bird_velocity,
            bird_radius: self.params.bird_radius,
            pipe_width: self.params.pipe_width,
            pipe_gap: self.params.pipe_gap,
            pipes: self.pipes.clone(),
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_accumulates_and_flap_overrides() {
        let mut sim = FlappySim::new(1);
        sim.step();
        assert!((sim.bird_velocity() - 0.5).abs() < 1e-6);
        assert!((sim.bird_y() - 250.5).abs() < 1e-6);
        sim.step();
        assert!((sim.bird_velocity() - 1.0).abs() < 1e-6);

        sim.flap();
        assert!((sim.bird_velocity() + 8.0).abs() < 1e-6);
        sim.step();
        assert!((sim.bird_velocity() + 7.5).abs() < 1e-6);
    }

    #[test]
    fn falling_bird_hits_the_floor() {
        let mut sim = FlappySim::new(1);
        let mut frames = 0;
        loop {
            frames += 1;
            if sim.step() == FlappyEvent::Crashed {
                break;
            }
            assert!(frames < 200, "bird never reached the floor");
        }
        assert!(sim.bird_y() + 15.0 > 400.0);
    }

    #[test]
    fn pipes_spawn_on_interval_with_gap_inside_bounds() {
        for seed in 1..30 {
            let mut sim = FlappySim::new(seed);
            for _ in 0..89 {
                sim.set_bird(200.0, 0.0);
                sim.step();
            }
            assert!(sim.pipes().is_empty());
            sim.set_bird(200.0, 0.0);
            sim.step();
            assert_eq!(sim.pipes().len(), 1);
            let pipe = sim.pipes()[0];
            assert!(pipe.gap_top >= 50.0);
            assert!(pipe.gap_top + 180.0 <= 350.0);
            assert!((pipe.x - 397.0).abs() < 1e-6);
        }
    }

    #[test]
    fn pipe_scores_exactly_once_when_its_right_edge_passes_the_bird() {
        let mut sim = FlappySim::new(1);
        sim.params.pipe_interval = 0;
        // Opening around the bird; after one scroll the right edge sits at 79 < 80.
        sim.push_pipe(Pipe {
            x: 22.0,
            gap_top: 110.0,
            scored: false,
        });
        sim.set_bird(200.0, -0.5);

        assert_eq!(sim.step(), FlappyEvent::Scored(1));
        assert!(sim.pipes()[0].scored);
        assert_eq!(sim.score(), 1);

        for _ in 0..5 {
            sim.set_bird(200.0, -0.5);
            assert_eq!(sim.step(), FlappyEvent::None);
        }
        assert_eq!(sim.score(), 1);
    }

    #[test]
    fn bird_outside_the_opening_crashes_into_the_pipe() {
        let mut sim = FlappySim::new(1);
        sim.params.pipe_interval = 0;
        sim.push_pipe(Pipe {
            x: 90.0,
            gap_top: 250.0,
            scored: false,
        });
        sim.set_bird(100.0, -0.5);
        assert_eq!(sim.step(), FlappyEvent::Crashed);
    }

    #[test]
    fn offscreen_pipes_are_dropped() {
        let mut sim = FlappySim::new(1);
        sim.params.pipe_interval = 0;
        sim.push_pipe(Pipe {
            x: -58.0,
            gap_top: 100.0,
            scored: true,
        });
        sim.set_bird(200.0, -0.5);
        sim.step();
        assert!(sim.pipes().is_empty());
    }
}

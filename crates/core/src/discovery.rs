//! Hidden triggers that unlock games and collectibles.
//!
//! Three trigger kinds, all independent:
//! - appearance: a collectible peeks in from a screen edge after a random delay
//!   and hides again unless caught; it keeps coming back until discovered
//! - secret code: typing a word anywhere (case-insensitive)
//! - double activate: double-click / double-tap on a designated element
//!
//! Firing always records the target in [`Progress`]; the returned
//! [`Discovery`] says whether it was new so the caller can decide about a
//! notification. All delays run on the engine's own [`TimerQueue`].

use std::collections::VecDeque;

use arcade_games::input::Key;
use arcade_games::prng::Prng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::progress::Progress;
use crate::timer::{TimerId, TimerQueue};
use crate::unlock::UnlockKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: UnlockKind,
    pub id: String,
}

impl Target {
    pub fn game(id: &str) -> Self {
        Self {
            kind: UnlockKind::Game,
            id: id.to_string(),
        }
    }

    pub fn collectible(id: &str) -> Self {
        Self {
            kind: UnlockKind::Collectible,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum TriggerSpec {
    Appearance { target: Target },
    SecretCode { code: String, target: Target },
    DoubleActivate { element: String, target: Target },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Where a visible collectible peeks in: an edge plus a fraction in `[0, 1)`
/// along it (top-to-bottom for left/right, left-to-right for top/bottom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePosition {
    pub edge: Edge,
    pub along: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub target: Target,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    Appeared {
        target: Target,
        position: EdgePosition,
    },
    Hidden {
        target: Target,
    },
}

#[derive(Debug, Clone)]
enum AppearanceState {
    Disarmed,
    Waiting(TimerId),
    Visible {
        position: EdgePosition,
        hide: TimerId,
    },
}

#[derive(Debug, Clone)]
struct Appearance {
    target: Target,
    state: AppearanceState,
}

#[derive(Debug, Clone)]
struct SecretCode {
    code: Vec<char>,
    buffer: VecDeque<char>,
    target: Target,
}

#[derive(Debug, Clone)]
struct DoubleActivate {
    element: String,
    target: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPayload {
    Show(usize),
    Hide(usize),
}

#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    appearances: Vec<Appearance>,
    codes: Vec<SecretCode>,
    doubles: Vec<DoubleActivate>,
    last_tap: Option<(String, u64)>,
    timers: TimerQueue<TimerPayload>,
    rng: Prng,
}

impl DiscoveryEngine {
    pub fn new(config: DiscoveryConfig, triggers: &[TriggerSpec], seed: u64) -> Self {
        let mut engine = Self {
            config,
            appearances: Vec::new(),
            codes: Vec::new(),
            doubles: Vec::new(),
            last_tap: None,
            timers: TimerQueue::new(),
            rng: Prng::new(seed),
        };
        for trigger in triggers {
            match trigger {
                TriggerSpec::Appearance { target } => engine.appearances.push(Appearance {
                    target: target.clone(),
                    state: AppearanceState::Disarmed,
                }),
                TriggerSpec::SecretCode { code, target } => {
                    let code: Vec<char> = code.chars().map(|c| c.to_ascii_lowercase()).collect();
                    if code.is_empty() {
                        continue;
                    }
                    engine.codes.push(SecretCode {
                        buffer: VecDeque::with_capacity(code.len()),
                        code,
                        target: target.clone(),
                    });
                }
                TriggerSpec::DoubleActivate { element, target } => {
                    engine.doubles.push(DoubleActivate {
                        element: element.clone(),
                        target: target.clone(),
                    })
                }
            }
        }
        engine
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Schedule the first appearance of every undiscovered appearance target.
    pub fn arm(&mut self, progress: &Progress) {
        for i in 0..self.appearances.len() {
            let a = &self.appearances[i];
            if matches!(a.state, AppearanceState::Disarmed)
                && !progress.has(a.target.kind, &a.target.id)
            {
                self.schedule_show(i);
            }
        }
    }

    /// Currently visible appearance targets.
    pub fn visible(&self) -> Vec<(Target, EdgePosition)> {
        self.appearances
            .iter()
            .filter_map(|a| match a.state {
                AppearanceState::Visible { position, .. } => Some((a.target.clone(), position)),
                _ => None,
            })
            .collect()
    }

    pub fn is_armed(&self, target: &Target) -> bool {
        self.appearances
            .iter()
            .any(|a| &a.target == target && !matches!(a.state, AppearanceState::Disarmed))
    }

    pub fn advance(&mut self, dt_ms: u64, progress: &Progress) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();
        let until = self.timers.deadline(dt_ms);
        while let Some((id, payload)) = self.timers.pop_due(until) {
            match payload {
                TimerPayload::Show(i) => {
                    if !matches!(self.appearances[i].state, AppearanceState::Waiting(t) if t == id)
                    {
                        continue;
                    }
                    let target = self.appearances[i].target.clone();
                    if progress.has(target.kind, &target.id) {
                        self.appearances[i].state = AppearanceState::Disarmed;
                        continue;
                    }
                    let position = self.pick_position();
                    let window = self.sample_ms(self.config.visible_min_ms, self.config.visible_max_ms);
                    let hide = self.timers.schedule(window, TimerPayload::Hide(i));
                    self.appearances[i].state = AppearanceState::Visible { position, hide };
                    debug!("Collectible {} peeking from {:?}", target.id, position.edge);
                    events.push(DiscoveryEvent::Appeared { target, position });
                }
                TimerPayload::Hide(i) => {
                    if !matches!(self.appearances[i].state, AppearanceState::Visible { hide, .. } if hide == id)
                    {
                        continue;
                    }
                    let target = self.appearances[i].target.clone();
                    if progress.has(target.kind, &target.id) {
                        self.appearances[i].state = AppearanceState::Disarmed;
                    } else {
                        self.schedule_show(i);
                    }
                    events.push(DiscoveryEvent::Hidden { target });
                }
            }
        }
        self.timers.settle(until);
        events
    }

    /// Visitor clicked a visible collectible. Ignored unless it is showing.
    pub fn catch(&mut self, target: &Target, progress: &mut Progress) -> Option<Discovery> {
        let showing = self
            .appearances
            .iter()
            .any(|a| &a.target == target && matches!(a.state, AppearanceState::Visible { .. }));
        if !showing {
            return None;
        }
        Some(self.fire(target.clone(), progress))
    }

    /// Feed one keypress into every secret-code buffer.
    pub fn on_key(&mut self, key: Key, progress: &mut Progress) -> Vec<Discovery> {
        let typed = key.char_lower();
        let mut matched = Vec::new();
        for code in self.codes.iter_mut() {
            let Some(c) = typed else {
                code.buffer.clear();
                continue;
            };
            code.buffer.push_back(c);
            while code.buffer.len() > code.code.len() {
                code.buffer.pop_front();
            }
            if code.buffer.iter().eq(code.code.iter()) {
                code.buffer.clear();
                matched.push(code.target.clone());
            }
        }
        matched
            .into_iter()
            .map(|target| self.fire(target, progress))
            .collect()
    }

    /// Pointer tap on a named element; a second tap on the same element within
    /// the double-tap window fires its bound triggers.
    pub fn on_tap(&mut self, element: &str, progress: &mut Progress) -> Vec<Discovery> {
        let now = self.timers.now_ms();
        let is_double = matches!(&self.last_tap, Some((prev, at))
            if prev == element && now.saturating_sub(*at) <= self.config.double_tap_window_ms);
        if !is_double {
            self.last_tap = Some((element.to_string(), now));
            return Vec::new();
        }
        self.last_tap = None;
        self.on_double_activate(element, progress)
    }

    /// Native double-click events skip tap pairing.
    pub fn on_double_activate(&mut self, element: &str, progress: &mut Progress) -> Vec<Discovery> {
        let targets: Vec<Target> = self
            .doubles
            .iter()
            .filter(|d| d.element == element)
            .map(|d| d.target.clone())
            .collect();
        targets
            .into_iter()
            .map(|target| self.fire(target, progress))
            .collect()
    }

    /// Record the target and permanently disarm its appearance trigger.
    pub fn fire(&mut self, target: Target, progress: &mut Progress) -> Discovery {
        let is_new = progress.record(target.kind, &target.id);
        for a in self.appearances.iter_mut().filter(|a| a.target == target) {
            match a.state {
                AppearanceState::Waiting(t) => {
                    self.timers.cancel(t);
                }
                AppearanceState::Visible { hide, .. } => {
                    self.timers.cancel(hide);
                }
                AppearanceState::Disarmed => {}
            }
            a.state = AppearanceState::Disarmed;
        }
        if is_new {
            info!("Discovered {} {}", target.kind.as_str(), target.id);
        }
        Discovery { target, is_new }
    }

    fn schedule_show(&mut self, i: usize) {
        let delay = self.sample_ms(
            self.config.appear_delay_min_ms,
            self.config.appear_delay_max_ms,
        );
        let t = self.timers.schedule(delay, TimerPayload::Show(i));
        self.appearances[i].state = AppearanceState::Waiting(t);
    }

    fn sample_ms(&mut self, min: u64, max: u64) -> u64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (hi - lo).min(u64::from(u32::MAX - 1)) as u32;
        lo + u64::from(self.rng.gen_range_u32(0, span + 1))
    }

    fn pick_position(&mut self) -> EdgePosition {
        let edge = self
            .rng
            .choose(&self.config.sides)
            .copied()
            .unwrap_or(Edge::Right);
        EdgePosition {
            edge,
            along: self.rng.next_f32_01(),
        }
    }
}

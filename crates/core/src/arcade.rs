//! The arcade context: progress, hidden triggers, toasts, and at most one open
//! game session.
//!
//! Everything runs on virtual time. A host calls [`Arcade::advance`] with the
//! elapsed milliseconds and forwards visitor input through [`Arcade::handle`];
//! renderers read [`Arcade::snapshot`].

use arcade_games::flappy::{FlappyEvent, FlappySim, FlappySnapshot};
use arcade_games::input::{infer_swipe, Direction, Key, TouchPoint};
use arcade_games::memory::{MemoryEvent, MemoryGame, MemorySnapshot};
use arcade_games::prng::Prng;
use arcade_games::session::SessionCommand;
use arcade_games::snake::{SnakeSim, SnakeSnapshot};
use arcade_games::tictactoe::{Board, Mark, Outcome, TicTacToe, TicTacToeEvent};
use arcade_games::{GameId, Phase, Session};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CollectibleInfo, CollectionView};
use crate::config::ArcadeConfig;
use crate::discovery::{Discovery, DiscoveryEngine, DiscoveryEvent, EdgePosition, Target};
use crate::error::ArcadeError;
use crate::notify::{Notification, NotificationKind, NotificationQueue};
use crate::progress::Progress;
use crate::unlock::UnlockKind;

/// Snake swipes shorter than this are ignored.
pub const SNAKE_SWIPE_MIN: f32 = 30.0;
/// Upward travel that counts as a Flappy jump.
pub const FLAPPY_SWIPE_MIN: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Key(Key),
    /// Pointer tap. `None` means the open game's play surface.
    Tap { element: Option<String> },
    /// Native double-click on a named element.
    DoubleActivate(String),
    TouchStart(TouchPoint),
    TouchEnd(TouchPoint),
    /// Board cell or memory card.
    Select(usize),
    ChooseMark(Mark),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArcadeEvent {
    Discovered(Discovery),
    Appeared {
        target: Target,
        position: EdgePosition,
    },
    Hidden {
        target: Target,
    },
    SessionOpened(GameId),
    SessionEnded {
        game: GameId,
        score: u32,
        new_high_score: bool,
    },
}

#[derive(Debug, Clone)]
enum GameWorld {
    TicTacToe(TicTacToe),
    Snake(SnakeSim),
    Memory(MemoryGame),
    Flappy(FlappySim),
}

impl GameWorld {
    fn score(&self) -> u32 {
        match self {
            GameWorld::Snake(sim) => sim.score(),
            GameWorld::Flappy(sim) => sim.score(),
            GameWorld::Memory(game) => game.pairs_matched(),
            GameWorld::TicTacToe(game) => match (game.outcome(), game.player()) {
                (Some(Outcome::Win { mark, .. }), Some(player)) if mark == player => 1,
                _ => 0,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    session: Session,
    world: GameWorld,
    /// Virtual time not yet consumed by whole ticks.
    carry_ms: u64,
    touch_start: Option<TouchPoint>,
    submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicTacToeView {
    pub board: Board,
    pub player: Option<Mark>,
    pub to_move: Mark,
    pub thinking: bool,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldView {
    TicTacToe(TicTacToeView),
    Snake(SnakeSnapshot),
    Memory(MemorySnapshot),
    Flappy(FlappySnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub game: GameId,
    pub name: String,
    pub phase: Phase,
    pub score: u32,
    pub high_score: u32,
    pub world: WorldView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeekingCollectible {
    pub id: String,
    pub position: EdgePosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcadeSnapshot {
    pub now_ms: u64,
    pub session: Option<SessionView>,
    pub collectible: Option<CollectibleInfo>,
    pub peeking: Vec<PeekingCollectible>,
    pub notifications: Vec<Notification>,
    pub discovered_games: usize,
    pub discovered_collectibles: usize,
    pub storage_degraded: bool,
}

pub struct Arcade {
    config: ArcadeConfig,
    progress: Progress,
    discovery: DiscoveryEngine,
    notifications: NotificationQueue,
    catalog: Catalog,
    active: Option<ActiveSession>,
    collectible: Option<String>,
    rng: Prng,
}

impl std::fmt::Debug for Arcade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arcade")
            .field("progress", &self.progress)
            .field("game", &self.active.as_ref().map(|a| a.session.game()))
            .field("collectible", &self.collectible)
            .finish()
    }
}

impl Arcade {
    /// `seed` is used only when the config does not pin one.
    pub fn new(config: ArcadeConfig, progress: Progress, seed: u64) -> Self {
        let mut rng = Prng::new(config.seed.unwrap_or(seed));
        let mut discovery =
            DiscoveryEngine::new(config.discovery.clone(), &config.triggers, rng.next_u64());
        discovery.arm(&progress);
        let notifications = NotificationQueue::new(config.notification_ms, config.max_notifications);
        Self {
            config,
            progress,
            discovery,
            notifications,
            catalog: Catalog::default(),
            active: None,
            collectible: None,
            rng,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn collection(&self) -> CollectionView {
        self.catalog.collection(&self.progress)
    }

    pub fn now_ms(&self) -> u64 {
        self.discovery.now_ms()
    }

    pub fn active_game(&self) -> Option<GameId> {
        self.active.as_ref().map(|a| a.session.game())
    }

    pub fn phase(&self) -> Option<Phase> {
        self.active.as_ref().map(|a| a.session.phase())
    }

    pub fn open_collectible_id(&self) -> Option<&str> {
        self.collectible.as_deref()
    }

    /// Open a discovered game from the collection. Replaces any open game.
    pub fn open_game(&mut self, game: GameId) -> Result<(), ArcadeError> {
        if !self.progress.has(UnlockKind::Game, game.as_str()) {
            return Err(ArcadeError::Locked(game.as_str().to_string()));
        }
        self.start_session(game);
        Ok(())
    }

    /// Close the open game. Its world is dropped; a pending high score is kept.
    pub fn close_game(&mut self) -> Result<(), ArcadeError> {
        let mut active = self.active.take().ok_or(ArcadeError::NoSession)?;
        self.submit(&mut active);
        debug!("Closed {}", active.session.game().as_str());
        Ok(())
    }

    pub fn open_collectible(&mut self, id: &str) -> Result<(), ArcadeError> {
        if !self.progress.has(UnlockKind::Collectible, id) {
            return Err(ArcadeError::Hidden(id.to_string()));
        }
        self.collectible = Some(id.to_string());
        Ok(())
    }

    pub fn close_collectible(&mut self) -> bool {
        self.collectible.take().is_some()
    }

    /// Visitor clicked a peeking collectible.
    pub fn catch(&mut self, id: &str) -> Vec<ArcadeEvent> {
        let target = Target::collectible(id);
        match self.discovery.catch(&target, &mut self.progress) {
            Some(d) => self.on_discovery(d),
            None => Vec::new(),
        }
    }

    pub fn command(&mut self, command: SessionCommand) -> Result<bool, ArcadeError> {
        if command == SessionCommand::Reset {
            return self.reset_session();
        }
        let active = self.active.as_mut().ok_or(ArcadeError::NoSession)?;
        let applied = active.session.apply(command);
        if applied {
            debug!(
                "{} -> {}",
                active.session.game().as_str(),
                active.session.phase().as_str()
            );
        }
        Ok(applied)
    }

    /// Back to Idle with a fresh world. The finished run's score is submitted first.
    fn reset_session(&mut self) -> Result<bool, ArcadeError> {
        let mut active = self.active.take().ok_or(ArcadeError::NoSession)?;
        let score = active.session.score();
        if !active.session.reset() {
            self.active = Some(active);
            return Ok(false);
        }
        if !active.submitted {
            self.progress.submit_score(active.session.game(), score);
        }
        active.world = self.new_world(active.session.game());
        active.carry_ms = 0;
        active.touch_start = None;
        active.submitted = false;
        self.active = Some(active);
        Ok(true)
    }

    pub fn handle(&mut self, input: Input) -> Vec<ArcadeEvent> {
        let mut events = Vec::new();
        match input {
            Input::Key(key) => {
                for d in self.discovery.on_key(key, &mut self.progress) {
                    events.extend(self.on_discovery(d));
                }
                if key == Key::Escape {
                    if !self.close_collectible() {
                        let _ = self.close_game();
                    }
                } else {
                    self.game_key(key);
                }
            }
            Input::Tap {
                element: Some(element),
            } => {
                for d in self.discovery.on_tap(&element, &mut self.progress) {
                    events.extend(self.on_discovery(d));
                }
            }
            Input::Tap { element: None } => {
                if self.active_game() == Some(GameId::Flappy) {
                    self.flappy_action();
                }
            }
            Input::DoubleActivate(element) => {
                for d in self.discovery.on_double_activate(&element, &mut self.progress) {
                    events.extend(self.on_discovery(d));
                }
            }
            Input::TouchStart(point) => {
                if let Some(active) = self.active.as_mut() {
                    active.touch_start = Some(point);
                }
            }
            Input::TouchEnd(end) => self.swipe(end),
            Input::Select(index) => events.extend(self.select(index)),
            Input::ChooseMark(mark) => events.extend(self.choose_mark(mark)),
        }
        events
    }

    pub fn advance(&mut self, dt_ms: u64) -> Vec<ArcadeEvent> {
        let mut events: Vec<ArcadeEvent> = self
            .discovery
            .advance(dt_ms, &self.progress)
            .into_iter()
            .map(|e| match e {
                DiscoveryEvent::Appeared { target, position } => {
                    ArcadeEvent::Appeared { target, position }
                }
                DiscoveryEvent::Hidden { target } => ArcadeEvent::Hidden { target },
            })
            .collect();
        self.notifications.advance(dt_ms);

        let Some(mut active) = self.active.take() else {
            return events;
        };
        if active.session.is_running() {
            if let Some(ended) = self.run_world(&mut active, dt_ms) {
                events.push(ended);
            }
        }
        self.active = Some(active);
        events
    }

    pub fn snapshot(&self) -> ArcadeSnapshot {
        ArcadeSnapshot {
            now_ms: self.now_ms(),
            session: self.active.as_ref().map(|a| self.session_view(a)),
            collectible: self
                .collectible
                .as_deref()
                .map(|id| self.catalog.collectible(id)),
            peeking: self
                .discovery
                .visible()
                .into_iter()
                .map(|(target, position)| PeekingCollectible {
                    id: target.id,
                    position,
                })
                .collect(),
            notifications: self.notifications.active(),
            discovered_games: self.progress.count(UnlockKind::Game),
            discovered_collectibles: self.progress.count(UnlockKind::Collectible),
            storage_degraded: self.progress.is_degraded(),
        }
    }

    fn session_view(&self, active: &ActiveSession) -> SessionView {
        let world = match &active.world {
            GameWorld::TicTacToe(game) => WorldView::TicTacToe(TicTacToeView {
                board: *game.board(),
                player: game.player(),
                to_move: game.to_move(),
                thinking: game.is_thinking(),
                outcome: game.outcome(),
            }),
            GameWorld::Snake(sim) => WorldView::Snake(sim.snapshot()),
            GameWorld::Memory(game) => WorldView::Memory(game.snapshot()),
            GameWorld::Flappy(sim) => WorldView::Flappy(sim.snapshot()),
        };
        let game = active.session.game();
        SessionView {
            game,
            name: self.catalog.game(game.as_str()).name,
            phase: active.session.phase(),
            score: active.session.score(),
            high_score: active.session.high_score(),
            world,
        }
    }

    fn on_discovery(&mut self, d: Discovery) -> Vec<ArcadeEvent> {
        let name = self.catalog.display_name(d.target.kind, &d.target.id);
        if d.is_new {
            let text = match d.target.kind {
                UnlockKind::Game => format!("New game discovered: {name}!"),
                UnlockKind::Collectible => format!("Easter egg found: {name}!"),
            };
            self.notifications.push(text, NotificationKind::Success);
        }
        let mut events = Vec::new();
        match d.target.kind {
            UnlockKind::Game => match GameId::parse(&d.target.id) {
                Some(game) => {
                    self.start_session(game);
                    events.push(ArcadeEvent::SessionOpened(game));
                }
                None => warn!("Trigger unlocked unknown game {}", d.target.id),
            },
            UnlockKind::Collectible => self.collectible = Some(d.target.id.clone()),
        }
        events.insert(0, ArcadeEvent::Discovered(d));
        events
    }

    fn start_session(&mut self, game: GameId) {
        if let Some(mut previous) = self.active.take() {
            self.submit(&mut previous);
        }
        let session = Session::new(game, self.progress.high_score(game));
        let world = self.new_world(game);
        info!("Opened {}", game.as_str());
        self.active = Some(ActiveSession {
            session,
            world,
            carry_ms: 0,
            touch_start: None,
            submitted: false,
        });
    }

    fn new_world(&mut self, game: GameId) -> GameWorld {
        let seed = self.rng.next_u64();
        let cfg = &self.config;
        match game {
            GameId::TicTacToe => GameWorld::TicTacToe(TicTacToe::new(seed, clamp_ms(cfg.tictactoe_delay_ms))),
            GameId::Snake => {
                let mut sim = SnakeSim::new(seed);
                sim.params.tick_ms = clamp_ms(cfg.snake_tick_ms).max(1);
                GameWorld::Snake(sim)
            }
            GameId::Memory => GameWorld::Memory(MemoryGame::new(seed, clamp_ms(cfg.memory_mismatch_ms))),
            GameId::Flappy => {
                let mut sim = FlappySim::new(seed);
                sim.params.frame_ms = clamp_ms(cfg.flappy_frame_ms).max(1);
                GameWorld::Flappy(sim)
            }
        }
    }

    /// Persist the session's score once, if it beats the stored high score.
    fn submit(&mut self, active: &mut ActiveSession) -> bool {
        if active.submitted {
            return false;
        }
        active.submitted = true;
        self.progress
            .submit_score(active.session.game(), active.session.score())
    }

    fn finish(&mut self, active: &mut ActiveSession) -> Option<ArcadeEvent> {
        if !active.session.end() {
            return None;
        }
        let new_high_score = self.submit(active);
        let (game, score) = (active.session.game(), active.session.score());
        info!("{} over with score {}", game.as_str(), score);
        if new_high_score {
            self.notifications
                .push(format!("New high score: {score}!"), NotificationKind::Info);
        }
        Some(ArcadeEvent::SessionEnded {
            game,
            score,
            new_high_score,
        })
    }

    fn sync_score(active: &mut ActiveSession) {
        let score = active.world.score();
        active.session.set_score(score);
    }

    fn run_world(&mut self, active: &mut ActiveSession, dt_ms: u64) -> Option<ArcadeEvent> {
        let mut over = false;
        match &mut active.world {
            GameWorld::Snake(sim) => {
                let tick = u64::from(sim.params.tick_ms.max(1));
                active.carry_ms += dt_ms;
                while active.carry_ms >= tick {
                    active.carry_ms -= tick;
                    if sim.step().is_terminal() {
                        over = true;
                        break;
                    }
                }
            }
            GameWorld::Flappy(sim) => {
                let frame = u64::from(sim.params.frame_ms.max(1));
                active.carry_ms += dt_ms;
                while active.carry_ms >= frame {
                    active.carry_ms -= frame;
                    if sim.step() == FlappyEvent::Crashed {
                        over = true;
                        break;
                    }
                }
            }
            GameWorld::Memory(game) => {
                game.advance(clamp_ms(dt_ms));
            }
            GameWorld::TicTacToe(game) => {
                if let TicTacToeEvent::Finished { .. } = game.advance(clamp_ms(dt_ms)) {
                    over = true;
                }
            }
        }
        Self::sync_score(active);
        if over {
            active.carry_ms = 0;
            return self.finish(active);
        }
        None
    }

    fn game_key(&mut self, key: Key) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let flappy_action = match &mut active.world {
            GameWorld::Snake(sim) => {
                if let Some(dir) = key.direction() {
                    steer_snake(&mut active.session, sim, dir);
                } else if key == Key::Space {
                    active.session.apply(SessionCommand::TogglePause);
                }
                false
            }
            GameWorld::Flappy(_) => {
                if key.is_char('p') {
                    active.session.apply(SessionCommand::TogglePause);
                }
                key == Key::Space
            }
            GameWorld::Memory(_) | GameWorld::TicTacToe(_) => false,
        };
        if flappy_action {
            self.flappy_action();
        }
    }

    /// Space, tap, or swipe up: start an idle game, otherwise jump.
    fn flappy_action(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let GameWorld::Flappy(sim) = &mut active.world else {
            return;
        };
        match active.session.phase() {
            Phase::Idle => {
                active.session.start();
            }
            Phase::Running => sim.flap(),
            Phase::Paused | Phase::Over => {}
        }
    }

    fn swipe(&mut self, end: TouchPoint) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(start) = active.touch_start.take() else {
            return;
        };
        let flappy_action = match &mut active.world {
            GameWorld::Snake(sim) => {
                if let Some(dir) = infer_swipe(start, end, SNAKE_SWIPE_MIN) {
                    steer_snake(&mut active.session, sim, dir);
                }
                false
            }
            GameWorld::Flappy(_) => start.y - end.y > FLAPPY_SWIPE_MIN,
            GameWorld::Memory(_) | GameWorld::TicTacToe(_) => false,
        };
        if flappy_action {
            self.flappy_action();
        }
    }

    fn select(&mut self, index: usize) -> Vec<ArcadeEvent> {
        let Some(mut active) = self.active.take() else {
            return Vec::new();
        };
        let mut over = false;
        match &mut active.world {
            GameWorld::Memory(game) => {
                if active.session.phase() == Phase::Idle {
                    active.session.start();
                }
                if active.session.is_running() && game.click(index) == MemoryEvent::Won {
                    over = true;
                }
            }
            GameWorld::TicTacToe(game) => {
                if active.session.is_running() {
                    if let TicTacToeEvent::Finished { .. } = game.play(index) {
                        over = true;
                    }
                }
            }
            GameWorld::Snake(_) | GameWorld::Flappy(_) => {}
        }
        Self::sync_score(&mut active);
        let mut events = Vec::new();
        if over {
            events.extend(self.finish(&mut active));
        }
        self.active = Some(active);
        events
    }

    fn choose_mark(&mut self, mark: Mark) -> Vec<ArcadeEvent> {
        let Some(mut active) = self.active.take() else {
            return Vec::new();
        };
        let mut over = false;
        if let GameWorld::TicTacToe(game) = &mut active.world {
            if active.session.phase() == Phase::Idle {
                active.session.start();
            }
            if active.session.is_running() {
                if let TicTacToeEvent::Finished { .. } = game.choose_mark(mark) {
                    over = true;
                }
            }
        }
        let mut events = Vec::new();
        if over {
            events.extend(self.finish(&mut active));
        }
        self.active = Some(active);
        events
    }
}

/// A direction input starts an idle snake and steers a running one.
fn steer_snake(session: &mut Session, sim: &mut SnakeSim, dir: Direction) {
    match session.phase() {
        Phase::Idle => {
            session.start();
            sim.steer(dir);
        }
        Phase::Running => {
            sim.steer(dir);
        }
        Phase::Paused | Phase::Over => {}
    }
}

fn clamp_ms(ms: u64) -> u32 {
    u32::try_from(ms).unwrap_or(u32::MAX)
}

//! Newline-delimited JSON protocol. One request per line, one response per line.

use arcade::arcade::{Arcade, ArcadeSnapshot, Input};
use arcade::catalog::CollectionView;
use arcade_games::input::{Key, TouchPoint};
use arcade_games::session::SessionCommand;
use arcade_games::tictactoe::Mark;
use arcade_games::GameId;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetState,
    GetCollection,

    OpenGame {
        game: GameId,
    },
    CloseGame,
    OpenCollectible {
        id: String,
    },
    CloseCollectible,

    /// DOM-style key name: `"ArrowUp"`, `" "`, `"t"`.
    Key {
        key: String,
    },
    Tap {
        #[serde(default)]
        element: Option<String>,
    },
    DoubleActivate {
        element: String,
    },
    TouchStart {
        x: f32,
        y: f32,
    },
    TouchEnd {
        x: f32,
        y: f32,
    },
    Select {
        index: usize,
    },
    ChooseMark {
        mark: Mark,
    },
    Command {
        command: SessionCommand,
    },
    CatchAppearance {
        id: String,
    },

    SetFps {
        fps: u32,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
#[allow(clippy::large_enum_variant)]
pub enum Response {
    State(ArcadeSnapshot),
    Collection(CollectionView),
    Success { message: String },
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Response::Success {
            message: message.into(),
        }
    }
}

/// Daemon-side state shared between the frame loop and client tasks.
#[derive(Debug)]
pub struct DaemonState {
    pub arcade: Arcade,
    pub target_fps: u32,
}

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 240;

impl DaemonState {
    pub fn new(arcade: Arcade, target_fps: u32) -> Self {
        Self {
            arcade,
            target_fps: target_fps.clamp(MIN_FPS, MAX_FPS),
        }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        debug!("Request: {:?}", request);
        match request {
            Request::GetState => self.state(),
            Request::GetCollection => Response::Collection(self.arcade.collection()),
            Request::OpenGame { game } => match self.arcade.open_game(game) {
                Ok(()) => self.state(),
                Err(e) => Response::error(e.to_string()),
            },
            Request::CloseGame => match self.arcade.close_game() {
                Ok(()) => Response::success("closed"),
                Err(e) => Response::error(e.to_string()),
            },
            Request::OpenCollectible { id } => match self.arcade.open_collectible(&id) {
                Ok(()) => self.state(),
                Err(e) => Response::error(e.to_string()),
            },
            Request::CloseCollectible => {
                if self.arcade.close_collectible() {
                    Response::success("closed")
                } else {
                    Response::error("no collectible is open")
                }
            }
            Request::Key { key } => self.input(Input::Key(Key::parse(&key))),
            Request::Tap { element } => self.input(Input::Tap { element }),
            Request::DoubleActivate { element } => self.input(Input::DoubleActivate(element)),
            Request::TouchStart { x, y } => self.input(Input::TouchStart(TouchPoint::new(x, y))),
            Request::TouchEnd { x, y } => self.input(Input::TouchEnd(TouchPoint::new(x, y))),
            Request::Select { index } => self.input(Input::Select(index)),
            Request::ChooseMark { mark } => self.input(Input::ChooseMark(mark)),
            Request::Command { command } => match self.arcade.command(command) {
                Ok(true) => self.state(),
                Ok(false) => Response::error(format!("{:?} not valid now", command)),
                Err(e) => Response::error(e.to_string()),
            },
            Request::CatchAppearance { id } => {
                if self.arcade.catch(&id).is_empty() {
                    Response::error(format!("{} is not showing", id))
                } else {
                    self.state()
                }
            }
            Request::SetFps { fps } => {
                self.target_fps = fps.clamp(MIN_FPS, MAX_FPS);
                Response::success(format!("framerate set to {} FPS", self.target_fps))
            }
        }
    }

    /// Parse one protocol line and answer it. Malformed lines get an `Error`.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        }
    }

    fn input(&mut self, input: Input) -> Response {
        self.arcade.handle(input);
        self.state()
    }

    fn state(&self) -> Response {
        Response::State(self.arcade.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade::config::ArcadeConfig;
    use arcade::progress::Progress;
    use serde_json::Value;

    fn daemon() -> DaemonState {
        let config = ArcadeConfig {
            seed: Some(1),
            ..ArcadeConfig::default()
        };
        DaemonState::new(Arcade::new(config, Progress::in_memory(), 0), 60)
    }

    fn send(d: &mut DaemonState, line: &str) -> Value {
        serde_json::to_value(d.handle_line(line)).unwrap()
    }

    #[test]
    fn malformed_line_is_an_error_response() {
        let mut d = daemon();
        let v = send(&mut d, "{not json");
        assert_eq!(v["type"], "Error");
        let v = send(&mut d, r#"{"type":"Warp"}"#);
        assert_eq!(v["type"], "Error");
    }

    #[test]
    fn locked_game_is_refused() {
        let mut d = daemon();
        let v = send(&mut d, r#"{"type":"OpenGame","game":"snake"}"#);
        assert_eq!(v["type"], "Error");
        assert_eq!(v["message"], "game snake has not been discovered");
    }

    #[test]
    fn typed_code_shows_collectible_in_state() {
        let mut d = daemon();
        for key in ["T", "h", "o", "r"] {
            send(&mut d, &format!(r#"{{"type":"Key","key":"{}"}}"#, key));
        }
        let v = send(&mut d, r#"{"type":"GetState"}"#);
        assert_eq!(v["type"], "State");
        assert_eq!(v["collectible"]["id"], "thor");
        assert_eq!(v["discovered_collectibles"], 1);

        let v = send(&mut d, r#"{"type":"GetCollection"}"#);
        assert_eq!(v["type"], "Collection");
        assert_eq!(v["collectibles"]["discovered"], 1);
    }

    #[test]
    fn double_activate_then_commands() {
        let mut d = daemon();
        let v = send(&mut d, r#"{"type":"DoubleActivate","element":"logo"}"#);
        assert_eq!(v["session"]["game"], "tictactoe");

        let v = send(&mut d, r#"{"type":"ChooseMark","mark":"X"}"#);
        assert_eq!(v["session"]["phase"], "running");
        let v = send(&mut d, r#"{"type":"Command","command":"pause"}"#);
        assert_eq!(v["session"]["phase"], "paused");
        let v = send(&mut d, r#"{"type":"Command","command":"pause"}"#);
        assert_eq!(v["type"], "Error");
        let v = send(&mut d, r#"{"type":"Command","command":"reset"}"#);
        assert_eq!(v["session"]["phase"], "idle");
    }

    #[test]
    fn fps_is_clamped() {
        let mut d = daemon();
        send(&mut d, r#"{"type":"SetFps","fps":0}"#);
        assert_eq!(d.target_fps, MIN_FPS);
        send(&mut d, r#"{"type":"SetFps","fps":100000}"#);
        assert_eq!(d.target_fps, MAX_FPS);
    }
}

//! Arcade daemon: owns the arcade, advances it in real time, and serves the
//! JSON-lines protocol to any number of local clients.

mod error;
mod paths;
mod protocol;

use std::fs;
use std::sync::Arc;

use arcade::arcade::Arcade;
use arcade::config::ArcadeConfig;
use arcade::progress::Progress;
use arcade::storage::JsonFileStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time::{self, Duration, Instant};
use tracing::{error, info, warn};

use crate::error::DaemonError;
use crate::paths::AppPaths;
use crate::protocol::{DaemonState, Response};

const DEFAULT_ADDR: &str = "127.0.0.1:9877";
const DEFAULT_FPS: u32 = 60;

/// Listen address and frame rate, overridable from the environment.
#[derive(Debug, Clone)]
struct Settings {
    addr: String,
    fps: u32,
}

impl Settings {
    fn from_env() -> Result<Self, DaemonError> {
        let addr = std::env::var("ARCADE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let fps = match std::env::var("ARCADE_FPS") {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|_| DaemonError::Env {
                name: "ARCADE_FPS",
                value: raw.clone(),
            })?,
            Err(_) => DEFAULT_FPS,
        };
        Ok(Self { addr, fps })
    }
}

/// Read `config.json`; a missing file means defaults.
fn load_config(paths: &AppPaths) -> Result<ArcadeConfig, DaemonError> {
    let path = paths.config_file();
    match fs::read_to_string(&path) {
        Ok(raw) => ArcadeConfig::from_json(&raw)
            .map_err(|source| DaemonError::ConfigParse { path, source }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            Ok(ArcadeConfig::default())
        }
        Err(source) => Err(DaemonError::ConfigRead { path, source }),
    }
}

fn load_progress(paths: &AppPaths) -> Progress {
    let path = paths.progress_file();
    match JsonFileStore::open(&path) {
        Ok(store) => {
            info!("Progress loaded ({})", path.display());
            Progress::load(Box::new(store))
        }
        Err(e) => {
            warn!("Could not open {}: {}", path.display(), e);
            info!("Continuing with in-memory progress");
            Progress::in_memory()
        }
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

async fn write_response(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    response: &Response,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    writer
        .write_all(serde_json::to_string(response)?.as_bytes())
        .await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

async fn handle_client(
    stream: TcpStream,
    state: Arc<RwLock<DaemonState>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = {
            let mut s = state.write().await;
            s.handle_line(&line)
        };
        write_response(&mut writer, &response).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let paths = AppPaths::new()?;
    let settings = Settings::from_env()?;
    let config = load_config(&paths)?;
    let progress = load_progress(&paths);
    info!("Data directory: {}", paths.data_dir().display());

    let arcade = Arcade::new(config, progress, clock_seed());
    let state = Arc::new(RwLock::new(DaemonState::new(arcade, settings.fps)));

    // Frame loop: feed measured wall time into the arcade's virtual clock.
    let frame_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut last = Instant::now();
        let mut carry = Duration::ZERO;
        loop {
            let target_fps = {
                let s = frame_state.read().await;
                s.target_fps
            };
            let frame_millis = u64::from((1000 / target_fps.max(1)).max(1));
            time::sleep(Duration::from_millis(frame_millis)).await;

            let now = Instant::now();
            carry += now - last;
            last = now;
            let whole_ms = carry.as_millis() as u64;
            carry -= Duration::from_millis(whole_ms);

            let mut s = frame_state.write().await;
            s.arcade.advance(whole_ms);
        }
    });

    let listener = TcpListener::bind(&settings.addr).await?;
    info!("Arcade daemon listening on {}", settings.addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = accepted?;
                info!("Client connected: {}", addr);
                let client_state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, client_state).await {
                        error!("Client handler error: {}", e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                // Progress is written through on every change; nothing to flush.
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

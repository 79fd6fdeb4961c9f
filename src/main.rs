//! Terminal Blockfall runner (default binary).
//!
//! Drives the state stack from crossterm input and a fixed frame cadence, and
//! flushes the persistent framebuffer through the diffing renderer.

use std::cell::{Cell, RefCell};
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blockfall::core::handler;
use blockfall::input::{map_key_event, should_quit};
use blockfall::relay::{RelayConfig, RelayHandle};
use blockfall::relay_bridge::{drain_notices, RelayObserver};
use blockfall::states::{HighScores, LoadState, SharedData, StackEmptied, StateManager};
use blockfall::term::{FrameBuffer, TerminalRenderer, Viewport};
use blockfall::types::FRAME_MS;

struct Settings {
    data: PathBuf,
    seed: u32,
    scores: Option<PathBuf>,
    relay: bool,
}

impl Settings {
    fn from_env() -> Self {
        let data = env::var_os("BLOCKFALL_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data.json"));
        let seed = env::var("BLOCKFALL_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(clock_seed);
        let scores = env::var_os("BLOCKFALL_SCORES").map(PathBuf::from);
        let relay = env::var("BLOCKFALL_RELAY").is_ok_and(|v| v.trim() == "host");
        Self {
            data,
            seed,
            scores,
            relay,
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// The terminal is in raw mode, so logs only go to a file.
fn init_logging() -> Result<()> {
    let Some(path) = env::var_os("BLOCKFALL_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("cannot create log file {path:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let settings = Settings::from_env();
    info!(data = %settings.data.display(), seed = settings.seed, "starting");

    let high_scores = match &settings.scores {
        Some(path) => HighScores::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable high scores");
            HighScores::default()
        }),
        None => HighScores::default(),
    };
    let mut shared = SharedData::new(settings.seed).with_high_scores(high_scores);

    let relay = if settings.relay {
        let handle = RelayHandle::start(RelayConfig::from_env()).context("cannot start relay host")?;
        info!(addr = %handle.local_addr(), "hosting relay");
        let handle = Rc::new(RefCell::new(handle));
        shared.observer = Some(Box::new(RelayObserver::new(Rc::clone(&handle))));
        Some(handle)
    } else {
        None
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, shared, &settings, relay.as_deref());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(
    term: &mut TerminalRenderer,
    shared: SharedData,
    settings: &Settings,
    relay: Option<&RefCell<RelayHandle>>,
) -> Result<()> {
    let mut manager = StateManager::new(shared);
    let done = Rc::new(Cell::new(false));
    let on_empty = {
        let done = Rc::clone(&done);
        handler(move |_: &StackEmptied| done.set(true))
    };
    manager.empty_event().subscribe(&on_empty);
    manager.push(Box::new(LoadState::from_path(settings.data.clone())))?;

    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut viewport = Viewport::new(w, h);
    let mut fb = FrameBuffer::new(w, h);
    let frame = Duration::from_millis(FRAME_MS);
    let mut last_frame = Instant::now();

    while !done.get() {
        let timeout = frame.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        break;
                    }
                    if let Some(symbol) = map_key_event(key) {
                        if let Err(e) = manager.input(symbol) {
                            warn!(error = %e, "transition abandoned");
                        }
                    }
                }
                Event::Resize(w, h) => {
                    viewport = Viewport::new(w, h);
                    term.invalidate();
                }
                _ => {}
            }
        }
        if done.get() {
            break;
        }

        let now = Instant::now();
        let delta = now - last_frame;
        if delta < frame {
            continue;
        }
        last_frame = now;

        if let Err(e) = manager.render(&mut fb, delta, viewport) {
            warn!(error = %e, "transition abandoned");
        }
        term.draw(&fb)?;
        if let Some(handle) = relay {
            drain_notices(handle);
        }
    }

    let shared = manager.into_shared();
    if let Some(path) = &settings.scores {
        if let Err(e) = shared.high_scores.save(path) {
            warn!(error = %e, "could not save high scores");
        }
    }
    info!("bye");
    Ok(())
}

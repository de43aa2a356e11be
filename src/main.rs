mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use glam::Vec2;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_invaders::config::Config;
use space_invaders::entities::{AssetKind, GameStatus, InputState, World};

use display::Screen;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between shots, so OS key-repeat on Space cannot flood the
/// field on terminals that report repeats as presses.
const SHOOT_COOLDOWN: u32 = 10;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so 8 frames (≈133 ms at 60 fps) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so log lines go to a file.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = File::create(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .init();
    Ok(())
}

// ── Session setup ─────────────────────────────────────────────────────────────

/// Build a world for the current terminal.  Sprites are glyphs here, so
/// both assets are ready as soon as the world exists.
fn new_world(screen: &Screen, config: &Config, rng: &mut StdRng) -> Result<World> {
    let bounds = config.playfield(screen.columns, screen.rows)?;
    let mut world = World::new(bounds, rng);
    world.asset_ready(
        AssetKind::Player,
        Vec2::new(3.0 * screen.col_units, 2.0 * screen.row_units),
    );
    world.asset_ready(
        AssetKind::Invader,
        Vec2::new(2.0 * screen.col_units, screen.row_units),
    );
    info!(
        "new session: playfield {:.0}x{:.0}, first formation in {} frames",
        bounds.width(),
        bounds.height(),
        world.spawn_interval
    );
    Ok(world)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → start a new session.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame, keys still inside
/// `HOLD_WINDOW` count as held.  Space is edge-triggered: only a fresh
/// press event sets `fire` for the next step.
fn game_loop<W: Write>(
    out: &mut W,
    screen: &Screen,
    world: &mut World,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
    frame_time: Duration,
) -> Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut fire = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if world.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        KeyCode::Char(' ') if shoot_cooldown == 0 => {
                            fire = true;
                            shoot_cooldown = SHOOT_COOLDOWN;
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        if world.status == GameStatus::Playing {
            let input = InputState {
                left: is_held(&key_frame, &KeyCode::Left, frame)
                    || is_held(&key_frame, &KeyCode::Char('a'), frame)
                    || is_held(&key_frame, &KeyCode::Char('A'), frame),
                right: is_held(&key_frame, &KeyCode::Right, frame)
                    || is_held(&key_frame, &KeyCode::Char('d'), frame)
                    || is_held(&key_frame, &KeyCode::Char('D'), frame),
                fire,
            };
            world.step(&input, rng);
        }

        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        display::render(out, screen, world)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_logging(&config)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ghostty / kitty-protocol terminals report releases; others fall back
    // to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &config, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, config: &Config, rx: &mpsc::Receiver<Event>) -> Result<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_time = Duration::from_secs(1) / config.fps;

    loop {
        let (columns, rows) = terminal::size()?;
        let screen = Screen {
            columns,
            rows,
            col_units: config.col_units,
            row_units: config.row_units,
        };
        let mut world = new_world(&screen, config, &mut rng)?;
        let quit = game_loop(out, &screen, &mut world, &mut rng, rx, frame_time)?;
        info!("session ended after {} frames", world.elapsed);
        if quit {
            break;
        }
    }
    Ok(())
}

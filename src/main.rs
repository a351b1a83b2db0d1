mod display;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cannon_crew::config::GameConfig;
use cannon_crew::events::{GameEvent, SceneChange, SceneId};
use cannon_crew::input::{InputSnapshot, Key};
use cannon_crew::manager::GameManager;
use cannon_crew::ship::ShipMap;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step handed to the simulation, so a stalled terminal doesn't
/// teleport everyone.
const MAX_DT: f32 = 0.1;

/// Environment variable naming the log file. Logging is off when unset,
/// since the terminal itself is busy with the game.
const LOG_ENV_VAR: &str = "CANNON_CREW_LOG";

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| is_held(key_frame, key, frame))
}

const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const CROUCH_KEYS: [KeyCode; 2] = [KeyCode::Char('c'), KeyCode::Char('C')];

/// Build this frame's snapshot from the held-key map and the keys that
/// produced a fresh press event during the frame.
fn snapshot(
    key_frame: &HashMap<KeyCode, u64>,
    pressed: &HashSet<KeyCode>,
    shift_frame: Option<u64>,
    frame: u64,
) -> InputSnapshot {
    let shift = shift_frame.is_some_and(|last| frame.saturating_sub(last) <= HOLD_WINDOW);
    let mut input = InputSnapshot::empty()
        .with_held(Key::Up, any_held(key_frame, &UP_KEYS, frame))
        .with_held(Key::Down, any_held(key_frame, &DOWN_KEYS, frame))
        .with_held(Key::Left, any_held(key_frame, &LEFT_KEYS, frame))
        .with_held(Key::Right, any_held(key_frame, &RIGHT_KEYS, frame))
        .with_held(Key::Crouch, shift || any_held(key_frame, &CROUCH_KEYS, frame));
    if pressed.contains(&KeyCode::Char(' ')) {
        input = input.with_pressed(Key::Interact);
    }
    if pressed.contains(&KeyCode::Char('e')) || pressed.contains(&KeyCode::Char('E')) {
        input = input.with_pressed(Key::Use);
    }
    input
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_tracing() {
    let Some(path) = std::env::var_os(LOG_ENV_VAR) else {
        return;
    };
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("could not open log file {}: {err}", path.to_string_lossy());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .init();
}

fn load_config() -> GameConfig {
    match GameConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "falling back to default config");
            GameConfig::default()
        }
    }
}

// ── Screens ───────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn print_centered<W: Write>(
    out: &mut W,
    text: &str,
    row: u16,
    color: Color,
) -> std::io::Result<()> {
    let (width, _) = terminal::size()?;
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (_, height) = terminal::size()?;
    let cy = height / 2;

    print_centered(out, "☠  CANNON  CREW  ☠", cy.saturating_sub(6), Color::Cyan)?;
    print_centered(
        out,
        "Load the cannons with whatever ye can find. Sink 'em first.",
        cy.saturating_sub(4),
        Color::White,
    )?;

    let legend: &[(&str, Color)] = &[
        ("● Cannonball   Ψ Anchor (hits hard)   = Plank (patch a breach ✖)", Color::Grey),
        ("! Rum (fast, wobbly)   ◒ Lemon (keeps scurvy away)   v Parrot", Color::DarkGrey),
        ("Fire a cannon empty-handed and it fires YOU.", Color::DarkGrey),
    ];
    for (i, (line, color)) in legend.iter().enumerate() {
        print_centered(out, line, cy.saturating_sub(2) + i as u16, *color)?;
    }

    print_centered(out, "[ENTER] Set sail    [Q] Quit", cy + 3, Color::Yellow)?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

/// Win or lose screen. Returns `true` → quit program, `false` → back to menu.
fn show_outcome<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    change: SceneChange,
    teams: (&str, &str),
) -> std::io::Result<bool> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (_, height) = terminal::size()?;
    let cy = height / 2;

    let (ours, theirs) = teams;
    let (banner, message, color) = match change.scene {
        SceneId::Win => ("╔═ VICTORY ═╗", "you didded it", Color::Green),
        _ => {
            let scurvy = change.context.is_some_and(|context| context.scurvy);
            let message = if scurvy {
                "Arr! Ye perished of scurvy. (maybe eat more lemons next time..)"
            } else {
                "Yer crew was overpowered by the foes.."
            };
            ("╔═ DEFEAT ═╗", message, Color::Red)
        }
    };
    let matchup = match change.scene {
        SceneId::Win => format!("{ours} sent {theirs} to the bottom"),
        _ => format!("{theirs} got the better of {ours}"),
    };
    print_centered(out, banner, cy.saturating_sub(3), color)?;
    print_centered(out, &matchup, cy.saturating_sub(1), Color::Cyan)?;
    print_centered(out, message, cy, Color::White)?;
    print_centered(out, "M - Main Menu  Q - Quit", cy + 2, Color::DarkGrey)?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Enter => return Ok(false),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum RoundEnd {
    Quit,
    Finished(SceneChange),
}

/// Runs one round until the simulation asks for a scene change or the user
/// quits.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key, and a key counts as held while that
/// frame is within `HOLD_WINDOW`. Press events seen during the frame are
/// also collected separately and become the snapshot's edge-triggered keys.
fn game_loop<W: Write>(
    out: &mut W,
    manager: &mut GameManager,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<RoundEnd> {
    let mut rng = thread_rng();
    let mut cam = display::terminal_camera();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shift_frame: Option<u64> = None;
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut pressed: HashSet<KeyCode> = HashSet::new();
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            if modifiers.contains(KeyModifiers::SHIFT) && kind != KeyEventKind::Release {
                shift_frame = Some(frame);
            }
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    pressed.insert(code);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(RoundEnd::Quit);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(RoundEnd::Quit);
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

        let input = snapshot(&key_frame, &pressed, shift_frame, frame);
        let dt = last.elapsed().as_secs_f32().min(MAX_DT);
        last = Instant::now();
        manager.update(dt, &input, &mut rng);

        let mut finished = None;
        for event in manager.drain_events() {
            match event {
                GameEvent::PlaySound(sound) => debug!(sound = sound.name(), "sound"),
                GameEvent::ChangeScene(change) => finished = Some(change),
            }
        }

        display::render(out, manager, &mut cam)?;

        if let Some(change) = finished {
            return Ok(RoundEnd::Finished(change));
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_tracing();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break; // receiver dropped → program exiting
                    }
                }
                Err(_) => break,
            }
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let config = load_config();
    let ship_map = ShipMap::standard()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    let (_, height) = terminal::size()?;
    if height < display::playfield_rows() + 2 {
        warn!(height, needed = display::playfield_rows() + 2, "terminal is too short");
    }

    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let mut manager = GameManager::new(config.clone(), ship_map.clone(), &mut thread_rng());
                match game_loop(out, &mut manager, rx)? {
                    RoundEnd::Quit => break,
                    RoundEnd::Finished(change) => {
                        info!(scene = ?change.scene, "round over");
                        let teams =
                            (manager.team_name.as_str(), manager.enemy_team_name.as_str());
                        if show_outcome(out, rx, change, teams)? {
                            break;
                        }
                    }
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}

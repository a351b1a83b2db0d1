/// Rendering layer — all terminal I/O for a running round lives here.
///
/// The simulation queues sprites into a `Camera`; this module turns each
/// queued op into a coloured glyph and draws the HUD around it. No game
/// logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use cannon_crew::entities::ItemKind;
use cannon_crew::geometry::Vec2;
use cannon_crew::manager::GameManager;
use cannon_crew::render::{Camera, CannonLook, DrawOp, Sprite};
use cannon_crew::ship::{TileKind, PLAYFIELD};

/// World units covered by one terminal column.
pub const WORLD_PER_COL: f32 = 20.0;
/// World units covered by one terminal row.
pub const WORLD_PER_ROW: f32 = 40.0;
/// Rows reserved above the playfield for the HUD.
const HUD_ROWS: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_RAIL: Color = Color::DarkYellow;
const C_DECK: Color = Color::DarkGrey;
const C_PLAYER: Color = Color::White;
const C_CREW: Color = Color::Green;
const C_MARKER: Color = Color::Yellow;
const C_HIGHLIGHT: Color = Color::Yellow;
const C_BREACH: Color = Color::Red;
const C_HUD_OURS: Color = Color::Cyan;
const C_HUD_ENEMY: Color = Color::Red;
const C_HUD_STATUS: Color = Color::White;
const C_DRUNK: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Camera that maps the playfield onto terminal cells below the HUD.
pub fn terminal_camera() -> Camera {
    Camera::new(
        Vec2::new(0.0, -WORLD_PER_ROW * f32::from(HUD_ROWS)),
        Vec2::new(1.0 / WORLD_PER_COL, 1.0 / WORLD_PER_ROW),
    )
}

/// Terminal rows the playfield occupies, HUD included.
pub fn playfield_rows() -> u16 {
    HUD_ROWS + (PLAYFIELD.h / WORLD_PER_ROW).ceil() as u16
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame of a round.
pub fn render<W: Write>(
    out: &mut W,
    manager: &GameManager,
    cam: &mut Camera,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    manager.draw(cam);
    for op in cam.drain_sorted() {
        draw_op(out, &op, width, height)?;
    }

    draw_hud(out, manager, width)?;
    draw_status(out, manager, height)?;
    draw_controls_hint(out, height)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Sprites ───────────────────────────────────────────────────────────────────

fn glyph(op: &DrawOp) -> (&'static str, Color) {
    match op.sprite {
        Sprite::Tile(TileKind::Rail) => ("##", C_RAIL),
        Sprite::Tile(TileKind::Deck) => ("··", C_DECK),
        Sprite::Pirate { player, frame } => {
            // crouching frames are shorter than standing ones
            let crouched = frame.size.1 < 14;
            let airborne = op.rotation != 0.0;
            let colour = if player { C_PLAYER } else { C_CREW };
            let text = match (player, crouched, airborne) {
                (_, _, true) => "*",
                (true, false, _) => "@",
                (true, true, _) => "a",
                (false, false, _) => "P",
                (false, true, _) => "p",
            };
            (text, colour)
        }
        Sprite::Item(kind) => match kind {
            ItemKind::Cannonball => ("●", Color::Grey),
            ItemKind::Anchor => ("Ψ", Color::Cyan),
            ItemKind::Rum => ("!", Color::Magenta),
            ItemKind::Lemon => ("◒", Color::Yellow),
            ItemKind::Plank => ("=", Color::DarkYellow),
            ItemKind::Parrot => ("v", Color::Green),
        },
        Sprite::Cannon(look) => match look {
            CannonLook::Idle => ("╦╦", Color::Grey),
            CannonLook::Selectable => ("╦╦", C_HIGHLIGHT),
            CannonLook::Firing => ("╬╬", Color::Red),
        },
        Sprite::CooldownBar(fraction) => {
            if fraction > 0.5 {
                ("▮▮", Color::DarkRed)
            } else {
                ("▮▯", Color::DarkRed)
            }
        }
        Sprite::Barrel { ready, highlighted } => {
            let colour = if highlighted {
                C_HIGHLIGHT
            } else if ready {
                Color::DarkYellow
            } else {
                Color::DarkGrey
            };
            ("()", colour)
        }
        Sprite::DamageSpot { highlighted } => {
            ("✖", if highlighted { C_HIGHLIGHT } else { C_BREACH })
        }
        Sprite::PlayerMarker => ("▼", C_MARKER),
    }
}

/// Draw one queued sprite, centred on its screen position. Anything that
/// falls outside the terminal is skipped.
fn draw_op<W: Write>(out: &mut W, op: &DrawOp, width: u16, height: u16) -> std::io::Result<()> {
    let (text, colour) = glyph(op);
    let cells = text.chars().count() as f32;
    let col = (op.screen.x - cells / 2.0).round();
    let row = op.screen.y.floor();
    if col < 0.0 || row < f32::from(HUD_ROWS) || row >= f32::from(height.saturating_sub(2)) {
        return Ok(());
    }
    let (col, row) = (col as u16, row as u16);
    if col + cells as u16 > width {
        return Ok(());
    }
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn health_bar(current: f32, max: f32, cells: usize) -> String {
    let filled = if max > 0.0 {
        ((current / max).clamp(0.0, 1.0) * cells as f32).ceil() as usize
    } else {
        0
    };
    format!("[{}{}]", "█".repeat(filled), " ".repeat(cells - filled))
}

fn draw_hud<W: Write>(out: &mut W, manager: &GameManager, width: u16) -> std::io::Result<()> {
    let ours = format!(
        "{} {} {:>3.0}",
        manager.team_name,
        health_bar(manager.boat_health, manager.config.boat_health, 10),
        manager.boat_health
    );
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_OURS))?;
    out.queue(Print(&ours))?;

    let theirs = format!(
        "{:>3.0} {} {}",
        manager.enemy_health,
        health_bar(manager.enemy_health, manager.config.enemy_health, 10),
        manager.enemy_team_name
    );
    let rx = width.saturating_sub(theirs.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_ENEMY))?;
    out.queue(Print(&theirs))?;
    Ok(())
}

// ── Status line (second-to-last row) ──────────────────────────────────────────

fn draw_status<W: Write>(out: &mut W, manager: &GameManager, height: u16) -> std::io::Result<()> {
    let player = manager.player();
    let crew = manager.active_pirates.len().saturating_sub(1);
    let held = manager.held_item_name(manager.player_id()).unwrap_or("nothing");

    out.queue(cursor::MoveTo(1, height.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(C_HUD_STATUS))?;
    out.queue(Print(format!(
        "Crew: {crew}   Holding: {held:<14}   Scurvy in: {:>5.1}s",
        player.scurvy_time
    )))?;

    if player.is_drunk() {
        out.queue(style::SetForegroundColor(C_DRUNK))?;
        out.queue(Print(format!("   DRUNK {:>4.1}s", player.drunk_time)))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD/arrows : Move   C : Crouch   SPACE : Use/Pick up/Drop   E : Eat/Drink   Q : Quit",
    ))?;
    Ok(())
}

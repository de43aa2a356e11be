/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// world.  No game logic is performed; this module only translates world
/// units into terminal cells.  Entities still waiting on their sprite are
/// not drawn.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use space_invaders::entities::{
    GameStatus, Invader, InvaderProjectile, Player, Projectile, World,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_HUD_INVADERS: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_INVADER: Color = Color::Green;
const C_SHOT_PLAYER: Color = Color::Red;
const C_SHOT_INVADER: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Maps world units onto the terminal grid.
///
/// Row 0 is the HUD, row 1 and row `rows - 2` are the border, the last row
/// is the controls hint.  The playfield is everything inside the border.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub columns: u16,
    pub rows: u16,
    pub col_units: f32,
    pub row_units: f32,
}

impl Screen {
    /// Terminal cell for a world position, or `None` when it falls
    /// outside the playfield.
    fn cell(&self, at: Vec2) -> Option<(u16, u16)> {
        if !at.x.is_finite() || !at.y.is_finite() {
            return None;
        }
        let col = 1.0 + (at.x / self.col_units).floor();
        let row = 2.0 + (at.y / self.row_units).floor();
        if col < 1.0 || row < 2.0 {
            return None;
        }
        let (col, row) = (col as u16, row as u16);
        if col >= self.columns.saturating_sub(1) || row >= self.rows.saturating_sub(2) {
            return None;
        }
        Some((col, row))
    }

    /// Print `text` starting at a playfield cell, cut at the right border.
    fn put<W: Write>(&self, out: &mut W, col: u16, row: u16, text: &str) -> std::io::Result<()> {
        if row < 2 || row >= self.rows.saturating_sub(2) {
            return Ok(());
        }
        let room = self.columns.saturating_sub(1).saturating_sub(col) as usize;
        if col < 1 || room == 0 {
            return Ok(());
        }
        let clipped: String = text.chars().take(room).collect();
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(clipped))?;
        Ok(())
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, screen: &Screen, world: &World) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, screen)?;
    draw_hud(out, screen, world)?;

    for formation in &world.formations {
        for invader in &formation.invaders {
            draw_invader(out, screen, invader)?;
        }
    }
    for shot in &world.invader_projectiles {
        draw_invader_projectile(out, screen, shot)?;
    }
    for shot in &world.projectiles {
        draw_projectile(out, screen, shot)?;
    }

    draw_player(out, screen, &world.player)?;
    draw_controls_hint(out, screen)?;

    if world.status == GameStatus::GameOver {
        draw_game_over(out, screen, world)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, screen: &Screen) -> std::io::Result<()> {
    let w = screen.columns as usize;
    let h = screen.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(screen.columns.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, screen: &Screen, world: &World) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("Frame:{:>7}", world.elapsed)))?;

    let centre = format!("[ {} FORMATION(S) ]", world.formations.len());
    let cx = (screen.columns / 2).saturating_sub(centre.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(cx, 0))?;
    out.queue(Print(&centre))?;

    let right = format!(
        "Invaders:{:>4}  Shots:{:>3}",
        world.live_invaders(),
        world.projectiles.len() + world.invader_projectiles.len()
    );
    let rx = screen
        .columns
        .saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_INVADERS))?;
    out.queue(Print(&right))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, screen: &Screen, player: &Player) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols); the tip leans with the ship:
    //   ▲       ← row y
    //  /█\      ← row y+1
    let Some(placement) = player.asset.placement() else {
        return Ok(());
    };
    let Some((col, row)) = screen.cell(placement.position) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    let tip_col = if player.rotation < 0.0 {
        col
    } else if player.rotation > 0.0 {
        col + 2
    } else {
        col + 1
    };
    screen.put(out, tip_col, row, "▲")?;
    screen.put(out, col, row + 1, "/█\\")?;
    Ok(())
}

fn draw_invader<W: Write>(out: &mut W, screen: &Screen, invader: &Invader) -> std::io::Result<()> {
    let Some(placement) = invader.asset.placement() else {
        return Ok(());
    };
    if let Some((col, row)) = screen.cell(placement.position) {
        out.queue(style::SetForegroundColor(C_INVADER))?;
        screen.put(out, col, row, "<>")?;
    }
    Ok(())
}

fn draw_projectile<W: Write>(out: &mut W, screen: &Screen, shot: &Projectile) -> std::io::Result<()> {
    if let Some((col, row)) = screen.cell(shot.position) {
        out.queue(style::SetForegroundColor(C_SHOT_PLAYER))?;
        screen.put(out, col, row, "•")?;
    }
    Ok(())
}

fn draw_invader_projectile<W: Write>(
    out: &mut W,
    screen: &Screen,
    shot: &InvaderProjectile,
) -> std::io::Result<()> {
    if let Some((col, row)) = screen.cell(shot.position) {
        out.queue(style::SetForegroundColor(C_SHOT_INVADER))?;
        screen.put(out, col, row, "│")?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, screen: &Screen) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, screen.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, screen: &Screen, world: &World) -> std::io::Result<()> {
    let survived = format!("Survived {} frames", world.elapsed);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (&survived, Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = screen.columns / 2;
    let start_row = (screen.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}

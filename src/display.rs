//! Rendering layer. All terminal I/O lives here.
//!
//! A `Scene` is rasterised into an off-screen cell buffer (world layers
//! shifted by the camera offset, then the HUD on top), and the buffer is
//! written out row by row. No game logic happens here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{BattlePhase, Hsl, Vec2, MAX_HEALTH, WORLD_HEIGHT, WORLD_WIDTH};
use crate::scene::{Hud, Scene, Shape};

// ── Drawing surface ──────────────────────────────────────────────────────────

/// Smallest terminal the arena can be drawn on.
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 16;

/// Handle to a usable drawing area, in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub cols: u16,
    pub rows: u16,
}

impl Surface {
    /// `None` when the area is too small to draw the arena on.
    pub fn new(cols: u16, rows: u16) -> Option<Self> {
        (cols >= MIN_COLS && rows >= MIN_ROWS).then_some(Self { cols, rows })
    }

    /// Query the terminal. A failed query counts as no surface.
    pub fn probe() -> Option<Self> {
        let (cols, rows) = terminal::size().ok()?;
        Self::new(cols, rows)
    }

    /// Same surface, new dimensions. Never fails; the painter clips.
    pub fn resized(self, cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Host-side text the scene doesn't carry.
#[derive(Clone, Debug)]
pub struct Labels {
    pub player_name: String,
    pub enemy_name: String,
    pub show_controls: bool,
}

// ── Colour palette ───────────────────────────────────────────────────────────

type Rgb = (u8, u8, u8);

const C_PLAYER_BAR: Rgb = (56, 189, 248);
const C_ENEMY_BAR: Rgb = (168, 85, 247);
const C_BAR_EMPTY: Rgb = (30, 30, 40);
const C_TEXT: Rgb = (255, 255, 255);
const C_COMBO: Rgb = (250, 204, 21);
const C_VICTORY: Rgb = (250, 204, 21);
const C_DEFEAT: Rgb = (248, 113, 113);
const C_PANEL: Rgb = (10, 10, 16);
const C_HINT: Rgb = (120, 120, 130);
const C_MOTION: Rgb = (90, 110, 140);

// ── Cell buffer ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
    bold: bool,
}

struct Canvas {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    /// Camera offset in world units, applied to world-space shapes.
    shift: Vec2,
}

impl Canvas {
    fn new(surface: Surface) -> Self {
        let cols = surface.cols as usize;
        let rows = surface.rows as usize;
        let blank = Cell { ch: ' ', fg: C_TEXT, bg: (0, 0, 0), bold: false };
        Self { cols, rows, cells: vec![blank; cols * rows], shift: Vec2::default() }
    }

    fn cell_mut(&mut self, col: i64, row: i64) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        let idx = row as usize * self.cols + col as usize;
        self.cells.get_mut(idx)
    }

    /// World point to cell, after the camera shift.
    fn to_cell(&self, p: Vec2) -> (i64, i64) {
        let x = (p.x + self.shift.x) / WORLD_WIDTH * self.cols as f64;
        let y = (p.y + self.shift.y) / WORLD_HEIGHT * self.rows as f64;
        (x.floor() as i64, y.floor() as i64)
    }

    /// Centre of a cell in world space, before the camera shift.
    fn to_world(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (col as f64 + 0.5) / self.cols as f64 * WORLD_WIDTH - self.shift.x,
            (row as f64 + 0.5) / self.rows as f64 * WORLD_HEIGHT - self.shift.y,
        )
    }

    fn tint(&mut self, col: i64, row: i64, color: Rgb, alpha: f64) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.bg = blend(color, cell.bg, alpha);
            cell.ch = ' ';
        }
    }

    fn plot(&mut self, col: i64, row: i64, ch: char, color: Rgb, alpha: f64, bold: bool) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.fg = blend(color, cell.bg, alpha);
            cell.ch = ch;
            cell.bold = bold;
        }
    }

    fn text(&mut self, col: i64, row: i64, text: &str, color: Rgb, bold: bool) {
        for (i, ch) in text.chars().enumerate() {
            self.plot(col + i as i64, row, ch, color, 1.0, bold);
        }
    }

    fn text_centred(&mut self, row: i64, text: &str, color: Rgb, bold: bool) {
        let col = (self.cols as i64 - text.chars().count() as i64) / 2;
        self.text(col, row, text, color, bold);
    }
}

fn blend(fg: Rgb, bg: Rgb, alpha: f64) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f as f64 * a + b as f64 * (1.0 - a)).round() as u8;
    (mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

fn lerp(a: Hsl, b: Hsl, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = Hsl::new(a.h + (b.h - a.h) * t, a.s + (b.s - a.s) * t, a.l + (b.l - a.l) * t);
    mix.to_rgb()
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

// ── Public entry point ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    scene: &Scene,
    surface: Surface,
    labels: &Labels,
) -> std::io::Result<()> {
    let mut canvas = Canvas::new(surface);

    canvas.shift = scene.offset;
    for cmd in &scene.commands {
        draw_shape(&mut canvas, &cmd.shape);
    }
    canvas.shift = Vec2::default();

    if scene.hud.in_motion {
        draw_motion_tint(&mut canvas);
    }
    draw_hud(&mut canvas, &scene.hud, labels);
    if labels.show_controls {
        draw_controls_hint(&mut canvas);
    }
    match scene.hud.phase {
        BattlePhase::Victory | BattlePhase::Defeat => draw_end_panel(&mut canvas, &scene.hud, labels),
        _ => {}
    }

    flush(out, &canvas)
}

fn flush<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    for row in 0..canvas.rows {
        out.queue(cursor::MoveTo(0, row as u16))?;
        let mut last: Option<(Rgb, Rgb, bool)> = None;
        for cell in &canvas.cells[row * canvas.cols..(row + 1) * canvas.cols] {
            let look = (cell.fg, cell.bg, cell.bold);
            if last != Some(look) {
                out.queue(style::SetAttribute(if cell.bold {
                    Attribute::Bold
                } else {
                    Attribute::NormalIntensity
                }))?;
                out.queue(style::SetForegroundColor(rgb(cell.fg)))?;
                out.queue(style::SetBackgroundColor(rgb(cell.bg)))?;
                last = Some(look);
            }
            out.queue(Print(cell.ch))?;
        }
    }
    out.queue(style::SetAttribute(Attribute::Reset))?;
    out.queue(style::ResetColor)?;
    out.flush()
}

// ── World shapes ─────────────────────────────────────────────────────────────

fn draw_shape(canvas: &mut Canvas, shape: &Shape) {
    match shape {
        Shape::Sky { top, bottom } => {
            for row in 0..canvas.rows {
                let c = lerp(*top, *bottom, row as f64 / canvas.rows.max(1) as f64);
                for col in 0..canvas.cols {
                    canvas.tint(col as i64, row as i64, c, 1.0);
                }
            }
        }
        Shape::Island { centre, rx, ry, top, bottom } => {
            for row in 0..canvas.rows {
                for col in 0..canvas.cols {
                    let p = canvas.to_world(col, row);
                    let (dx, dy) = ((p.x - centre.x) / rx, (p.y - centre.y) / ry);
                    if dx * dx + dy * dy <= 1.0 {
                        let t = (p.y - (centre.y - ry)) / (2.0 * ry);
                        canvas.tint(col as i64, row as i64, lerp(*top, *bottom, t), 1.0);
                    }
                }
            }
        }
        Shape::Disc { centre, radius, color, alpha } => {
            let c = color.to_rgb();
            let (cc, cr) = canvas.to_cell(*centre);
            let reach_c = (radius / WORLD_WIDTH * canvas.cols as f64).ceil() as i64;
            let reach_r = (radius / WORLD_HEIGHT * canvas.rows as f64).ceil() as i64;
            for row in cr - reach_r..=cr + reach_r {
                for col in cc - reach_c..=cc + reach_c {
                    if col < 0 || row < 0 {
                        continue;
                    }
                    let p = canvas.to_world(col as usize, row as usize);
                    let (dx, dy) = (p.x - centre.x, p.y - centre.y);
                    if dx * dx + dy * dy <= radius * radius || (col, row) == (cc, cr) {
                        canvas.tint(col, row, c, *alpha);
                    }
                }
            }
        }
        Shape::Dot { at, glyph, color, alpha } => {
            let (col, row) = canvas.to_cell(*at);
            canvas.plot(col, row, *glyph, color.to_rgb(), *alpha, false);
        }
        Shape::Line { from, to, color, alpha } => {
            draw_line(canvas, *from, *to, color.to_rgb(), *alpha);
        }
        Shape::Text { at, text, color, alpha, bold, .. } => {
            let (col, row) = canvas.to_cell(*at);
            let start = col - text.chars().count() as i64 / 2;
            for (i, ch) in text.chars().enumerate() {
                canvas.plot(start + i as i64, row, ch, color.to_rgb(), *alpha, *bold);
            }
        }
    }
}

/// DDA walk from `from` to `to`, one glyph per cell, glyph by slope.
fn draw_line(canvas: &mut Canvas, from: Vec2, to: Vec2, color: Rgb, alpha: f64) {
    let (c0, r0) = canvas.to_cell(from);
    let (c1, r1) = canvas.to_cell(to);
    let (dc, dr) = (c1 - c0, r1 - r0);
    let glyph = match (dc, dr) {
        (0, _) => '|',
        (_, 0) => '─',
        (dc, dr) if (dc > 0) == (dr > 0) => '\\',
        _ => '/',
    };
    let steps = dc.abs().max(dr.abs()).max(1);
    for i in 0..=steps {
        let col = c0 + (dc as f64 * i as f64 / steps as f64).round() as i64;
        let row = r0 + (dr as f64 * i as f64 / steps as f64).round() as i64;
        canvas.plot(col, row, glyph, color, alpha, false);
    }
}

fn draw_motion_tint(canvas: &mut Canvas) {
    for cell in &mut canvas.cells {
        cell.bg = blend(C_MOTION, cell.bg, 0.08);
    }
}

// ── HUD ──────────────────────────────────────────────────────────────────────

const BAR_WIDTH: usize = 24;

fn health_bar(health: u32) -> (String, String) {
    let filled = (health.min(MAX_HEALTH) as usize * BAR_WIDTH + MAX_HEALTH as usize / 2)
        / MAX_HEALTH as usize;
    ("█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn draw_hud(canvas: &mut Canvas, hud: &Hud, labels: &Labels) {
    // Player, left
    canvas.text(2, 0, &labels.player_name, C_TEXT, true);
    let (full, empty) = health_bar(hud.player_health);
    canvas.text(2, 1, &full, C_PLAYER_BAR, false);
    canvas.text(2 + full.chars().count() as i64, 1, &empty, C_BAR_EMPTY, false);
    canvas.text(3 + BAR_WIDTH as i64, 1, &format!("{} / {}", hud.player_health, MAX_HEALTH), C_TEXT, false);

    // Enemy, right
    let right = canvas.cols as i64 - 2;
    let name_len = labels.enemy_name.chars().count() as i64;
    canvas.text(right - name_len, 0, &labels.enemy_name, C_TEXT, true);
    let (full, empty) = health_bar(hud.enemy_health);
    let bar_start = right - BAR_WIDTH as i64;
    canvas.text(bar_start, 1, &full, C_ENEMY_BAR, false);
    canvas.text(bar_start + full.chars().count() as i64, 1, &empty, C_BAR_EMPTY, false);
    let hp = format!("{} / {}", hud.enemy_health, MAX_HEALTH);
    canvas.text(bar_start - 1 - hp.len() as i64, 1, &hp, C_TEXT, false);

    if hud.combo_count > 0 {
        let mid = canvas.rows as i64 / 2;
        canvas.text_centred(mid, &format!("{}x COMBO!", hud.combo_count), C_COMBO, true);
    }

    if hud.prompt {
        let row = canvas.rows as i64 - 3;
        canvas.text_centred(row, "[ SPACE ]  Start Combo", C_TEXT, true);
    }
}

fn draw_controls_hint(canvas: &mut Canvas) {
    let row = canvas.rows as i64 - 1;
    canvas.text(1, row, "SPACE : Start combo   Q : Exit battle", C_HINT, false);
}

fn draw_end_panel(canvas: &mut Canvas, hud: &Hud, labels: &Labels) {
    let (title, line, color) = if hud.phase == BattlePhase::Victory {
        (
            "VICTORY!".to_string(),
            format!("{} has defeated the {}!", first_name(&labels.player_name), labels.enemy_name),
            C_VICTORY,
        )
    } else {
        (
            "DEFEAT".to_string(),
            format!("The {} was too powerful...", labels.enemy_name),
            C_DEFEAT,
        )
    };
    let footer = "ENTER : Return to menu";

    let width = line.chars().count().max(footer.len()) + 6;
    let height = 7;
    let left = (canvas.cols as i64 - width as i64) / 2;
    let top = (canvas.rows as i64 - height) / 2;
    for row in top..top + height {
        for col in left..left + width as i64 {
            canvas.tint(col, row, C_PANEL, 0.85);
        }
    }
    canvas.text_centred(top + 1, &title, color, true);
    canvas.text_centred(top + 3, &line, C_TEXT, false);
    canvas.text_centred(top + 5, footer, C_HINT, false);
}

fn first_name(full: &str) -> &str {
    full.split_whitespace().next().unwrap_or(full)
}

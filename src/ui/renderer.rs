/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Rasterize the camera's view of the world into an RGB pixel
///      grid: one pixel per terminal column, two per row (the upper
///      and lower halves of a '▀' cell)
///   2. Blit every visible sprite raster into the grid, painter's
///      order, with tint/scale overrides applied
///   3. Fold pixel pairs into colored cells, add HUD and overlays
///   4. Diff each cell against the previous frame and emit terminal
///      commands only for cells that changed, flushed once
///
/// One pixel is 8 world units on each axis, so the default 800x600
/// engine viewport fits a 100x40 terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::physics::{WORLD_H, WORLD_W};
use crate::domain::solid::SolidKind;
use crate::sim::world::{Phase, WorldState};
use crate::ui::sprites::{Raster, Rgb, SpriteBank, SpriteKind, SKY};

/// World units per pixel (and per terminal column).
const PX: f32 = 8.0;

/// Vertical layout: HUD line, message line, then the map.
const HUD_ROW: usize = 0;
const MSG_ROW: usize = 1;
const MAP_ROW: usize = 2;

/// Question blocks that already yielded their item render dimmed.
const SPENT_TINT: [u8; 3] = [0x88, 0x88, 0x88];

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Dark backdrop for everything outside the world box.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 16, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell, forcing a repaint.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = (self.width.saturating_sub(s.chars().count())) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Scene pixels, row-major, two rows per terminal row.
    pixels: Vec<Rgb>,
    px_w: usize,
    px_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            pixels: vec![],
            px_w: 0,
            px_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((100, 40));
        self.apply_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn apply_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
        let rows = h.saturating_sub(MAP_ROW);
        self.px_w = w;
        self.px_h = rows * 2;
        self.pixels = vec![SKY; self.px_w * self.px_h];
    }

    pub fn render(&mut self, world: &mut WorldState, sprites: &SpriteBank) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((100, 40));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.apply_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Viewport dimensions in world units feed the camera
        world.camera.view_w = self.px_w as f32 * PX;
        world.camera.view_h = self.px_h as f32 * PX;
        world.camera.follow(world.player.body.x, world.player.body.y, WORLD_W, WORLD_H);

        self.paint_scene(world, sprites);
        self.compose_cells();
        self.draw_hud(world);
        self.draw_overlay(world);
        self.flush_diff()
    }

    // ── Scene rasterization ──

    fn paint_scene(&mut self, world: &WorldState, sprites: &SpriteBank) {
        let cam_x = world.camera.x;
        let cam_y = world.camera.y;

        // Sky inside the world box, dark outside it
        for py in 0..self.px_h {
            let wy = cam_y + (py as f32 + 0.5) * PX;
            let row_color = if wy >= 0.0 && wy < WORLD_H { SKY } else { Rgb(16, 16, 28) };
            let base = py * self.px_w;
            for px in 0..self.px_w {
                let wx = cam_x + (px as f32 + 0.5) * PX;
                self.pixels[base + px] = if wx >= 0.0 && wx < WORLD_W { row_color } else { Rgb(16, 16, 28) };
            }
        }

        // Static geometry first
        for s in &world.solids {
            let kind = match s.kind {
                SolidKind::Ground => SpriteKind::Ground,
                SolidKind::Brick => SpriteKind::Brick,
                SolidKind::Question => SpriteKind::Question,
                SolidKind::Pipe => SpriteKind::Pipe,
            };
            let tint = if s.is_spent() { Some(SPENT_TINT) } else { None };
            self.blit(cam_x, cam_y, sprites.raster(kind), s.x, s.y, 1.0, tint);
        }

        // Actors, player last so it draws on top
        for c in &world.coins {
            if !c.alive { continue; }
            self.blit(cam_x, cam_y, sprites.raster(SpriteKind::Coin), c.body.x, c.body.y, 1.0, None);
        }
        for item in &world.items {
            if !item.alive { continue; }
            self.blit(cam_x, cam_y, sprites.raster(SpriteKind::Mushroom), item.body.x, item.body.y, 1.0, None);
        }
        for e in &world.enemies {
            if !e.alive { continue; }
            self.blit(cam_x, cam_y, sprites.raster(SpriteKind::Enemy), e.body.x, e.body.y, 1.0, None);
        }
        if world.player.alive {
            self.blit(
                cam_x, cam_y,
                sprites.raster(SpriteKind::Player),
                world.player.body.x, world.player.body.y,
                world.player.scale,
                world.player.tint,
            );
        }
    }

    /// Sample a sprite raster into the pixel grid. The raster is drawn
    /// centered on (cx, cy) at its native world size times `scale`,
    /// with an optional multiplicative tint.
    fn blit(
        &mut self,
        cam_x: f32,
        cam_y: f32,
        raster: &Raster,
        cx: f32,
        cy: f32,
        scale: f32,
        tint: Option<[u8; 3]>,
    ) {
        let draw_w = raster.w as f32 * scale;
        let draw_h = raster.h as f32 * scale;
        let left = cx - draw_w / 2.0;
        let top = cy - draw_h / 2.0;

        let px0 = (((left - cam_x) / PX).floor() as i64).max(0);
        let px1 = ((((left + draw_w) - cam_x) / PX).ceil() as i64).min(self.px_w as i64);
        let py0 = (((top - cam_y) / PX).floor() as i64).max(0);
        let py1 = ((((top + draw_h) - cam_y) / PX).ceil() as i64).min(self.px_h as i64);

        for py in py0..py1 {
            let wy = cam_y + (py as f32 + 0.5) * PX;
            let v = ((wy - top) / draw_h * raster.h as f32) as i64;
            if v < 0 || v >= raster.h as i64 { continue; }
            for px in px0..px1 {
                let wx = cam_x + (px as f32 + 0.5) * PX;
                let u = ((wx - left) / draw_w * raster.w as f32) as i64;
                if u < 0 || u >= raster.w as i64 { continue; }
                if let Some(color) = raster.get(u as usize, v as usize) {
                    let color = match tint {
                        Some([tr, tg, tb]) => Rgb(
                            ((color.0 as u16 * tr as u16) / 255) as u8,
                            ((color.1 as u16 * tg as u16) / 255) as u8,
                            ((color.2 as u16 * tb as u16) / 255) as u8,
                        ),
                        None => color,
                    };
                    self.pixels[py as usize * self.px_w + px as usize] = color;
                }
            }
        }
    }

    /// Fold pixel pairs into '▀' cells: fg = upper pixel, bg = lower.
    fn compose_cells(&mut self) {
        self.front.cells.fill(Cell::BLANK);
        let rows = self.term_h.saturating_sub(MAP_ROW);
        for row in 0..rows {
            for col in 0..self.px_w {
                let upper = self.pixels[(row * 2) * self.px_w + col];
                let lower = self.pixels[(row * 2 + 1) * self.px_w + col];
                self.front.set(col, MAP_ROW + row, Cell {
                    ch: '▀',
                    fg: Color::Rgb { r: upper.0, g: upper.1, b: upper.2 },
                    bg: Color::Rgb { r: lower.0, g: lower.1, b: lower.2 },
                });
            }
        }
    }

    // ── HUD & overlays ──

    fn draw_hud(&mut self, world: &WorldState) {
        let hud = format!(
            "SCORE: {:<8} LIVES: {}",
            world.session.score, world.session.lives,
        );
        self.front.put_str(1, HUD_ROW, &hud, Color::White, Cell::BASE_BG);

        let device = if world.pad_connected { "[gamepad]" } else { "[keyboard]" };
        let x = self.term_w.saturating_sub(device.len() + 1);
        self.front.put_str(x, HUD_ROW, device, Color::DarkGrey, Cell::BASE_BG);

        if !world.message.is_empty() {
            // Blink while paused so the freeze is obviously deliberate
            if !world.paused || world.anim_tick % 16 < 12 {
                self.front.put_centered(MSG_ROW, &world.message, Color::Yellow, Cell::BASE_BG);
            }
        }
    }

    fn draw_overlay(&mut self, world: &WorldState) {
        let mid = MAP_ROW + self.term_h.saturating_sub(MAP_ROW) / 2;
        match world.phase {
            Phase::GameOver => {
                self.front.put_centered(mid.saturating_sub(1), "  G A M E   O V E R  ", Color::White, Color::Black);
            }
            Phase::StageClear => {
                self.front.put_centered(mid.saturating_sub(1), "  S T A G E   C L E A R !  ", Color::Yellow, Color::Black);
                let score = format!("  SCORE: {}  ", world.session.score);
                self.front.put_centered(mid + 1, &score, Color::White, Color::Black);
            }
            Phase::Playing => {}
        }
    }

    // ── Diff & flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg: Option<Color> = None;
        let mut last_bg: Option<Color> = None;
        let mut last_pos: Option<(usize, usize)> = None;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let idx = y * self.front.width + x;
                let cell = self.front.cells[idx];
                if cell == self.back.cells[idx] { continue; }

                let contiguous = matches!(last_pos, Some((ly, lx)) if ly == y && lx + 1 == x);
                if !contiguous {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
                last_pos = Some((y, x));
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front.cells, &mut self.back.cells);
        Ok(())
    }
}

//! Terminal drawing surface and the info panel under it
//!
//! The garden draws in logical units; each terminal cell covers
//! `CELL_WIDTH` x `CELL_HEIGHT` of them. Drawing goes to an in-memory
//! `Canvas` and `present` writes the whole frame, panel included, in one
//! flush.

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use garden_core::{
    author_label, Bounds, ChatLog, Color, Error, GardenObserver, Plant, Point, SimulationState,
    Surface,
};
use std::io::{stdout, Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Logical units per terminal column
pub const CELL_WIDTH: f64 = 8.0;
/// Logical units per terminal row
pub const CELL_HEIGHT: f64 = 16.0;
/// Rows reserved below the garden for the info panel
pub const PANEL_ROWS: u16 = 7;
const CHAT_LINES: usize = 4;

/// Logical point at the centre of a terminal cell
pub fn cell_center(col: u16, row: u16) -> Point {
    Point::new(
        (col as f64 + 0.5) * CELL_WIDTH,
        (row as f64 + 0.5) * CELL_HEIGHT,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

/// A grid of cells addressed in logical units
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Option<Cell>>,
    scale: f64,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols as usize * rows as usize],
            scale: 1.0,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Erase all cells and reset the transform, resizing if needed
    pub fn reset(&mut self, cols: u16, rows: u16) {
        if cols != self.cols || rows != self.rows {
            *self = Self::new(cols, rows);
        } else {
            self.cells.iter_mut().for_each(|c| *c = None);
            self.scale = 1.0;
        }
    }

    pub fn scale_by(&mut self, factor: f64) {
        self.scale *= factor;
    }

    /// Cell under a logical point, after the current transform
    pub fn cell_at(&self, point: Point) -> Option<(u16, u16)> {
        let x = point.x * self.scale / CELL_WIDTH;
        let y = point.y * self.scale / CELL_HEIGHT;
        if x < 0.0 || y < 0.0 || x >= self.cols as f64 || y >= self.rows as f64 {
            return None;
        }
        Some((x as u16, y as u16))
    }

    pub fn get(&self, col: u16, row: u16) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    pub fn plot(&mut self, point: Point, glyph: char, color: Color) {
        if let Some((col, row)) = self.cell_at(point) {
            self.cells[row as usize * self.cols as usize + col as usize] = Some(Cell { glyph, color });
        }
    }

    fn plot_if_empty(&mut self, point: Point, glyph: char, color: Color) {
        if let Some((col, row)) = self.cell_at(point) {
            if self.get(col, row).is_none() {
                self.plot(point, glyph, color);
            }
        }
    }

    /// Trace a line with dots, half a cell apart
    pub fn line(&mut self, from: Point, to: Point, color: Color) {
        let steps = (from.distance(to) / (CELL_WIDTH / 2.0)).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let at = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self.plot_if_empty(at, '·', color);
        }
    }

    /// Rows of cells, top to bottom
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<Cell>]> {
        self.cells.chunks(self.cols.max(1) as usize)
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Cells cannot blend, so translucent links become a grey level
fn link_color(color: Color) -> Color {
    let level = (color.a * 4.0).clamp(0.0, 1.0);
    let shade = |c: u8| (40.0 + c as f64 * level * 0.8) as u8;
    Color::rgb(shade(color.r), shade(color.g), shade(color.b))
}

/// What the info panel shows
#[derive(Debug, Clone, Default)]
pub struct Panel {
    pub hovered: Option<Plant>,
    pub chat: Vec<String>,
    pub notice: Option<String>,
}

pub type SharedPanel = Arc<Mutex<Panel>>;

/// Lock the panel, recovering from a poisoned lock
pub fn lock_panel(panel: &SharedPanel) -> std::sync::MutexGuard<'_, Panel> {
    panel.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps the info panel in sync with the garden
pub struct PanelObserver {
    panel: SharedPanel,
}

impl PanelObserver {
    pub fn new(panel: SharedPanel) -> Self {
        Self { panel }
    }
}

impl GardenObserver for PanelObserver {
    fn on_hover(&mut self, plant: Option<&Plant>) {
        lock_panel(&self.panel).hovered = plant.cloned();
    }

    fn on_messages(&mut self, chat: &ChatLog, plants: &SimulationState) {
        let lines = chat
            .iter()
            .take(CHAT_LINES)
            .map(|m| {
                let label = author_label(m, plants.plant(&m.plant_id));
                format!("{} {}: {}", m.created_at.format("%H:%M"), label, m.content)
            })
            .collect();
        lock_panel(&self.panel).chat = lines;
    }

    fn on_notice(&mut self, error: &Error) {
        lock_panel(&self.panel).notice = Some(error.to_string());
    }
}

fn describe(plant: &Plant) -> String {
    format!(
        "{} | {} | Lv {} | owner {} | {}",
        plant.species,
        plant.rarity,
        plant.level,
        plant.owner_or_unknown(),
        plant.traits.join(", ")
    )
}

/// Garden surface backed by the terminal
pub struct TerminalSurface {
    canvas: Canvas,
    panel: SharedPanel,
    out: Stdout,
}

impl TerminalSurface {
    pub fn new(panel: SharedPanel) -> Self {
        Self {
            canvas: Canvas::default(),
            panel,
            out: stdout(),
        }
    }

    /// Terminal columns and garden rows, if there is room for a garden
    fn grid() -> Option<(u16, u16)> {
        let (cols, rows) = terminal::size().ok()?;
        let rows = rows.checked_sub(PANEL_ROWS)?;
        (cols > 0 && rows > 0).then_some((cols, rows))
    }

    fn write_panel(&mut self, width: usize) -> std::io::Result<()> {
        let panel = lock_panel(&self.panel).clone();
        let top = self.canvas.rows();
        let fit = |s: &str| s.chars().take(width).collect::<String>();

        queue!(
            self.out,
            MoveTo(0, top),
            Clear(ClearType::FromCursorDown),
            SetForegroundColor(TermColor::DarkGrey),
            Print("─".repeat(width)),
        )?;

        let hover = match &panel.hovered {
            Some(plant) => describe(plant),
            None => "Hover a plant to inspect it".to_string(),
        };
        queue!(
            self.out,
            MoveTo(0, top + 1),
            SetForegroundColor(TermColor::White),
            Print(fit(&hover)),
        )?;

        for (i, line) in panel.chat.iter().enumerate() {
            queue!(
                self.out,
                MoveTo(0, top + 2 + i as u16),
                SetForegroundColor(TermColor::Grey),
                Print(fit(line)),
            )?;
        }

        let footer = match &panel.notice {
            Some(notice) => format!("! {notice}"),
            None => "[s] sprout  [w] water hovered plant  [q/Esc] quit".to_string(),
        };
        queue!(
            self.out,
            MoveTo(0, top + 2 + CHAT_LINES as u16),
            SetForegroundColor(TermColor::DarkGrey),
            Print(fit(&footer)),
            ResetColor,
        )
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Option<Bounds> {
        let (cols, rows) = Self::grid()?;
        Some(Bounds::new(
            cols as f64 * CELL_WIDTH,
            rows as f64 * CELL_HEIGHT,
        ))
    }

    fn clear(&mut self) {
        let (cols, rows) = Self::grid().unwrap_or((0, 0));
        self.canvas.reset(cols, rows);
    }

    fn scale(&mut self, factor: f64) {
        self.canvas.scale_by(factor);
    }

    fn fill_circle(&mut self, center: Point, _radius: f64, color: Color) {
        self.canvas.plot(center, '●', color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, _width: f64, color: Color) {
        let solid = color.with_alpha(1.0);
        self.canvas
            .plot(Point::new(center.x - radius, center.y), '(', solid);
        self.canvas
            .plot(Point::new(center.x + radius, center.y), ')', solid);
    }

    fn line(&mut self, from: Point, to: Point, _width: f64, color: Color) {
        self.canvas.line(from, to, link_color(color));
    }

    fn present(&mut self) -> garden_core::Result<()> {
        let width = self.canvas.cols() as usize;
        for (row, cells) in self.canvas.rows_iter().enumerate() {
            queue!(self.out, MoveTo(0, row as u16))?;
            for cell in cells {
                match cell {
                    Some(cell) => queue!(
                        self.out,
                        SetForegroundColor(term_color(cell.color)),
                        Print(cell.glyph)
                    )?,
                    None => queue!(self.out, Print(' '))?,
                }
            }
        }
        self.write_panel(width)?;
        self.out.flush()?;
        Ok(())
    }
}

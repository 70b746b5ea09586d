// src/grid/mod.rs

//! The tiling grid: geometry, cells and the per-axis samplers used to
//! randomize them.
//!
//! A [`Grid`] is rebuilt wholesale whenever the font or the viewport changes.
//! Every rebuild gets a new generation number; other components refer to
//! cells only by `(generation, index)` and must treat a mismatch as stale.

pub mod layout;
pub mod randomizer;
pub mod sampler;

pub use layout::GridLayout;
pub use randomizer::CellContentRandomizer;
pub use sampler::{invert_warp, AxisSampler};

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::GridConfig;
use crate::font::{selectable_glyphs, FontCapability};
use crate::glyph::{CellContent, ContentChange};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// One tile of the grid. Holds no reference to its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Row-major position.
    pub index: usize,
    pub content: CellContent,
}

/// The grid of cells plus everything needed to refresh them.
#[derive(Debug, Clone)]
pub struct Grid {
    generation: u64,
    layout: GridLayout,
    cells: Vec<Cell>,
    samplers: Vec<AxisSampler>,
    glyphs: Vec<char>,
    features: Vec<String>,
    font_family: String,
    placeholder: char,
}

impl Grid {
    /// A grid with no cells, used before any font is loaded.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            layout: GridLayout {
                cols: 0,
                rows: 0,
                cell_width: 0.0,
                cell_height: 0.0,
                container_width: 0.0,
                container_height: 0.0,
            },
            cells: Vec::new(),
            samplers: Vec::new(),
            glyphs: Vec::new(),
            features: Vec::new(),
            font_family: String::new(),
            placeholder: GridConfig::default().placeholder_glyph,
        }
    }

    /// Builds a new grid for the given viewport and font.
    ///
    /// Geometry depends only on the viewport, `zoom_out_scale`, the font's
    /// vertical metrics and `config`; cell content is drawn from `rng`.
    pub fn populate<R: Rng + ?Sized>(
        viewport_width: f64,
        viewport_height: f64,
        zoom_out_scale: f64,
        font: &dyn FontCapability,
        config: &GridConfig,
        rng: &mut R,
    ) -> Self {
        let layout = GridLayout::compute(
            viewport_width,
            viewport_height,
            zoom_out_scale,
            font.metrics(),
            config,
        );

        let samplers: Vec<AxisSampler> = font
            .axes()
            .iter()
            .map(|axis| AxisSampler::new(axis, font.warp_map(&axis.tag)))
            .collect();
        let glyphs = selectable_glyphs(font.glyphs(), config.placeholder_glyph);

        let mut grid = Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            layout,
            cells: Vec::with_capacity(layout.cell_count()),
            samplers,
            glyphs,
            features: font.features().to_vec(),
            font_family: font.family().to_string(),
            placeholder: config.placeholder_glyph,
        };

        for index in 0..layout.cell_count() {
            let content = grid.randomizer().randomize(rng);
            grid.cells.push(Cell { index, content });
        }

        log::info!(
            "Grid generation {} populated: {}x{} cells, {} glyphs, {} axes, {} features",
            grid.generation,
            layout.cols,
            layout.rows,
            grid.glyphs.len(),
            grid.samplers.len(),
            grid.features.len()
        );
        grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn samplers(&self) -> &[AxisSampler] {
        &self.samplers
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// A uniformly chosen cell index, `None` for an empty grid.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.cells.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.cells.len()))
        }
    }

    /// Index of the cell under the viewport centre, `None` for an empty grid.
    pub fn center_cell(&self) -> Option<usize> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.layout.center_index())
        }
    }

    /// Offset of a cell's centre from the grid centre.
    pub fn cell_offset(&self, index: usize) -> Option<(f64, f64)> {
        self.cell(index).map(|_| self.layout.cell_offset(index))
    }

    /// Gives one cell new random content.
    ///
    /// Returns the new content and what changed, or `None` if the index is
    /// out of range.
    pub fn refresh_cell<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Option<(&CellContent, ContentChange)> {
        if index >= self.cells.len() {
            return None;
        }
        let next = self.randomizer().randomize(rng);
        let cell = &mut self.cells[index];
        let changed = cell.content.replace(next);
        Some((&cell.content, changed))
    }

    fn randomizer(&self) -> CellContentRandomizer<'_> {
        CellContentRandomizer {
            glyphs: &self.glyphs,
            samplers: &self.samplers,
            features: &self.features,
            placeholder: self.placeholder,
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests;

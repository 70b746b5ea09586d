//! Headless surface implementation.
//!
//! Keeps the last applied transform and the content of every cell in memory
//! and records what it was asked to do, so tests and the CLI can inspect it.

use crate::animation::transform::{Transform, Transition};
use crate::display::Surface;
use crate::glyph::{CellContent, ContentChange};
use crate::grid::GridLayout;
use log::{info, trace};

/// Recorded transforms and cell updates kept per history; older entries
/// are dropped in halves once it is exceeded.
pub const HISTORY_LIMIT: usize = 4096;

fn record<T>(history: &mut Vec<T>, entry: T) {
    if history.len() >= HISTORY_LIMIT {
        history.drain(..HISTORY_LIMIT / 2);
    }
    history.push(entry);
}

/// One `apply_transform` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedTransform {
    pub transform: Transform,
    pub transition: Transition,
}

pub struct HeadlessSurface {
    width: f64,
    height: f64,
    /// Sizes returned by upcoming `viewport_size` reads before `width`/`height`.
    pending_reads: Vec<(f64, f64)>,
    font_family: String,
    cols: usize,
    cells: Vec<Option<CellContent>>,
    transforms: Vec<AppliedTransform>,
    cell_updates: Vec<(usize, ContentChange)>,
    total_cell_updates: u64,
    rebuilds: usize,
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pending_reads: Vec::new(),
            font_family: String::new(),
            cols: 0,
            cells: Vec::new(),
            transforms: Vec::new(),
            cell_updates: Vec::new(),
            total_cell_updates: 0,
            rebuilds: 0,
        }
    }

    /// Changes the size reported by `viewport_size`.
    pub fn resize(&mut self, width: f64, height: f64) {
        info!("HeadlessSurface: resize to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    /// Queues sizes for upcoming reads, simulating a host whose layout is
    /// still in flux. Each read consumes one entry.
    pub fn queue_size_reads(&mut self, reads: impl IntoIterator<Item = (f64, f64)>) {
        self.pending_reads.extend(reads);
    }

    /// Takes one queued size read, if any. `viewport_size` is `&self`, so
    /// the owner calls this once per render pass.
    pub fn next_render_pass(&mut self) {
        if !self.pending_reads.is_empty() {
            let (w, h) = self.pending_reads.remove(0);
            self.width = w;
            self.height = h;
        }
    }

    pub fn current_transform(&self) -> Option<&AppliedTransform> {
        self.transforms.last()
    }

    /// Transforms applied since the last rebuild, oldest first, at most
    /// [`HISTORY_LIMIT`].
    pub fn transforms(&self) -> &[AppliedTransform] {
        &self.transforms
    }

    /// Cell updates since the last rebuild, at most [`HISTORY_LIMIT`].
    pub fn cell_updates(&self) -> &[(usize, ContentChange)] {
        &self.cell_updates
    }

    /// Every cell update ever applied, across rebuilds.
    pub fn total_cell_updates(&self) -> u64 {
        self.total_cell_updates
    }

    pub fn cell(&self, index: usize) -> Option<&CellContent> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Glyphs of the `radius` rows and columns around the centre cell, one
    /// line per row.
    pub fn render_center(&self, radius: usize) -> String {
        if self.cols == 0 || self.cells.is_empty() {
            return String::new();
        }
        let rows = self.cells.len() / self.cols;
        let (center_row, center_col) = (rows / 2, self.cols / 2);
        let row_range = center_row.saturating_sub(radius)..(center_row + radius + 1).min(rows);
        let col_range = center_col.saturating_sub(radius)..(center_col + radius + 1).min(self.cols);

        let mut out = String::new();
        for row in row_range {
            let line: Vec<String> = col_range
                .clone()
                .map(|col| {
                    self.cell(row * self.cols + col)
                        .map_or_else(|| "·".to_string(), |c| c.glyph.to_string())
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }
}

impl Surface for HeadlessSurface {
    fn viewport_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn apply_transform(&mut self, transform: &Transform, transition: Transition) {
        trace!(
            "HeadlessSurface: transform {} over {}ms ({})",
            transform,
            transition.duration_ms,
            transition.easing.css_name()
        );
        record(
            &mut self.transforms,
            AppliedTransform {
                transform: *transform,
                transition,
            },
        );
    }

    fn rebuild_cells(&mut self, layout: &GridLayout, font_family: &str) {
        info!(
            "HeadlessSurface: rebuilding {} cells ({}x{}) in '{}'",
            layout.cell_count(),
            layout.cols,
            layout.rows,
            font_family
        );
        self.cols = layout.cols;
        self.cells = vec![None; layout.cell_count()];
        self.font_family = font_family.to_string();
        self.transforms.clear();
        self.cell_updates.clear();
        self.rebuilds += 1;
    }

    fn update_cell(&mut self, index: usize, content: &CellContent, changed: ContentChange) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = Some(content.clone());
            record(&mut self.cell_updates, (index, changed));
            self.total_cell_updates += 1;
        } else {
            trace!("HeadlessSurface: update for unknown cell {} ignored", index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn layout() -> GridLayout {
        GridLayout::compute(800.0, 600.0, 0.19, None, &GridConfig::default())
    }

    #[test]
    fn rebuild_forgets_history() {
        let mut surface = HeadlessSurface::new(800.0, 600.0);
        surface.rebuild_cells(&layout(), "A");
        surface.apply_transform(&Transform::IDENTITY, Transition::INSTANT);
        surface.update_cell(0, &CellContent::blank('x'), ContentChange::all());

        surface.rebuild_cells(&layout(), "B");
        assert!(surface.transforms().is_empty());
        assert!(surface.cell_updates().is_empty());
        assert_eq!(surface.total_cell_updates(), 1);
        assert_eq!(surface.font_family(), "B");
    }

    #[test]
    fn history_is_bounded() {
        let mut surface = HeadlessSurface::new(800.0, 600.0);
        surface.rebuild_cells(&layout(), "A");
        for i in 0..3 * HISTORY_LIMIT {
            let transform = Transform::overview(i as f64);
            surface.apply_transform(&transform, Transition::INSTANT);
            surface.update_cell(0, &CellContent::blank('x'), ContentChange::GLYPH);
        }
        assert!(surface.transforms().len() <= HISTORY_LIMIT);
        assert!(surface.cell_updates().len() <= HISTORY_LIMIT);
        assert_eq!(surface.total_cell_updates(), 3 * HISTORY_LIMIT as u64);
        let last = surface.current_transform().unwrap();
        assert_eq!(last.transform.scale, (3 * HISTORY_LIMIT - 1) as f64);
    }

    #[test]
    fn queued_reads_are_consumed_in_order() {
        let mut surface = HeadlessSurface::new(800.0, 600.0);
        surface.queue_size_reads([(10.0, 20.0), (30.0, 40.0)]);
        surface.next_render_pass();
        assert_eq!(surface.viewport_size(), (10.0, 20.0));
        surface.next_render_pass();
        surface.next_render_pass();
        assert_eq!(surface.viewport_size(), (30.0, 40.0));
    }
}

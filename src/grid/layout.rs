// src/grid/layout.rs
//
// Grid Layout - geometry of the tiling grid.
//
// Single source of truth for "how many cells, how big, and where is cell N
// relative to the viewport centre?".

use crate::config::GridConfig;
use crate::font::VerticalMetrics;

/// Geometry of the tiling grid.
///
/// Column and row counts are always odd so the viewport centre falls on the
/// centre of a cell, and stay within the configured minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Number of columns in the grid
    pub cols: usize,

    /// Number of rows in the grid
    pub rows: usize,

    /// Width of a single cell in viewport units
    pub cell_width: f64,

    /// Height of a single cell in viewport units
    pub cell_height: f64,

    /// `cols * cell_width`
    pub container_width: f64,

    /// `rows * cell_height`
    pub container_height: f64,
}

impl GridLayout {
    /// Computes the layout for a viewport.
    ///
    /// Enough cells are laid out that the grid still covers the viewport
    /// (times `coverage_factor`) when scaled down to `zoom_out_scale`.
    /// Degenerate viewport dimensions are clamped to 1.
    pub fn compute(
        viewport_width: f64,
        viewport_height: f64,
        zoom_out_scale: f64,
        metrics: Option<&VerticalMetrics>,
        config: &GridConfig,
    ) -> Self {
        let viewport_width = clamp_dimension(viewport_width);
        let viewport_height = clamp_dimension(viewport_height);
        let zoom_out_scale = if zoom_out_scale.is_finite() && zoom_out_scale > 0.0 {
            zoom_out_scale
        } else {
            1.0
        };

        let aspect_ratio = VerticalMetrics::aspect_ratio(metrics);
        let cell_width = viewport_width * config.cell_width_factor;
        let cell_height = cell_width * aspect_ratio;

        let col_fit_factor = config.cell_width_factor;
        let row_fit_factor = cell_height / viewport_height;

        let cols = required_count(
            config.coverage_factor,
            zoom_out_scale,
            col_fit_factor,
            config.min_cols,
            config.max_cols,
        );
        let rows = required_count(
            config.coverage_factor,
            zoom_out_scale,
            row_fit_factor,
            config.min_rows,
            config.max_rows,
        );

        log::debug!(
            "GridLayout: viewport {}x{}, zoom-out {}, aspect {:.3} -> {}x{} cells of {:.1}x{:.1}",
            viewport_width,
            viewport_height,
            zoom_out_scale,
            aspect_ratio,
            cols,
            rows,
            cell_width,
            cell_height
        );

        Self {
            cols,
            rows,
            cell_width,
            cell_height,
            container_width: cols as f64 * cell_width,
            container_height: rows as f64 * cell_height,
        }
    }

    /// Total number of cells, `cols * rows`. Zero if the product overflows.
    pub fn cell_count(&self) -> usize {
        self.cols.checked_mul(self.rows).unwrap_or(0)
    }

    /// Index of the cell under the container centre.
    pub fn center_index(&self) -> usize {
        (self.rows / 2) * self.cols + self.cols / 2
    }

    /// `(row, col)` of a row-major index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        let cols = self.cols.max(1);
        (index / cols, index % cols)
    }

    /// Offset of a cell's centre from the container centre.
    pub fn cell_offset(&self, index: usize) -> (f64, f64) {
        let (row, col) = self.position(index);
        let x = (col as f64 + 0.5) * self.cell_width - self.container_width / 2.0;
        let y = (row as f64 + 0.5) * self.cell_height - self.container_height / 2.0;
        (x, y)
    }
}

/// `ceil(coverage / (zoom_out_scale * fit_factor))`, clamped to
/// `[minimum, maximum]` and made odd. The minimum wins over the maximum, and
/// an odd value above the maximum only when both bounds are the same even
/// number.
pub fn required_count(coverage: f64, zoom_out_scale: f64, fit_factor: f64, minimum: usize, maximum: usize) -> usize {
    let floor = minimum.max(1);
    let ceiling = maximum.max(floor);

    let raw = coverage / (zoom_out_scale * fit_factor);
    let required = if raw.is_finite() && raw > 0.0 {
        if raw > ceiling as f64 {
            log::warn!(
                "GridLayout: {:.0} cells needed along an axis, clamped to {}",
                raw.ceil(),
                ceiling
            );
        }
        raw.ceil().min(ceiling as f64) as usize
    } else if raw.is_infinite() {
        log::warn!("GridLayout: unbounded cell count requested, clamped to {}", ceiling);
        ceiling
    } else {
        0
    };

    let count = required.clamp(floor, ceiling);
    if count % 2 == 1 {
        count
    } else if count < ceiling || count - 1 < floor {
        count + 1
    } else {
        count - 1
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig {
            min_cols: 13,
            min_rows: 13,
            max_cols: 255,
            max_rows: 255,
            coverage_factor: 1.06,
            cell_width_factor: 0.5,
            zoom_out_scale: 0.19,
            placeholder_glyph: '?',
        }
    }

    #[test]
    fn required_count_clamps_then_forces_odd() {
        // ceil(1.06 / 0.095) = 12, clamped to 13, already odd.
        assert_eq!(required_count(1.06, 0.19, 0.5, 13, 255), 13);
        // ceil(1.06 / 0.05) = 22 -> 23.
        assert_eq!(required_count(1.06, 0.1, 0.5, 13, 255), 23);
        // Even minimum is bumped too.
        assert_eq!(required_count(1.0, 1.0, 1.0, 4, 255), 5);
    }

    #[test]
    fn required_count_respects_the_maximum() {
        assert_eq!(required_count(1.06, 1e-9, 0.5, 13, 255), 255);
        // An even maximum steps down to stay odd.
        assert_eq!(required_count(1.06, 1e-9, 0.5, 13, 100), 99);
        // A maximum below the minimum is ignored.
        assert_eq!(required_count(1.06, 1e-9, 0.5, 13, 5), 13);
        // Equal even bounds: odd beats the maximum.
        assert_eq!(required_count(1.06, 1e-9, 0.5, 4, 4), 5);
    }

    #[test]
    fn required_count_survives_degenerate_inputs() {
        // Division by zero is an unbounded request.
        assert_eq!(required_count(1.06, 0.0, 0.5, 3, 51), 51);
        assert_eq!(required_count(f64::NAN, 0.19, 0.5, 0, 51), 1);
        assert_eq!(required_count(-1.0, 0.19, 0.5, 7, 51), 7);
    }

    #[test]
    fn tiny_zoom_out_scale_stays_bounded() {
        let layout = GridLayout::compute(1920.0, 1080.0, 1e-9, None, &config());
        assert_eq!(layout.cols, 255);
        assert_eq!(layout.rows, 255);
        assert_eq!(layout.cell_count(), 255 * 255);
        assert!((layout.container_width - 255.0 * layout.cell_width).abs() < 1e-6);
    }

    #[test]
    fn overflowing_cell_count_is_empty() {
        let layout = GridLayout {
            cols: usize::MAX,
            rows: 3,
            cell_width: 1.0,
            cell_height: 1.0,
            container_width: 0.0,
            container_height: 0.0,
        };
        assert_eq!(layout.cell_count(), 0);
    }

    #[test]
    fn compute_matches_container_invariants() {
        for &(w, h) in &[(1920.0, 1080.0), (800.0, 1200.0), (333.0, 77.0), (0.0, 0.0)] {
            let layout = GridLayout::compute(w, h, 0.19, None, &config());
            assert_eq!(layout.cols % 2, 1);
            assert_eq!(layout.rows % 2, 1);
            assert!(layout.cols >= 13 && layout.rows >= 13);
            assert!((layout.container_width - layout.cols as f64 * layout.cell_width).abs() < 1e-9);
            assert!((layout.container_height - layout.rows as f64 * layout.cell_height).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_viewport_is_clamped() {
        let layout = GridLayout::compute(0.0, 0.0, 0.19, None, &config());
        assert_eq!(layout.cell_width, 0.5);
        assert_eq!(layout.cell_height, 0.5);
        assert!(layout.cell_count() > 0);
    }

    #[test]
    fn cell_height_follows_metrics() {
        let metrics = VerticalMetrics {
            ascender: 1000.0,
            descender: -500.0,
            units_per_em: 1000.0,
        };
        let layout = GridLayout::compute(1000.0, 1000.0, 0.19, Some(&metrics), &config());
        assert_eq!(layout.cell_width, 500.0);
        assert_eq!(layout.cell_height, 750.0);
    }

    #[test]
    fn center_cell_has_zero_offset() {
        let layout = GridLayout::compute(1920.0, 1080.0, 0.19, None, &config());
        let (x, y) = layout.cell_offset(layout.center_index());
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);

        let (x0, y0) = layout.cell_offset(0);
        assert!((x0 + (layout.cols / 2) as f64 * layout.cell_width).abs() < 1e-9);
        assert!((y0 + (layout.rows / 2) as f64 * layout.cell_height).abs() < 1e-9);
    }

    #[test]
    fn position_is_row_major() {
        let layout = GridLayout::compute(1920.0, 1080.0, 0.19, None, &config());
        assert_eq!(layout.position(0), (0, 0));
        assert_eq!(layout.position(layout.cols - 1), (0, layout.cols - 1));
        assert_eq!(layout.position(layout.cols), (1, 0));
    }
}

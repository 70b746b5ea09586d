// src/grid/tests.rs

use super::*;
use crate::font::{Axis, FontInfo, WarpPair};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn grid_config() -> GridConfig {
    GridConfig::default()
}

fn populate(font: &FontInfo, w: f64, h: f64, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    Grid::populate(w, h, 0.19, font, &grid_config(), &mut rng)
}

#[test_log::test]
fn populate_upholds_grid_invariants() {
    let font = FontInfo::demo();
    let sizes = [(1920.0, 1080.0), (1280.0, 720.0), (390.0, 844.0), (2560.0, 400.0), (0.0, 0.0)];
    for (i, &(w, h)) in sizes.iter().enumerate() {
        let grid = populate(&font, w, h, i as u64);
        let layout = grid.layout();
        assert_eq!(layout.cols % 2, 1, "cols for {}x{}", w, h);
        assert_eq!(layout.rows % 2, 1, "rows for {}x{}", w, h);
        assert!(layout.cols >= grid_config().min_cols);
        assert!(layout.rows >= grid_config().min_rows);
        assert_eq!(grid.cell_count(), layout.cols * layout.rows);
        assert!((layout.container_width - layout.cols as f64 * layout.cell_width).abs() < 1e-9);
        for (index, cell) in grid.cells().iter().enumerate() {
            assert_eq!(cell.index, index);
        }
    }
}

#[test]
fn documented_column_example() {
    // ceil(1.06 / (0.19 * 0.5)) = 12, clamped to 13, odd already.
    let grid = populate(&FontInfo::demo(), 1920.0, 1080.0, 0);
    assert_eq!(grid.layout().cols, 13);
}

#[test]
fn tiny_zoom_out_scale_builds_a_bounded_grid() {
    let config = GridConfig {
        max_cols: 21,
        max_rows: 31,
        ..GridConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(11);
    let grid = Grid::populate(1920.0, 1080.0, 1e-9, &FontInfo::demo(), &config, &mut rng);
    assert_eq!(grid.layout().cols, 21);
    assert_eq!(grid.layout().rows, 31);
    assert_eq!(grid.cell_count(), 21 * 31);
}

#[test]
fn geometry_is_independent_of_rng() {
    let font = FontInfo::demo();
    let a = populate(&font, 1440.0, 900.0, 1);
    let b = populate(&font, 1440.0, 900.0, 2);
    assert_eq!(a.layout(), b.layout());
    assert_ne!(a.generation(), b.generation());
}

#[test]
fn one_sampler_per_axis() {
    let font = FontInfo::demo();
    let grid = populate(&font, 1920.0, 1080.0, 3);
    assert_eq!(grid.samplers().len(), font.axes.len());
    for (sampler, axis) in grid.samplers().iter().zip(&font.axes) {
        assert_eq!(sampler.tag(), axis.tag);
    }
    // Only wght carries a warp map in the demo font.
    assert!(grid.samplers()[0].has_non_linear_warp());
    assert!(!grid.samplers()[1].has_non_linear_warp());
}

#[test]
fn empty_font_gets_placeholder_cells() {
    let font = FontInfo {
        family: "Empty".to_string(),
        glyphs: vec![' ', '\u{200B}'],
        ..FontInfo::default()
    };
    let grid = populate(&font, 800.0, 600.0, 4);
    assert_eq!(grid.glyphs(), &['?']);
    assert!(grid.cell_count() > 0);
    assert!(grid.cells().iter().all(|c| c.content.glyph == '?'));
}

#[test]
fn center_cell_lies_on_origin() {
    let grid = populate(&FontInfo::demo(), 1920.0, 1080.0, 5);
    let center = grid.center_cell().unwrap();
    let (row, col) = grid.layout().position(center);
    assert_eq!(row, grid.layout().rows / 2);
    assert_eq!(col, grid.layout().cols / 2);
    assert_eq!(grid.cell_offset(center), Some((0.0, 0.0)));
}

#[test]
fn empty_grid_queries() {
    let grid = Grid::empty();
    let mut rng = StdRng::seed_from_u64(6);
    assert_eq!(grid.cell_count(), 0);
    assert_eq!(grid.random_cell(&mut rng), None);
    assert_eq!(grid.center_cell(), None);
    assert_eq!(grid.cell_offset(0), None);
}

#[test]
fn random_cell_stays_in_range() {
    let grid = populate(&FontInfo::demo(), 1024.0, 768.0, 7);
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..500 {
        let index = grid.random_cell(&mut rng).unwrap();
        assert!(index < grid.cell_count());
    }
}

#[test]
fn refresh_cell_rewrites_one_cell() {
    let font = FontInfo {
        family: "Mono".to_string(),
        glyphs: ('a'..='z').collect(),
        axes: vec![Axis::new("wght", 100.0, 400.0, 900.0)],
        warp_maps: [(
            "wght".to_string(),
            vec![WarpPair::new(-1.0, -1.0), WarpPair::new(0.0, 0.3), WarpPair::new(1.0, 1.0)],
        )]
        .into_iter()
        .collect(),
        features: vec!["liga".to_string()],
        metrics: None,
    };
    let mut grid = populate(&font, 1000.0, 1000.0, 9);
    let before: Vec<Cell> = grid.cells().to_vec();
    let mut rng = StdRng::seed_from_u64(10);

    let (content, _changed) = grid.refresh_cell(4, &mut rng).unwrap();
    assert!(content.axis_settings.starts_with("\"wght\" "));

    for (index, (old, new)) in before.iter().zip(grid.cells()).enumerate() {
        if index != 4 {
            assert_eq!(old, new);
        }
    }
    assert!(grid.refresh_cell(grid.cell_count(), &mut rng).is_none());
}

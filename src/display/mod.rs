// src/display/mod.rs
//! The hosting surface the grid is drawn on.
//!
//! - Surface: what the viewer needs from its host (viewport size, a pannable
//!   container with an animatable transform, styleable cells)
//! - HeadlessSurface: in-memory recording implementation

pub mod headless;

pub use headless::HeadlessSurface;

use crate::animation::transform::{Transform, Transition};
use crate::glyph::{CellContent, ContentChange};
use crate::grid::GridLayout;

/// Minimal interface to the host that displays the grid.
///
/// Implementations apply what they are told; all timing and geometry
/// decisions are made by the caller.
pub trait Surface {
    /// Current viewport size. May change between calls while the host is
    /// still settling a resize.
    fn viewport_size(&self) -> (f64, f64);

    /// Moves the pannable container to `transform` using `transition`.
    fn apply_transform(&mut self, transform: &Transform, transition: Transition);

    /// Discards all cells and creates `layout.cell_count()` new ones.
    fn rebuild_cells(&mut self, layout: &GridLayout, font_family: &str);

    /// Restyles one cell. `changed` names the properties that differ from
    /// the previous content.
    fn update_cell(&mut self, index: usize, content: &CellContent, changed: ContentChange);
}

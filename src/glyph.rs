// src/glyph.rs

//! Defines [`CellContent`], what one grid cell currently shows, and the
//! [`ContentChange`] flags describing which parts of it were replaced.

use bitflags::bitflags;
use std::fmt;

/// Value of `font-variation-settings` / `font-feature-settings` when there is
/// nothing to set.
pub const NORMAL_SETTINGS: &str = "normal";

/// The displayed state of a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContent {
    /// The character shown in the cell.
    pub glyph: char,
    /// Axis settings in `font-variation-settings` form, e.g. `"wght" 512.3`.
    pub axis_settings: String,
    /// Feature settings in `font-feature-settings` form, e.g. `"liga" 1`.
    pub feature_settings: String,
}

impl CellContent {
    /// Content of a freshly created cell, before randomization.
    pub fn blank(glyph: char) -> Self {
        Self {
            glyph,
            axis_settings: NORMAL_SETTINGS.to_string(),
            feature_settings: NORMAL_SETTINGS.to_string(),
        }
    }

    /// Replaces `self` with `next` and reports which parts differ.
    pub fn replace(&mut self, next: CellContent) -> ContentChange {
        let mut changed = ContentChange::empty();
        if self.glyph != next.glyph {
            changed |= ContentChange::GLYPH;
        }
        if self.axis_settings != next.axis_settings {
            changed |= ContentChange::AXES;
        }
        if self.feature_settings != next.feature_settings {
            changed |= ContentChange::FEATURES;
        }
        *self = next;
        changed
    }
}

bitflags! {
    /// Which parts of a cell's content changed in one refresh.
    ///
    /// Surfaces use this to restyle only the properties that differ.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContentChange: u8 {
        const GLYPH    = 1 << 0;
        const AXES     = 1 << 1;
        const FEATURES = 1 << 2;
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph)
    }
}

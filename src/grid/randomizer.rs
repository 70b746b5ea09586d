// src/grid/randomizer.rs

//! Random cell content: glyph, axis settings and feature settings.

use rand::Rng;
use std::fmt::Write;

use super::sampler::AxisSampler;
use crate::glyph::{CellContent, NORMAL_SETTINGS};

/// Draws fresh content for one cell.
///
/// Borrowed from a [`Grid`](super::Grid) for the duration of a refresh; holds
/// no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct CellContentRandomizer<'a> {
    pub glyphs: &'a [char],
    pub samplers: &'a [AxisSampler],
    pub features: &'a [String],
    pub placeholder: char,
}

impl<'a> CellContentRandomizer<'a> {
    pub fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> CellContent {
        let glyph = if self.glyphs.is_empty() {
            self.placeholder
        } else {
            self.glyphs[rng.gen_range(0..self.glyphs.len())]
        };

        CellContent {
            glyph,
            axis_settings: self.axis_settings(rng),
            feature_settings: self.feature_settings(rng),
        }
    }

    /// One sampled value per axis, e.g. `"wght" 512.3, "wdth" 87.0`.
    fn axis_settings<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if self.samplers.is_empty() {
            return NORMAL_SETTINGS.to_string();
        }
        let mut settings = String::new();
        for (i, sampler) in self.samplers.iter().enumerate() {
            if i > 0 {
                settings.push_str(", ");
            }
            let value = sampler.sample_value(rng);
            let _ = write!(settings, "\"{}\" {:.1}", sampler.tag(), value);
        }
        settings
    }

    /// Each feature switched on or off with equal odds, e.g. `"liga" 1, "smcp" 0`.
    fn feature_settings<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if self.features.is_empty() {
            return NORMAL_SETTINGS.to_string();
        }
        let mut settings = String::new();
        for (i, tag) in self.features.iter().enumerate() {
            if i > 0 {
                settings.push_str(", ");
            }
            let enabled = rng.gen_bool(0.5);
            let _ = write!(settings, "\"{}\" {}", tag, u8::from(enabled));
        }
        settings
    }
}

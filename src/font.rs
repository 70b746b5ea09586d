// src/font.rs

//! The font capability consumed by the grid.
//!
//! Font binaries are parsed elsewhere; the grid only needs the handful of
//! facts exposed by [`FontCapability`]. [`FontInfo`] is a plain, JSON-loadable
//! implementation of it, used by the binary and the tests.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A variation axis in user-space units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub tag: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Axis {
    pub fn new(tag: &str, min: f64, default: f64, max: f64) -> Self {
        Self {
            tag: tag.to_string(),
            min,
            max,
            default,
        }
    }
}

/// One correspondence pair of an axis warp map, both coordinates normalized
/// to `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpPair {
    /// Coordinate obtained with default normalization.
    pub from: f64,
    /// Coordinate after the warp.
    pub to: f64,
}

impl WarpPair {
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// Vertical metrics in font units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalMetrics {
    pub ascender: f64,
    /// Usually negative.
    pub descender: f64,
    pub units_per_em: f64,
}

impl VerticalMetrics {
    /// Height-to-width ratio of a cell: the ascender-to-descender span in ems.
    ///
    /// Returns 1.0 when the metrics are absent or degenerate.
    pub fn aspect_ratio(metrics: Option<&VerticalMetrics>) -> f64 {
        match metrics {
            Some(m) if m.units_per_em > 0.0 => {
                let span = (m.ascender - m.descender) / m.units_per_em;
                if span.is_finite() && span > 0.0 {
                    span
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }
}

/// What the grid needs to know about a loaded font.
pub trait FontCapability {
    /// Family name used when styling cells.
    fn family(&self) -> &str;

    /// Unicode-mapped characters of the font, unfiltered.
    fn glyphs(&self) -> &[char];

    /// Variation axes, empty for static fonts.
    fn axes(&self) -> &[Axis];

    /// Warp map for the axis with the given tag, if the font has one.
    fn warp_map(&self, tag: &str) -> Option<&[WarpPair]>;

    /// OpenType feature tags.
    fn features(&self) -> &[String];

    /// Vertical metrics, if known.
    fn metrics(&self) -> Option<&VerticalMetrics>;
}

/// Returns the characters of `glyphs` worth showing in a cell.
///
/// Control, whitespace and default-ignorable characters are dropped, as are
/// duplicates. If nothing remains, the result holds only `placeholder`.
pub fn selectable_glyphs(glyphs: &[char], placeholder: char) -> Vec<char> {
    let mut seen = std::collections::HashSet::new();
    let selectable: Vec<char> = glyphs
        .iter()
        .copied()
        .filter(|&c| is_visible(c))
        .filter(|c| seen.insert(*c))
        .collect();

    if selectable.is_empty() {
        log::debug!("No selectable glyphs; using placeholder {:?}", placeholder);
        vec![placeholder]
    } else {
        selectable
    }
}

fn is_visible(c: char) -> bool {
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{180B}'..='\u{180F}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
    )
}

/// A font description loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontInfo {
    pub family: String,
    pub glyphs: Vec<char>,
    pub axes: Vec<Axis>,
    /// Warp maps keyed by axis tag.
    pub warp_maps: HashMap<String, Vec<WarpPair>>,
    pub features: Vec<String>,
    pub metrics: Option<VerticalMetrics>,
}

impl FontInfo {
    /// Reads a font description from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read font description {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid font description {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let font: FontInfo = serde_json::from_str(text)?;
        Ok(font)
    }

    /// A small variable font description used when no file is given.
    pub fn demo() -> Self {
        let mut warp_maps = HashMap::new();
        warp_maps.insert(
            "wght".to_string(),
            vec![
                WarpPair::new(-1.0, -1.0),
                WarpPair::new(-0.5, -0.7),
                WarpPair::new(0.0, 0.0),
                WarpPair::new(0.5, 0.8),
                WarpPair::new(1.0, 1.0),
            ],
        );

        FontInfo {
            family: "Demo Sans VF".to_string(),
            glyphs: ('A'..='Z').chain('a'..='z').chain('0'..='9').collect(),
            axes: vec![
                Axis::new("wght", 100.0, 400.0, 900.0),
                Axis::new("wdth", 75.0, 100.0, 125.0),
            ],
            warp_maps,
            features: vec!["liga".to_string(), "ss01".to_string(), "smcp".to_string()],
            metrics: Some(VerticalMetrics {
                ascender: 950.0,
                descender: -250.0,
                units_per_em: 1000.0,
            }),
        }
    }
}

impl FontCapability for FontInfo {
    fn family(&self) -> &str {
        &self.family
    }

    fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    fn axes(&self) -> &[Axis] {
        &self.axes
    }

    fn warp_map(&self, tag: &str) -> Option<&[WarpPair]> {
        self.warp_maps.get(tag).map(Vec::as_slice)
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn metrics(&self) -> Option<&VerticalMetrics> {
        self.metrics.as_ref()
    }
}

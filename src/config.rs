// src/config.rs

//! Defines the configuration structures for the tiling viewer.
//!
//! Every section derives `Serialize`/`Deserialize` with `#[serde(default)]`,
//! so a JSON file only needs to name the values it overrides. Components take
//! the section they care about by reference; the global [`CONFIG`] exists for
//! the binary entry point only.

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "GLYPH_TILES_CONFIG";

/// Process-wide configuration, loaded lazily from [`CONFIG_ENV_VAR`].
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for the tiling viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Grid geometry settings.
    pub grid: GridConfig,
    /// Phase timing and zoom settings.
    pub animation: AnimationConfig,
    /// Content refresh batching settings.
    pub scheduler: SchedulerConfig,
    /// Viewport settlement and initial size.
    pub viewport: ViewportConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], falling back to defaults.
    ///
    /// A missing variable is silent; an unreadable or malformed file is logged
    /// and ignored.
    pub fn load_or_default() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => match Config::load(Path::new(&path)) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("{:#}. Using default configuration.", e);
                    Config::default()
                }
            },
            None => Config::default(),
        }
    }
}

// --- Grid Configuration ---

/// Settings for grid dimensioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Lower bound for the column count (forced odd afterwards).
    pub min_cols: usize,
    /// Lower bound for the row count (forced odd afterwards).
    pub min_rows: usize,
    /// Upper bound for the column count, for degenerate zoom-out scales.
    pub max_cols: usize,
    /// Upper bound for the row count.
    pub max_rows: usize,
    /// How much of the viewport the zoomed-out grid must cover.
    /// Slightly above 1 so no edge shows at the overview scale.
    pub coverage_factor: f64,
    /// Cell width as a fraction of the viewport width.
    pub cell_width_factor: f64,
    /// Scale of the overview (fully zoomed-out) state.
    pub zoom_out_scale: f64,
    /// Substituted when a font exposes no selectable glyphs.
    pub placeholder_glyph: char,
}

impl Default for GridConfig {
    fn default() -> Self {
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
}

// --- Animation Configuration ---

/// Phase timing and zoom settings, all durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of both the zoom-in and the zoom-out phase.
    pub zoom_duration_ms: u64,
    /// Duration of the dwell phase.
    pub dwell_duration_ms: u64,
    /// Hold on the initial single-cell view before the first zoom-out.
    pub bootstrap_hold_ms: u64,
    /// Extra hold at the overview before the next zoom-in.
    pub overview_hold_ms: u64,
    /// Part of each zoom phase left free of content changes.
    pub scheduler_tail_ms: u64,
    /// Fraction of the viewport width one zoomed-in cell occupies.
    pub fit_factor: f64,
    /// Restart the cycle after each zoom-out.
    pub looping: bool,
    /// Seed for all random choices. `None` uses system entropy.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            zoom_duration_ms: 6000,
            dwell_duration_ms: 2000,
            bootstrap_hold_ms: 1000,
            overview_hold_ms: 1000,
            scheduler_tail_ms: 500,
            fit_factor: 0.8,
            looping: true,
            seed: None,
        }
    }
}

// --- Scheduler Configuration ---

/// Content refresh batching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Width of one tick in milliseconds.
    pub tick_width_ms: u64,
    /// Maximum number of distinct cells refreshed in one tick.
    pub max_cell_updates_per_tick: usize,
    /// Minimum number of refreshes drawn per cell and phase.
    pub min_changes_per_cell: u32,
    /// Maximum number of refreshes drawn per cell and phase.
    pub max_changes_per_cell: u32,
    /// 0 spreads refreshes uniformly over the phase, 1 concentrates them mid-phase.
    pub middle_bias: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_width_ms: 50,
            max_cell_updates_per_tick: 40,
            min_changes_per_cell: 1,
            max_changes_per_cell: 4,
            middle_bias: 0.7,
        }
    }
}

// --- Viewport Configuration ---

/// Viewport settlement and initial size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Render passes to wait for two equal size reads before accepting
    /// the latest size anyway.
    pub max_settle_passes: u32,
    /// Width used by the headless binary.
    pub width: f64,
    /// Height used by the headless binary.
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            max_settle_passes: 10,
            width: 1920.0,
            height: 1080.0,
        }
    }
}

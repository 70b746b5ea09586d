// src/viewer.rs
//! Coordinates the grid, the animator and the hosting surface.
//!
//! The viewer owns the only [`Grid`] and is the only place a grid is
//! rebuilt. Every rebuild is preceded by pausing and resetting the animator,
//! so no timer or scheduler tick can outlive the grid generation it was
//! created for.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{Animator, Timeline, Transform};
use crate::config::Config;
use crate::display::Surface;
use crate::font::FontCapability;
use crate::glyph::ContentChange;
use crate::grid::Grid;

/// What the viewer is doing after a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerStatus {
    /// No font loaded yet.
    Empty,
    /// Waiting for the viewport size to stop changing.
    Settling { passes: u32 },
    /// The grid is built and the animator is in charge.
    Animating,
}

/// Size reads taken while a resize settles.
#[derive(Debug, Clone, Copy, Default)]
struct Settlement {
    last_read: Option<(f64, f64)>,
    passes: u32,
}

/// The tiling viewer.
pub struct TilingViewer<S: Surface> {
    config: Config,
    surface: S,
    font: Option<Box<dyn FontCapability>>,
    grid: Grid,
    grid_rng: StdRng,
    animator: Animator<StdRng>,
    settlement: Option<Settlement>,
}

impl<S: Surface> TilingViewer<S> {
    /// Creates a viewer on `surface`. Nothing is shown until a font loads.
    pub fn new(config: &Config, surface: S) -> Self {
        let mut grid_rng = match config.animation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let animator_rng = StdRng::seed_from_u64(grid_rng.gen());
        let animator = Animator::new(
            &config.animation,
            &config.scheduler,
            config.grid.zoom_out_scale,
            Timeline::new(),
            animator_rng,
        );

        Self {
            config: config.clone(),
            surface,
            font: None,
            grid: Grid::empty(),
            grid_rng,
            animator,
            settlement: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn animator(&self) -> &Animator<StdRng> {
        &self.animator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn now(&self) -> u64 {
        self.animator.now()
    }

    pub fn status(&self) -> ViewerStatus {
        match (&self.font, self.settlement) {
            (None, _) => ViewerStatus::Empty,
            (Some(_), Some(settlement)) => ViewerStatus::Settling {
                passes: settlement.passes,
            },
            (Some(_), None) => ViewerStatus::Animating,
        }
    }

    /// Replaces the font: stops the animation, rebuilds the grid for the
    /// current viewport and starts again.
    pub fn load_font(&mut self, font: Box<dyn FontCapability>) {
        log::info!("TilingViewer: loading font '{}'", font.family());
        self.animator.pause(&mut self.surface);
        self.animator.reset(&mut self.surface);
        self.font = Some(font);
        self.settlement = None;
        self.rebuild();
    }

    /// Called when the host reports a size change. The animation stops and
    /// the surface rests at the neutral transform until the size settles.
    pub fn notify_resize(&mut self) {
        if self.font.is_none() {
            return;
        }
        log::debug!("TilingViewer: resize reported; pausing until the viewport settles");
        self.animator.pause(&mut self.surface);
        self.animator.rest_at(Transform::IDENTITY, &mut self.surface);
        self.settlement = Some(Settlement::default());
    }

    /// One render pass of the host. While settling, reads the viewport size
    /// and rebuilds once two consecutive reads agree, or once
    /// `viewport.max_settle_passes` reads have been taken.
    pub fn render_pass(&mut self) -> ViewerStatus {
        if let Some(mut settlement) = self.settlement {
            let size = self.surface.viewport_size();
            settlement.passes += 1;

            if settlement.last_read == Some(size) {
                log::debug!(
                    "TilingViewer: viewport settled at {}x{} after {} passes",
                    size.0,
                    size.1,
                    settlement.passes
                );
                self.settlement = None;
                self.rebuild();
            } else if settlement.passes >= self.config.viewport.max_settle_passes {
                log::warn!(
                    "TilingViewer: viewport still changing after {} passes; using {}x{}",
                    settlement.passes,
                    size.0,
                    size.1
                );
                self.settlement = None;
                self.rebuild();
            } else {
                settlement.last_read = Some(size);
                self.settlement = Some(settlement);
            }
        }
        self.status()
    }

    /// Advances the virtual clock by `delta_ms`, running due phase changes
    /// and content ticks.
    pub fn advance(&mut self, delta_ms: u64) {
        self.animator.advance(delta_ms, &mut self.grid, &mut self.surface);
    }

    pub fn pause(&mut self) {
        self.animator.pause(&mut self.surface);
    }

    pub fn resume(&mut self) {
        if self.settlement.is_some() {
            log::debug!("TilingViewer: resume ignored while the viewport settles");
            return;
        }
        self.animator.resume(&self.grid, &mut self.surface);
    }

    pub fn reset(&mut self) {
        self.animator.reset(&mut self.surface);
    }

    pub fn destroy(&mut self) {
        self.animator.destroy(&mut self.surface);
    }

    /// Builds a new grid for the current viewport, mounts it on the surface
    /// and restarts the animation.
    fn rebuild(&mut self) {
        let font = match self.font.as_deref() {
            Some(font) => font,
            None => return,
        };
        let (width, height) = self.surface.viewport_size();
        let zoom_out_scale = self.config.grid.zoom_out_scale;

        self.grid = Grid::populate(width, height, zoom_out_scale, font, &self.config.grid, &mut self.grid_rng);

        self.surface.rebuild_cells(self.grid.layout(), self.grid.font_family());
        for cell in self.grid.cells() {
            self.surface.update_cell(cell.index, &cell.content, ContentChange::all());
        }

        self.animator.set_zoom_out_scale(zoom_out_scale);
        self.animator.start(&self.grid, &mut self.surface);
    }
}

// src/animation/animator.rs

//! The zoom / dwell / zoom-out cycle.
//!
//! After a short hold on a single zoomed-in cell the machine zooms out to the
//! overview, then loops `ZoomIn -> Dwell -> ZoomOut`, with an extra hold at
//! the overview before each zoom-in. Zoom phases tween the surface transform
//! and run the [`UpdateScheduler`] alongside; dwell only holds.
//!
//! All timing runs on the animator's own [`Timeline`]; nothing happens
//! unless the owner advances it.

use rand::Rng;
use std::collections::VecDeque;

use super::scheduler::{SchedulerTick, UpdateScheduler};
use super::timeline::Timeline;
use super::transform::{fit_scale, Target, Transform, Transition, Tween};
use crate::config::{AnimationConfig, SchedulerConfig};
use crate::display::Surface;
use crate::grid::Grid;

/// Number of visited phases remembered for inspection.
const PHASE_HISTORY_LEN: usize = 256;

/// One state of the animation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationPhase {
    ZoomIn,
    Dwell,
    ZoomOut,
}

impl AnimationPhase {
    /// The phase entered when this one completes. ZoomOut leads to ZoomIn
    /// via the overview hold.
    pub fn next(self) -> AnimationPhase {
        match self {
            AnimationPhase::ZoomOut => AnimationPhase::ZoomIn,
            AnimationPhase::ZoomIn => AnimationPhase::Dwell,
            AnimationPhase::Dwell => AnimationPhase::ZoomOut,
        }
    }
}

/// Where the machine is, including the holds between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Not started, reset, or destroyed.
    Idle,
    /// Holding the initial single-cell view.
    Bootstrap,
    Phase(AnimationPhase),
    /// Holding the overview between ZoomOut and the next ZoomIn.
    OverviewHold,
    /// ZoomOut completed with looping disabled.
    Finished,
}

/// Timer payloads dispatched by [`Animator::advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorTask {
    BootstrapElapsed,
    PhaseElapsed(AnimationPhase),
    OverviewHoldElapsed,
    Tick(SchedulerTick),
}

impl From<SchedulerTick> for AnimatorTask {
    fn from(tick: SchedulerTick) -> Self {
        AnimatorTask::Tick(tick)
    }
}

/// Drives the transform and the content scheduler through the phase cycle.
pub struct Animator<R: Rng> {
    config: AnimationConfig,
    timeline: Timeline<AnimatorTask>,
    scheduler: UpdateScheduler,
    rng: R,
    stage: Stage,
    paused: bool,
    destroyed: bool,
    zoom_out_scale: f64,
    target: Target,
    tween: Tween,
    visited: VecDeque<AnimationPhase>,
}

impl<R: Rng> Animator<R> {
    /// Creates an idle animator running on `timeline` and drawing from `rng`.
    pub fn new(
        config: &AnimationConfig,
        scheduler_config: &SchedulerConfig,
        zoom_out_scale: f64,
        timeline: Timeline<AnimatorTask>,
        rng: R,
    ) -> Self {
        let now = timeline.now();
        Self {
            config: config.clone(),
            timeline,
            scheduler: UpdateScheduler::new(scheduler_config),
            rng,
            stage: Stage::Idle,
            paused: false,
            destroyed: false,
            zoom_out_scale,
            target: Target::default(),
            tween: Tween::at_rest(Transform::IDENTITY, now),
            visited: VecDeque::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.timeline.now()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The current phase, `None` while idle or holding.
    pub fn phase(&self) -> Option<AnimationPhase> {
        match self.stage {
            Stage::Phase(phase) => Some(phase),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Phases entered so far, oldest first. Resuming does not add entries.
    pub fn visited_phases(&self) -> impl Iterator<Item = AnimationPhase> + '_ {
        self.visited.iter().copied()
    }

    /// The cell most recently zoomed to.
    pub fn target(&self) -> Target {
        self.target
    }

    /// The transform at the current virtual time, mid-tween included.
    pub fn current_transform(&self) -> Transform {
        self.tween.sample(self.now())
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.timer_count()
    }

    pub fn set_zoom_out_scale(&mut self, scale: f64) {
        self.zoom_out_scale = scale;
    }

    /// Starts the cycle: jump to the centre cell, hold, then zoom out.
    pub fn start(&mut self, grid: &Grid, surface: &mut dyn Surface) {
        if self.destroyed {
            log::warn!("Animator: start() after destroy() ignored");
            return;
        }
        self.cancel_all();
        self.paused = false;
        self.visited.clear();

        self.target = Self::target_for(grid, grid.center_cell());
        let viewport_width = surface.viewport_size().0;
        if let Some(scale) = fit_scale(viewport_width, self.target.cell_width, self.config.fit_factor) {
            let transform = Transform::centered_on(self.target.offset_x, self.target.offset_y, scale);
            self.jump_to(transform, surface);
        }

        log::info!(
            "Animator: started on grid generation {} ({} cells)",
            grid.generation(),
            grid.cell_count()
        );
        self.stage = Stage::Bootstrap;
        self.timeline
            .schedule_after(self.config.bootstrap_hold_ms, AnimatorTask::BootstrapElapsed);
    }

    /// Cancels every phase timer and scheduler tick and freezes the
    /// transform where it is.
    pub fn pause(&mut self, surface: &mut dyn Surface) {
        if self.paused || self.destroyed {
            return;
        }
        self.cancel_all();
        let frozen = self.current_transform();
        self.jump_to(frozen, surface);
        self.paused = true;
        log::debug!("Animator: paused in {:?} at {}ms", self.stage, self.now());
    }

    /// Re-enters the current stage as if freshly entered. A paused zoom-in
    /// heads for the same target again.
    pub fn resume(&mut self, grid: &Grid, surface: &mut dyn Surface) {
        if !self.paused || self.destroyed {
            return;
        }
        self.paused = false;
        log::debug!("Animator: resuming {:?} at {}ms", self.stage, self.now());
        match self.stage {
            Stage::Bootstrap => {
                self.timeline
                    .schedule_after(self.config.bootstrap_hold_ms, AnimatorTask::BootstrapElapsed);
            }
            Stage::Phase(phase) => self.enter_phase(phase, false, grid, surface),
            Stage::OverviewHold => self.enter_overview_hold(),
            Stage::Idle | Stage::Finished => {}
        }
    }

    /// Jumps to the overview and clears all timers. Leaves the machine idle
    /// and the paused flag untouched.
    pub fn reset(&mut self, surface: &mut dyn Surface) {
        if self.destroyed {
            return;
        }
        self.cancel_all();
        self.jump_to(Transform::overview(self.zoom_out_scale), surface);
        self.stage = Stage::Idle;
        log::debug!("Animator: reset to overview");
    }

    /// Resets and makes the animator permanently inert.
    pub fn destroy(&mut self, surface: &mut dyn Surface) {
        self.reset(surface);
        self.destroyed = true;
        log::info!("Animator: destroyed");
    }

    /// Stops everything and puts the surface at rest on `transform`, e.g.
    /// the neutral transform while the viewport settles.
    pub fn rest_at(&mut self, transform: Transform, surface: &mut dyn Surface) {
        self.cancel_all();
        self.jump_to(transform, surface);
    }

    /// Runs every task due up to `until` (virtual ms), in deadline order.
    pub fn advance_to(&mut self, until: u64, grid: &mut Grid, surface: &mut dyn Surface) {
        while let Some((_, task)) = self.timeline.pop_due(until) {
            self.dispatch(task, grid, surface);
        }
        self.timeline.settle_at(until);
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance(&mut self, delta_ms: u64, grid: &mut Grid, surface: &mut dyn Surface) {
        let until = self.now() + delta_ms;
        self.advance_to(until, grid, surface);
    }

    fn dispatch(&mut self, task: AnimatorTask, grid: &mut Grid, surface: &mut dyn Surface) {
        match task {
            AnimatorTask::BootstrapElapsed if self.stage == Stage::Bootstrap => {
                self.enter_phase(AnimationPhase::ZoomOut, true, grid, surface);
            }
            AnimatorTask::PhaseElapsed(phase) if self.stage == Stage::Phase(phase) => {
                // Changes still queued wait for the next zoom phase; holds and
                // dwell never touch content.
                match phase {
                    AnimationPhase::ZoomOut if self.config.looping => {
                        self.scheduler.suspend(&mut self.timeline);
                        self.enter_overview_hold();
                    }
                    AnimationPhase::ZoomOut => {
                        log::info!("Animator: cycle finished (looping disabled)");
                        self.stage = Stage::Finished;
                    }
                    AnimationPhase::ZoomIn => {
                        self.scheduler.suspend(&mut self.timeline);
                        self.enter_phase(phase.next(), true, grid, surface);
                    }
                    AnimationPhase::Dwell => self.enter_phase(phase.next(), true, grid, surface),
                }
            }
            AnimatorTask::OverviewHoldElapsed if self.stage == Stage::OverviewHold => {
                self.enter_phase(AnimationPhase::ZoomIn, true, grid, surface);
            }
            AnimatorTask::Tick(tick) => {
                self.scheduler
                    .on_tick(tick, grid, surface, &mut self.timeline, &mut self.rng);
            }
            other => {
                log::trace!("Animator: stale task {:?} in {:?}", other, self.stage);
            }
        }
    }

    fn enter_phase(&mut self, phase: AnimationPhase, fresh: bool, grid: &Grid, surface: &mut dyn Surface) {
        self.stage = Stage::Phase(phase);
        if fresh {
            if self.visited.len() == PHASE_HISTORY_LEN {
                self.visited.pop_front();
            }
            self.visited.push_back(phase);
            log::info!("Animator: entering {:?} at {}ms", phase, self.now());
        }

        let zoom_ms = self.config.zoom_duration_ms;
        let content_ms = zoom_ms.saturating_sub(self.config.scheduler_tail_ms);

        match phase {
            AnimationPhase::ZoomIn => {
                if fresh {
                    let index = grid.random_cell(&mut self.rng);
                    self.target = Self::target_for(grid, index);
                }
                let viewport_width = surface.viewport_size().0;
                match fit_scale(viewport_width, self.target.cell_width, self.config.fit_factor) {
                    Some(scale) => {
                        let to = Transform::centered_on(self.target.offset_x, self.target.offset_y, scale);
                        self.tween_to(to, Transition::eased(zoom_ms), surface);
                    }
                    None => log::debug!("Animator: no cell to zoom to; holding transform"),
                }
                self.scheduler
                    .start(content_ms, grid, &mut self.timeline, &mut self.rng);
                self.timeline
                    .schedule_after(zoom_ms, AnimatorTask::PhaseElapsed(phase));
            }
            AnimationPhase::Dwell => {
                self.timeline
                    .schedule_after(self.config.dwell_duration_ms, AnimatorTask::PhaseElapsed(phase));
            }
            AnimationPhase::ZoomOut => {
                let to = Transform::overview(self.zoom_out_scale);
                self.tween_to(to, Transition::eased(zoom_ms), surface);
                self.scheduler
                    .start(content_ms, grid, &mut self.timeline, &mut self.rng);
                self.timeline
                    .schedule_after(zoom_ms, AnimatorTask::PhaseElapsed(phase));
            }
        }
    }

    fn enter_overview_hold(&mut self) {
        self.stage = Stage::OverviewHold;
        self.timeline
            .schedule_after(self.config.overview_hold_ms, AnimatorTask::OverviewHoldElapsed);
    }

    /// Geometry of the cell at `index`; the zero target if there is none.
    fn target_for(grid: &Grid, index: Option<usize>) -> Target {
        match index.and_then(|i| grid.cell_offset(i)) {
            Some((offset_x, offset_y)) => Target {
                offset_x,
                offset_y,
                cell_width: grid.layout().cell_width,
                cell_height: grid.layout().cell_height,
            },
            None => Target::default(),
        }
    }

    fn tween_to(&mut self, to: Transform, transition: Transition, surface: &mut dyn Surface) {
        let now = self.now();
        self.tween = Tween {
            from: self.tween.sample(now),
            to,
            start_ms: now,
            transition,
        };
        surface.apply_transform(&to, transition);
    }

    fn jump_to(&mut self, transform: Transform, surface: &mut dyn Surface) {
        self.tween = Tween::at_rest(transform, self.now());
        surface.apply_transform(&transform, Transition::INSTANT);
    }

    /// Phase timers and scheduler ticks go together, never one without the
    /// other.
    fn cancel_all(&mut self) {
        self.scheduler.clear(&mut self.timeline);
        self.timeline.cancel_all();
    }
}

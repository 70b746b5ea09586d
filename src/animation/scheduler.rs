// src/animation/scheduler.rs

//! Batched cell-content refreshes during an animation phase.
//!
//! At the start of a phase every cell draws how many times it will change and
//! when. Changes are bucketed into fixed-width ticks; each tick refreshes at
//! most `max_cell_updates_per_tick` distinct cells and carries the rest into
//! the next tick. Changes are delayed under load, never dropped: when a phase
//! ends with changes still queued, the run is suspended and its backlog is
//! handed to the next run, ahead of that run's own changes.

use rand::Rng;
use std::collections::HashSet;

use super::timeline::{Timeline, TimerId};
use crate::config::SchedulerConfig;
use crate::display::Surface;
use crate::grid::Grid;

/// The task a running scheduler puts on the timeline for each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTick {
    pub run: u64,
}

/// How often and when cells change during one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeRatePolicy {
    pub min_per_cell: u32,
    pub max_per_cell: u32,
    /// 0 = uniform over the phase, 1 = concentrated mid-phase.
    pub middle_bias: f64,
}

impl From<&SchedulerConfig> for ChangeRatePolicy {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            min_per_cell: config.min_changes_per_cell.min(config.max_changes_per_cell),
            max_per_cell: config.max_changes_per_cell.max(config.min_changes_per_cell),
            middle_bias: config.middle_bias.clamp(0.0, 1.0),
        }
    }
}

/// Draws a delay in `[0, duration]`, blending a bell-shaped estimate (mean of
/// three uniforms) with a plain uniform by `middle_bias`.
pub fn draw_delay<R: Rng + ?Sized>(rng: &mut R, duration_ms: f64, middle_bias: f64) -> f64 {
    let bell = (rng.gen::<f64>() + rng.gen::<f64>() + rng.gen::<f64>()) / 3.0;
    let uniform = rng.gen::<f64>();
    (middle_bias * bell + (1.0 - middle_bias) * uniform) * duration_ms
}

/// `ceil(duration / tick_width)`, at least one tick.
pub fn total_ticks(duration_ms: u64, tick_width_ms: u64) -> usize {
    let tick_width_ms = tick_width_ms.max(1);
    (duration_ms.div_ceil(tick_width_ms) as usize).max(1)
}

/// Every change of one phase, bucketed by tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    /// Cell indices per tick, earliest delay first.
    pub buckets: Vec<Vec<usize>>,
    /// Changes drawn per cell.
    pub planned: Vec<u32>,
}

impl TickPlan {
    /// Draws change counts and delays for `cell_count` cells.
    pub fn draw<R: Rng + ?Sized>(
        cell_count: usize,
        duration_ms: u64,
        tick_width_ms: u64,
        policy: &ChangeRatePolicy,
        rng: &mut R,
    ) -> Self {
        let ticks = total_ticks(duration_ms, tick_width_ms);
        let tick_width = tick_width_ms.max(1) as f64;
        let mut timed: Vec<Vec<(f64, usize)>> = vec![Vec::new(); ticks];
        let mut planned = vec![0u32; cell_count];

        for (index, count) in planned.iter_mut().enumerate() {
            *count = rng.gen_range(policy.min_per_cell..=policy.max_per_cell);
            for _ in 0..*count {
                let delay = draw_delay(rng, duration_ms as f64, policy.middle_bias);
                let bucket = ((delay / tick_width) as usize).min(ticks - 1);
                timed[bucket].push((delay, index));
            }
        }

        let buckets = timed
            .into_iter()
            .map(|mut bucket| {
                bucket.sort_by(|a, b| a.0.total_cmp(&b.0));
                bucket.into_iter().map(|(_, index)| index).collect()
            })
            .collect();

        Self { buckets, planned }
    }

    pub fn total_changes(&self) -> u64 {
        self.planned.iter().map(|&c| c as u64).sum()
    }
}

/// Counters for one scheduler run, kept after it ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Changes per cell this run is responsible for, inherited ones included.
    pub planned: Vec<u32>,
    pub delivered: Vec<u32>,
    /// Changes per cell taken over from the run this one replaced.
    pub inherited: Vec<u32>,
    /// Changes per cell passed on to the run that replaced this one.
    pub handed_on: Vec<u32>,
    pub ticks: usize,
    /// Ticks added past the plan to drain carried changes.
    pub extra_ticks: usize,
    pub max_refreshed_in_tick: usize,
    pub stale: bool,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub refreshed: Vec<usize>,
    pub carried: usize,
    pub finished: bool,
}

#[derive(Debug)]
struct SchedulerRun {
    id: u64,
    generation: u64,
    /// `None` while suspended.
    timer: Option<TimerId>,
    buckets: Vec<Vec<usize>>,
    planned_ticks: usize,
    current: usize,
    stats: RunStats,
}

/// Runs tick plans against a grid on a [`Timeline`].
#[derive(Debug)]
pub struct UpdateScheduler {
    tick_width_ms: u64,
    max_cell_updates_per_tick: usize,
    policy: ChangeRatePolicy,
    run: Option<SchedulerRun>,
    next_run_id: u64,
    last_stats: Option<RunStats>,
}

impl UpdateScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            tick_width_ms: config.tick_width_ms.max(1),
            max_cell_updates_per_tick: config.max_cell_updates_per_tick.max(1),
            policy: ChangeRatePolicy::from(config),
            run: None,
            next_run_id: 1,
            last_stats: None,
        }
    }

    /// A run exists, ticking or suspended.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// A run exists and its tick timer is live.
    pub fn is_ticking(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.timer.is_some())
    }

    /// Stats of the run in progress.
    pub fn current_stats(&self) -> Option<&RunStats> {
        self.run.as_ref().map(|run| &run.stats)
    }

    /// Stats of the most recent run that finished or was cleared.
    pub fn last_stats(&self) -> Option<&RunStats> {
        self.last_stats.as_ref()
    }

    /// Plans and starts a run of `duration_ms` over `grid`.
    ///
    /// Changes still queued by a previous run on the same grid generation
    /// are taken over and go first, in their original order.
    pub fn start<T, R>(&mut self, duration_ms: u64, grid: &Grid, timeline: &mut Timeline<T>, rng: &mut R)
    where
        T: Clone + From<SchedulerTick>,
        R: Rng + ?Sized,
    {
        let backlog = self.hand_over(grid, timeline);
        if grid.cell_count() == 0 {
            return;
        }

        let mut plan = TickPlan::draw(grid.cell_count(), duration_ms, self.tick_width_ms, &self.policy, rng);
        let id = self.next_run_id;
        self.next_run_id += 1;

        let cell_count = plan.planned.len();
        let mut inherited = vec![0u32; cell_count];
        for &index in &backlog {
            inherited[index] += 1;
        }
        let planned: Vec<u32> = plan.planned.iter().zip(&inherited).map(|(own, old)| own + old).collect();

        log::debug!(
            "UpdateScheduler: run {} over {}ms, {} ticks, {} changes (+{} inherited) for {} cells",
            id,
            duration_ms,
            plan.buckets.len(),
            plan.total_changes(),
            backlog.len(),
            grid.cell_count()
        );
        plan.buckets[0].splice(0..0, backlog);

        let timer = timeline.schedule_every(self.tick_width_ms, T::from(SchedulerTick { run: id }));
        self.run = Some(SchedulerRun {
            id,
            generation: grid.generation(),
            timer: Some(timer),
            planned_ticks: plan.buckets.len(),
            buckets: plan.buckets,
            current: 0,
            stats: RunStats {
                planned,
                delivered: vec![0; cell_count],
                inherited,
                handed_on: vec![0; cell_count],
                ..RunStats::default()
            },
        });
    }

    /// Stops ticking but keeps the queued changes for the next run.
    pub fn suspend<T: Clone>(&mut self, timeline: &mut Timeline<T>) {
        if let Some(run) = self.run.as_mut() {
            if let Some(timer) = run.timer.take() {
                timeline.cancel(timer);
                let queued: usize = run.buckets[run.current..].iter().map(Vec::len).sum();
                log::debug!("UpdateScheduler: run {} suspended with {} changes queued", run.id, queued);
            }
        }
    }

    /// Ends the current run and returns its queued changes, oldest first.
    /// Changes queued against another grid generation are discarded.
    fn hand_over<T: Clone>(&mut self, grid: &Grid, timeline: &mut Timeline<T>) -> Vec<usize> {
        let mut run = match self.run.take() {
            Some(run) => run,
            None => return Vec::new(),
        };
        if let Some(timer) = run.timer.take() {
            timeline.cancel(timer);
        }

        let mut backlog = Vec::new();
        if run.generation == grid.generation() {
            for bucket in run.buckets.drain(run.current..) {
                backlog.extend(bucket);
            }
            for &index in &backlog {
                run.stats.handed_on[index] += 1;
            }
            if !backlog.is_empty() {
                log::debug!(
                    "UpdateScheduler: run {} hands {} queued changes to the next run",
                    run.id,
                    backlog.len()
                );
            }
        } else {
            run.stats.stale = true;
            log::debug!("UpdateScheduler: run {} targets an old grid; queue discarded", run.id);
        }
        self.last_stats = Some(run.stats);
        backlog
    }

    /// Processes one tick: refreshes up to the per-tick cap of distinct
    /// cells and carries the rest forward.
    ///
    /// Ticks from an earlier run are ignored. A tick against a rebuilt grid
    /// ends the run without touching any cell.
    pub fn on_tick<T, R>(
        &mut self,
        tick: SchedulerTick,
        grid: &mut Grid,
        surface: &mut dyn Surface,
        timeline: &mut Timeline<T>,
        rng: &mut R,
    ) -> TickReport
    where
        T: Clone,
        R: Rng + ?Sized,
    {
        let run = match self.run.as_mut() {
            Some(run) if run.id == tick.run => run,
            _ => {
                log::trace!("UpdateScheduler: ignoring tick of finished run {}", tick.run);
                return TickReport::default();
            }
        };

        if run.generation != grid.generation() {
            log::debug!(
                "UpdateScheduler: run {} targets grid generation {}, now {}; dropping stale run",
                run.id,
                run.generation,
                grid.generation()
            );
            run.stats.stale = true;
            self.clear(timeline);
            return TickReport {
                finished: true,
                ..TickReport::default()
            };
        }

        let bucket = std::mem::take(&mut run.buckets[run.current]);
        let mut seen = HashSet::with_capacity(bucket.len());
        let mut refreshed = Vec::new();
        let mut carry = Vec::new();
        for index in bucket {
            if refreshed.len() < self.max_cell_updates_per_tick && seen.insert(index) {
                refreshed.push(index);
            } else {
                carry.push(index);
            }
        }

        for &index in &refreshed {
            if let Some((content, changed)) = grid.refresh_cell(index, rng) {
                surface.update_cell(index, content, changed);
                run.stats.delivered[index] += 1;
            }
        }

        run.current += 1;
        run.stats.ticks += 1;
        run.stats.max_refreshed_in_tick = run.stats.max_refreshed_in_tick.max(refreshed.len());

        let carried = carry.len();
        if !carry.is_empty() {
            log::trace!("UpdateScheduler: tick {} carries {} changes", run.current - 1, carried);
            if run.current == run.buckets.len() {
                run.buckets.push(Vec::new());
                run.stats.extra_ticks += 1;
            }
            run.buckets[run.current].splice(0..0, carry);
        }

        let finished = run.current >= run.buckets.len();
        if finished {
            log::debug!(
                "UpdateScheduler: run {} finished after {} ticks ({} planned)",
                run.id,
                run.stats.ticks,
                run.planned_ticks
            );
            self.clear(timeline);
        }

        TickReport {
            refreshed,
            carried,
            finished,
        }
    }

    /// Discards the remaining buckets and cancels the tick timer.
    pub fn clear<T: Clone>(&mut self, timeline: &mut Timeline<T>) {
        if let Some(run) = self.run.take() {
            if let Some(timer) = run.timer {
                timeline.cancel(timer);
            }
            self.last_stats = Some(run.stats);
        }
    }
}

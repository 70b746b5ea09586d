// src/animation/mod.rs

//! Zoom/pan animation of the tiling grid.
//!
//! - `timeline`: virtual clock every timer runs on
//! - `transform`: viewport geometry and easing
//! - `scheduler`: batched content refreshes per phase
//! - `animator`: the ZoomOut / ZoomIn / Dwell state machine

pub mod animator;
pub mod scheduler;
pub mod timeline;
pub mod transform;

pub use animator::{AnimationPhase, Animator, AnimatorTask, Stage};
pub use scheduler::{ChangeRatePolicy, SchedulerTick, TickPlan, UpdateScheduler};
pub use timeline::{Timeline, TimerId};
pub use transform::{fit_scale, Easing, Target, Transform, Transition, Tween};

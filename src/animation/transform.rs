// src/animation/transform.rs

//! Viewport geometry: the scale-and-translate applied to the pannable
//! surface, and the eased tween between two such transforms.

use std::fmt;

/// A cell the camera can zoom to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Target {
    /// Offset of the cell centre from the viewport centre.
    pub offset_x: f64,
    pub offset_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

/// `translate(tx, ty) scale(scale)`, centre-anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    /// Scale 1, no translation.
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Centres the point at `(offset_x, offset_y)` and magnifies by `scale`.
    pub fn centered_on(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self {
            scale,
            translate_x: -offset_x * scale,
            translate_y: -offset_y * scale,
        }
    }

    /// The zoomed-out overview, centred at the origin.
    pub fn overview(scale: f64) -> Self {
        Self::centered_on(0.0, 0.0, scale)
    }

    /// Value for the CSS `transform` property.
    pub fn to_css(&self) -> String {
        format!(
            "translate({:.3}px, {:.3}px) scale({:.5})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    fn lerp(&self, to: &Transform, t: f64) -> Transform {
        Transform {
            scale: self.scale + (to.scale - self.scale) * t,
            translate_x: self.translate_x + (to.translate_x - self.translate_x) * t,
            translate_y: self.translate_y + (to.translate_y - self.translate_y) * t,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

/// Magnification at which one cell spans `fit_factor` of the viewport width.
///
/// Returns `None` for zero-size cells; the caller leaves the transform alone.
pub fn fit_scale(viewport_width: f64, cell_width: f64, fit_factor: f64) -> Option<f64> {
    if cell_width > 0.0 && viewport_width > 0.0 {
        Some(viewport_width / cell_width * fit_factor)
    } else {
        None
    }
}

/// Timing curve of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            // Cubic ease-in-out.
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }

    pub fn css_name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

/// How the surface should move to a new transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Transition {
    /// Jump straight to the new transform.
    pub const INSTANT: Transition = Transition {
        duration_ms: 0,
        easing: Easing::Linear,
    };

    pub fn eased(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            easing: Easing::EaseInOut,
        }
    }
}

/// A transform moving from `from` to `to` over `transition`, started at
/// virtual time `start_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: Transform,
    pub to: Transform,
    pub start_ms: u64,
    pub transition: Transition,
}

impl Tween {
    /// A tween that is already at rest on `transform`.
    pub fn at_rest(transform: Transform, now_ms: u64) -> Self {
        Self {
            from: transform,
            to: transform,
            start_ms: now_ms,
            transition: Transition::INSTANT,
        }
    }

    /// The interpolated transform at `now_ms`.
    pub fn sample(&self, now_ms: u64) -> Transform {
        if self.transition.duration_ms == 0 || now_ms >= self.start_ms + self.transition.duration_ms {
            return self.to;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f64;
        let t = elapsed / self.transition.duration_ms as f64;
        self.from.lerp(&self.to, self.transition.easing.apply(t))
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms + self.transition.duration_ms
    }
}

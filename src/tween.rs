use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, Result};

/// Easing curve for smooth scrolling. Maps normalized time `t ∈ [0, 1]` to progress.
#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    EaseInOutSine,
    EaseOutCubic,
    EaseInOutCubic,
    SmoothStep,
    Linear,
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Easing {
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn sample(&self, t: f64) -> f64 {
        match self {
            Self::EaseInOutSine => (1.0 - (PI * t).cos()) / 2.0,
            Self::EaseOutCubic => (t - 1.0).powi(3) + 1.0,
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::Linear => t,
            Self::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EaseInOutSine => f.write_str("EaseInOutSine"),
            Self::EaseOutCubic => f.write_str("EaseOutCubic"),
            Self::EaseInOutCubic => f.write_str("EaseInOutCubic"),
            Self::SmoothStep => f.write_str("SmoothStep"),
            Self::Linear => f.write_str("Linear"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How long a smooth scroll takes, in milliseconds.
#[derive(Clone, Default)]
pub enum ScrollDuration {
    /// `clamp(0.075 * distance, 100, 500)`.
    #[default]
    Auto,
    Fixed(f64),
    /// Called with the absolute scroll distance.
    Dynamic(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl ScrollDuration {
    pub fn dynamic(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    pub fn resolve(&self, distance: f64) -> Result<f64> {
        let distance = distance.abs();
        let duration = match self {
            Self::Auto => auto_duration(distance),
            Self::Fixed(ms) => *ms,
            Self::Dynamic(f) => f(distance),
        };
        if duration.is_finite() && duration >= 0.0 {
            Ok(duration)
        } else {
            Err(ConfigError::InvalidDuration { distance, duration })
        }
    }
}

impl fmt::Debug for ScrollDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Fixed(ms) => f.debug_tuple("Fixed").field(ms).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

pub fn auto_duration(distance: f64) -> f64 {
    (distance * 0.075).clamp(100.0, 500.0)
}

/// An eased transition from one offset to another.
///
/// The clock starts at the first sampled frame, so the engine does not need a time source of its
/// own; the host's frame timestamps drive everything.
#[derive(Clone, Debug)]
pub(crate) struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    started_ms: Option<f64>,
    easing: Easing,
}

impl Tween {
    pub(crate) fn new(from: f64, to: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            started_ms: None,
            easing,
        }
    }

    /// Returns the offset for `now_ms` and whether the tween has finished.
    ///
    /// The final sample snaps exactly to `to`.
    pub(crate) fn sample(&mut self, now_ms: f64) -> (f64, bool) {
        let started = *self.started_ms.get_or_insert(now_ms);
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - started) / self.duration_ms).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            return (self.to, true);
        }
        let eased = self.easing.sample(t);
        (self.from + (self.to - self.from) * eased, false)
    }
}

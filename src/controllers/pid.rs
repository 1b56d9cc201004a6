//! Two-axis PID velocity controller.
//!
//! Converts a positional error `{x, y}` into a velocity command by summing a
//! proportional, an integral and two finite-difference terms per axis. The
//! sampling interval is measured from a [`Clock`] on every tick and floored,
//! so irregular or duplicated ticks never blow up the difference terms.
//!
//! # Examples
//! ```
//! use core::time::Duration;
//! use nalgebra::Vector2;
//! use planar_pid::{ManualClock, PIDGains, PIDSettings, PID};
//!
//! let clock = ManualClock::new();
//! let gains = PIDGains::builder().kp(1.0).ki(0.0).kd(0.0).build();
//! let mut pid = PID::with_clock(gains, PIDSettings::default(), clock.clone());
//!
//! clock.advance(Duration::from_millis(50));
//! assert_eq!(pid.process(Vector2::new(5.0, -3.0)), Vector2::new(5.0, -3.0));
//! ```

use alloc::boxed::Box;
use core::{ops::AddAssign, time::Duration};

use bon::Builder;
use log::{debug, trace};
use nalgebra::{Scalar, Vector2};
use num_traits::{Float, FromPrimitive};

use super::FeedbackController;
use crate::utils::{
    clock::Clock,
    history::{SampleHistory, CUR, PREV},
    math::fsgn,
};

pub const DEFAULT_KP: f64 = 0.300086;
pub const DEFAULT_KI: f64 = 0.00002;
pub const DEFAULT_KD: f64 = 20.079;
pub const DEFAULT_KDD: f64 = 0.0;

/// Shortest sampling interval the difference and integral terms will use.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(35);
/// Per-axis command magnitude in [`ControlMode::MaxEffort`].
pub const MAX_EFFORT: f64 = 20.0;
/// A proportional gain equal to this selects [`ControlMode::MaxEffort`]
/// while [`PIDSettings::kp_sentinel`] is set.
pub const KP_BYPASS_SENTINEL: f64 = -1.0;

/// Number of error samples kept for the difference terms.
const HISTORY_LEN: usize = 3;

fn constant<T: FromPrimitive + Default>(value: f64) -> T {
    T::from_f64(value).unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Full four-term control law.
    #[default]
    Pid,
    /// Bang-bang override: fixed magnitude in the direction of the error.
    MaxEffort,
}

/// Gain applied to the one-step-older finite difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SecondTermGain {
    /// Reuses `kd`. This is the behavior existing tunings were made against;
    /// `kdd` is stored but has no effect.
    #[default]
    Derivative,
    /// Uses `kdd`.
    SecondDerivative,
}

#[derive(Clone, Copy, Debug, PartialEq, Builder)]
pub struct PIDGains<T: Float + FromPrimitive + Default> {
    #[builder(default = constant(DEFAULT_KP))]
    pub kp: T,

    #[builder(default = constant(DEFAULT_KI))]
    pub ki: T,

    #[builder(default = constant(DEFAULT_KD))]
    pub kd: T,

    #[builder(default = constant(DEFAULT_KDD))]
    pub kdd: T,
}

impl<T: Float + FromPrimitive + Default> Default for PIDGains<T> {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Builder)]
pub struct PIDSettings<T: Float + FromPrimitive + Default> {
    #[builder(default = MIN_SAMPLE_INTERVAL)]
    pub min_sample_interval: Duration,

    #[builder(default = constant(MAX_EFFORT))]
    pub max_effort: T,

    #[builder(default)]
    pub mode: ControlMode,

    #[builder(default = true)]
    pub kp_sentinel: bool,

    #[builder(default)]
    pub second_term_gain: SecondTermGain,
}

impl<T: Float + FromPrimitive + Default> Default for PIDSettings<T> {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Per-axis contributions of one PID tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PIDTerms<T: Scalar + Copy> {
    pub proportional: Vector2<T>,
    pub integral: Vector2<T>,
    pub derivative: Vector2<T>,
    pub second_derivative: Vector2<T>,
}

impl<T: Float + Scalar> PIDTerms<T> {
    /// The velocity command: all four terms added together.
    pub fn sum(&self) -> Vector2<T> {
        Vector2::new(
            self.proportional.x + self.integral.x + self.derivative.x + self.second_derivative.x,
            self.proportional.y + self.integral.y + self.derivative.y + self.second_derivative.y,
        )
    }
}

#[derive(Clone)]
pub struct PID<T: Float + FromPrimitive + AddAssign + Default + Scalar> {
    gains: PIDGains<T>,
    settings: PIDSettings<T>,
    history: SampleHistory<T, HISTORY_LEN>,
    error_sum: Vector2<T>, // Time-weighted integral of error
    clock: Box<dyn Clock>,
}

#[cfg(feature = "std")]
impl<T: Float + FromPrimitive + AddAssign + Default + Scalar> PID<T> {
    /// Creates a controller timed by the host's monotonic clock.
    pub fn new(gains: PIDGains<T>) -> Self {
        Self::with_clock(
            gains,
            PIDSettings::default(),
            crate::utils::clock::MonotonicClock::new(),
        )
    }
}

#[cfg(feature = "std")]
impl<T: Float + FromPrimitive + AddAssign + Default + Scalar> Default for PID<T> {
    fn default() -> Self {
        Self::new(PIDGains::default())
    }
}

impl<T: Float + FromPrimitive + AddAssign + Default + Scalar> PID<T> {
    pub fn with_clock(
        gains: PIDGains<T>,
        settings: PIDSettings<T>,
        clock: impl Clock + 'static,
    ) -> Self {
        let now = clock.now();
        PID {
            gains,
            settings,
            history: SampleHistory::filled(now, Vector2::zeros()),
            error_sum: Vector2::zeros(),
            clock: Box::new(clock),
        }
    }

    pub fn gains(&self) -> &PIDGains<T> {
        &self.gains
    }

    /// Clears all history, then installs `gains`.
    pub fn set_parameters(&mut self, gains: PIDGains<T>) {
        self.reset();
        debug!(
            "PID gains set: kp={:?} ki={:?} kd={:?} kdd={:?}",
            gains.kp, gains.ki, gains.kd, gains.kdd
        );
        self.gains = gains;
    }

    pub fn settings(&self) -> &PIDSettings<T> {
        &self.settings
    }

    /// Replaces the settings. History is kept.
    pub fn set_settings(&mut self, settings: PIDSettings<T>) {
        self.settings = settings;
    }

    /// Selects the control law. A sentinel `kp` still forces
    /// [`ControlMode::MaxEffort`] unless the sentinel is disabled.
    pub fn set_mode(&mut self, mode: ControlMode) {
        debug!("PID mode set to {:?}", mode);
        self.settings.mode = mode;
    }

    /// The control law the next tick will use.
    pub fn mode(&self) -> ControlMode {
        if self.settings.kp_sentinel && self.gains.kp == constant::<T>(KP_BYPASS_SENTINEL) {
            ControlMode::MaxEffort
        } else {
            self.settings.mode
        }
    }

    /// Zero error history stamped with the current time and a zero integral.
    /// Gains and settings are left alone.
    pub fn reset(&mut self) {
        self.history.fill(self.clock.now(), Vector2::zeros());
        self.error_sum = Vector2::zeros();
        debug!("PID history reset");
    }

    /// Runs one tick and returns the velocity command for `error`.
    pub fn process(&mut self, error: Vector2<T>) -> Vector2<T> {
        match self.process_terms(error) {
            Some(terms) => terms.sum(),
            None => {
                let max_effort = self.settings.max_effort;
                error.map(|e| max_effort * fsgn(e))
            }
        }
    }

    /// Runs one tick and returns the individual terms, or `None` in
    /// [`ControlMode::MaxEffort`], where history is not touched.
    pub fn process_terms(&mut self, error: Vector2<T>) -> Option<PIDTerms<T>> {
        if self.mode() == ControlMode::MaxEffort {
            return None;
        }

        self.unshift_error(error);

        let floor = self.settings.min_sample_interval;
        let current = self.history.value(CUR);
        let dt_cur = self.history.interval_ms(CUR, floor);
        let dt_prev = self.history.interval_ms(PREV, floor);
        let second_gain = match self.settings.second_term_gain {
            SecondTermGain::Derivative => self.gains.kd,
            SecondTermGain::SecondDerivative => self.gains.kdd,
        };

        let terms = PIDTerms {
            proportional: current.map(|e| self.gains.kp * e),
            integral: self.error_sum.map(|sum| self.gains.ki * sum),
            derivative: self
                .history
                .delta(CUR)
                .map(|de| self.gains.kd * de / dt_cur),
            second_derivative: self
                .history
                .delta(PREV)
                .map(|de| second_gain * de / dt_prev),
        };
        trace!("PID terms: {:?}", terms);
        Some(terms)
    }

    /// Pushes `error` stamped with the current time and accumulates the
    /// integral over the newest interval.
    fn unshift_error(&mut self, error: Vector2<T>) {
        self.history.push_front(self.clock.now(), error);
        let dt = self
            .history
            .interval_ms(CUR, self.settings.min_sample_interval);
        let current = self.history.value(CUR);
        self.error_sum.x += dt * current.x;
        self.error_sum.y += dt * current.y;
    }
}

impl<T: Float + FromPrimitive + AddAssign + Default + Scalar + Send> FeedbackController<T>
    for PID<T>
{
    fn update(&mut self, error: Vector2<T>) -> Vector2<T> {
        self.process(error)
    }

    fn reset(&mut self) {
        PID::reset(self);
    }
}

use core::time::Duration;

use nalgebra::{Scalar, Vector2};
use num_traits::{Float, FromPrimitive};

use super::math::floored_interval_ms;

/// Index of the newest sample.
pub const CUR: usize = 0;
/// Index of the sample one step older than [`CUR`].
pub const PREV: usize = 1;

/// Fixed-capacity history of timestamped 2D samples, newest first.
///
/// Timestamps and values are stored as pairs so they can never drift out of
/// step. Pushing overwrites the oldest slot by rotating the head index, so no
/// update moves or allocates memory.
#[derive(Clone, Debug)]
pub struct SampleHistory<T: Scalar + Copy, const N: usize> {
    data: [(Duration, Vector2<T>); N],
    head: usize,
}

impl<T: Float + FromPrimitive + Default + Scalar, const N: usize> SampleHistory<T, N> {
    /// Creates a history where every slot holds `(time, value)`.
    /// `N` must be at least 2, otherwise there is no difference to take;
    /// smaller histories are rejected at compile time.
    ///
    /// ```compile_fail
    /// use core::time::Duration;
    /// use nalgebra::Vector2;
    /// use planar_pid::utils::history::SampleHistory;
    ///
    /// let _ = SampleHistory::<f64, 1>::filled(Duration::ZERO, Vector2::zeros());
    /// ```
    pub fn filled(time: Duration, value: Vector2<T>) -> Self {
        const { assert!(N >= 2, "history needs at least two samples") };
        Self {
            data: [(time, value); N],
            head: 0,
        }
    }

    /// Overwrites every slot with `(time, value)`.
    pub fn fill(&mut self, time: Duration, value: Vector2<T>) {
        self.data = [(time, value); N];
        self.head = 0;
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Pushes a sample to the front, dropping the oldest one.
    pub fn push_front(&mut self, time: Duration, value: Vector2<T>) {
        self.head = (self.head + N - 1) % N;
        self.data[self.head] = (time, value);
    }

    fn slot(&self, idx: usize) -> &(Duration, Vector2<T>) {
        debug_assert!(idx < N);
        &self.data[(self.head + idx) % N]
    }

    /// Sample value `idx` steps back from the newest.
    pub fn value(&self, idx: usize) -> Vector2<T> {
        self.slot(idx).1
    }

    /// Timestamp `idx` steps back from the newest.
    pub fn time(&self, idx: usize) -> Duration {
        self.slot(idx).0
    }

    /// Componentwise `value(idx) - value(idx + 1)`.
    pub fn delta(&self, idx: usize) -> Vector2<T> {
        self.value(idx)
            .zip_map(&self.value(idx + 1), |newer, older| newer - older)
    }

    /// Milliseconds between sample `idx` and sample `idx + 1`, never less
    /// than `floor`.
    pub fn interval_ms(&self, idx: usize, floor: Duration) -> T {
        let ms = floored_interval_ms(
            self.time(idx).as_millis(),
            self.time(idx + 1).as_millis(),
            floor.as_millis(),
        );
        T::from_u128(ms).unwrap_or_default()
    }
}

use num_traits::Float;

/// Sign of a float with `fsgn(0) == 0`. NaN stays NaN.
pub fn fsgn<T: Float>(value: T) -> T {
    if value > T::zero() {
        T::one()
    } else if value < T::zero() {
        -T::one()
    } else {
        value
    }
}

/// `max(floor, current - previous)` in milliseconds, with a backwards step
/// saturating to zero before the floor applies.
pub fn floored_interval_ms(current_ms: u128, previous_ms: u128, floor_ms: u128) -> u128 {
    current_ms.saturating_sub(previous_ms).max(floor_ms)
}

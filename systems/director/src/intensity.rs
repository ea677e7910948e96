//! Scalar pressure signal fed by combat events.

use std::time::Duration;

use horde_core::MAX_INTENSITY;

/// Intensity accumulator clamped to `[0, MAX_INTENSITY]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Intensity {
    value: f32,
    last_bump: Option<Duration>,
    settled: Duration,
}

impl Intensity {
    /// Creates a calm accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0.0,
            last_bump: None,
            settled: Duration::ZERO,
        }
    }

    /// Current intensity.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Simulation time of the most recent qualifying event.
    #[must_use]
    pub const fn last_bump(&self) -> Option<Duration> {
        self.last_bump
    }

    /// Adds `amount` and records `now` as the latest qualifying event.
    ///
    /// Non-finite and non-positive amounts are ignored.
    pub fn bump(&mut self, amount: f32, now: Duration) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.value = (self.value + amount).clamp(0.0, MAX_INTENSITY);
        self.last_bump = Some(now);
    }

    /// Drains `rate` units per second over `dt`, never below zero.
    pub fn decay(&mut self, dt: Duration, rate: f32) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        self.value = (self.value - rate * dt.as_secs_f32()).clamp(0.0, MAX_INTENSITY);
    }

    /// Drains `dt` unconditionally and marks decay as applied through `now`.
    pub fn fade(&mut self, dt: Duration, now: Duration, rate: f32) {
        self.decay(dt, rate);
        self.settled = self.settled.max(now);
    }

    /// Drains the quiet span ending at `now`.
    ///
    /// Nothing happens until `window` has passed since the last bump. From
    /// then on decay covers everything since that bump or since the previous
    /// drain, whichever is later, so the outcome is independent of step size.
    pub fn settle(&mut self, now: Duration, window: Duration, rate: f32) {
        if !self.is_quiet(now, window) {
            return;
        }
        let from = self
            .last_bump
            .map_or(self.settled, |last| last.max(self.settled));
        self.decay(now.saturating_sub(from), rate);
        self.settled = self.settled.max(now);
    }

    /// Reports whether no qualifying event happened within `window` of `now`.
    #[must_use]
    pub fn is_quiet(&self, now: Duration, window: Duration) -> bool {
        !self
            .last_bump
            .is_some_and(|last| now.saturating_sub(last) < window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_then_decay_returns_to_zero() {
        let mut intensity = Intensity::new();
        intensity.bump(20.0 * 0.5, Duration::ZERO);
        assert_eq!(intensity.value(), 10.0);

        intensity.decay(Duration::from_secs(2), 5.0);
        assert_eq!(intensity.value(), 0.0);

        intensity.decay(Duration::from_secs(2), 5.0);
        assert_eq!(intensity.value(), 0.0);
    }

    #[test]
    fn bumps_saturate_at_maximum() {
        let mut intensity = Intensity::new();
        for step in 0..20 {
            intensity.bump(15.0, Duration::from_secs(step));
        }
        assert_eq!(intensity.value(), MAX_INTENSITY);
    }

    #[test]
    fn invalid_amounts_are_ignored() {
        let mut intensity = Intensity::new();
        intensity.bump(f32::NAN, Duration::ZERO);
        intensity.bump(-4.0, Duration::ZERO);
        intensity.bump(f32::INFINITY, Duration::ZERO);
        assert_eq!(intensity.value(), 0.0);
        assert!(intensity.last_bump().is_none());
    }

    #[test]
    fn quiet_only_after_the_recency_window() {
        let mut intensity = Intensity::new();
        let window = Duration::from_millis(1_500);
        assert!(intensity.is_quiet(Duration::ZERO, window));

        intensity.bump(3.0, Duration::from_secs(10));
        assert!(!intensity.is_quiet(Duration::from_millis(11_000), window));
        assert!(intensity.is_quiet(Duration::from_millis(11_500), window));
    }

    #[test]
    fn settled_decay_does_not_depend_on_step_size() {
        let window = Duration::from_millis(1_500);
        let mut stepped = Intensity::new();
        let mut single = Intensity::new();
        stepped.bump(10.0, Duration::ZERO);
        single.bump(10.0, Duration::ZERO);

        let mut now = Duration::ZERO;
        let end = Duration::from_millis(2_050);
        while now < end {
            now += Duration::from_millis(10);
            stepped.settle(now, window, 5.0);
        }
        single.settle(end, window, 5.0);

        assert_eq!(stepped.value(), 0.0);
        assert_eq!(single.value(), 0.0);
    }

    #[test]
    fn settling_inside_the_window_keeps_the_value() {
        let window = Duration::from_millis(1_500);
        let mut intensity = Intensity::new();
        intensity.bump(10.0, Duration::from_secs(4));
        intensity.settle(Duration::from_millis(5_000), window, 5.0);
        assert_eq!(intensity.value(), 10.0);

        intensity.settle(Duration::from_millis(5_500), window, 5.0);
        assert_eq!(intensity.value(), 2.5);
        intensity.settle(Duration::from_millis(5_700), window, 5.0);
        assert_eq!(intensity.value(), 1.5);
    }

    #[test]
    fn decay_strictly_decreases_until_zero() {
        let mut intensity = Intensity::new();
        intensity.bump(50.0, Duration::ZERO);
        let mut previous = intensity.value();
        while intensity.value() > 0.0 {
            intensity.decay(Duration::from_millis(100), 5.0);
            assert!(intensity.value() < previous);
            assert!(intensity.value() >= 0.0);
            previous = intensity.value();
        }
    }
}

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}

/// Session countdown, driven by explicit ticks rather than wall-clock reads.
#[derive(Clone, Debug)]
pub struct Countdown {
    limit: Duration,
    remaining: Duration,
    expired: bool,
}

impl Countdown {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            expired: limit.is_zero(),
        }
    }

    /// Advance by `dt`. Returns true only on the tick that runs out the clock.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.expired {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.expired = true;
            return true;
        }
        false
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn ratio(&self) -> f64 {
        if self.limit.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f64() / self.limit.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn urgency(&self) -> Urgency {
        let ratio = self.ratio();
        if ratio < 0.25 {
            Urgency::Critical
        } else if ratio < 0.5 {
            Urgency::Warning
        } else {
            Urgency::Calm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn test_expires_exactly_once() {
        let mut timer = Countdown::new(Duration::from_secs(1));
        let fired: usize = (0..30).filter(|_| timer.tick(TICK)).count();
        assert_eq!(fired, 1);
        assert!(timer.is_expired());
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_expires_on_tenth_tick() {
        let mut timer = Countdown::new(Duration::from_secs(1));
        for _ in 0..9 {
            assert!(!timer.tick(TICK));
        }
        assert!(timer.tick(TICK));
    }

    #[test]
    fn test_overshooting_tick_saturates() {
        let mut timer = Countdown::new(Duration::from_millis(150));
        assert!(timer.tick(Duration::from_secs(5)));
        assert_eq!(timer.ratio(), 0.0);
    }

    #[test]
    fn test_urgency_bands() {
        let mut timer = Countdown::new(Duration::from_secs(100));
        assert_eq!(timer.urgency(), Urgency::Calm);
        timer.tick(Duration::from_secs(51));
        assert_eq!(timer.urgency(), Urgency::Warning);
        timer.tick(Duration::from_secs(25));
        assert_eq!(timer.urgency(), Urgency::Critical);
    }

    #[test]
    fn test_zero_limit_starts_expired() {
        let mut timer = Countdown::new(Duration::ZERO);
        assert!(timer.is_expired());
        assert!(!timer.tick(TICK));
    }
}

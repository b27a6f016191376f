use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

/// This struct keeps track of virtual time in our network.
/// Time only advances when the scheduler executes an event,
/// never on its own; a nanosecond tick keeps event ordering exact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    pub const ZERO: SimTime = SimTime { nanos: 0 };

    pub fn from_nanos(nanos: u64) -> Self {
        SimTime { nanos }
    }

    /// Converts a duration in seconds, rounded to the nearest nanosecond.
    /// Negative inputs and NaN saturate to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime {
            nanos: (secs * 1e9).round() as u64,
        }
    }

    pub fn as_nanos(self) -> u64 {
        self.nanos
    }

    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, other: Duration) -> SimTime {
        SimTime {
            nanos: self.nanos + other.as_nanos() as u64,
        }
    }
}

impl AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, other: Duration) {
        *self = *self + other;
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, other: SimTime) -> Duration {
        Duration::from_nanos(self.nanos - other.nanos)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_durations() {
        let mut t = SimTime::ZERO;
        t += Duration::from_millis(3);
        t += Duration::from_nanos(204_800);
        assert_eq!(t.as_nanos(), 3_204_800);
        assert_eq!(t, SimTime::from_nanos(3_204_800));
    }

    #[test]
    fn converts_seconds_with_nanosecond_rounding() {
        assert_eq!(SimTime::from_secs_f64(1.5).as_nanos(), 1_500_000_000);
        assert_eq!(SimTime::from_secs_f64(2400.0).as_secs_f64(), 2400.0);
        assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    }

    #[test]
    fn subtraction_yields_a_duration() {
        let a = SimTime::from_secs_f64(2.0);
        let b = SimTime::from_secs_f64(0.5);
        assert_eq!(a - b, Duration::from_millis(1500));
    }
}

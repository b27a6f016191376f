use std::fmt;
use std::time::Duration;

/// A transmission rate in bits per second.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataRate {
    bits_per_sec: u64,
}

impl DataRate {
    pub fn from_bps(bits_per_sec: u64) -> Self {
        DataRate { bits_per_sec }
    }

    pub fn from_kbps(kilobits_per_sec: u64) -> Self {
        DataRate::from_bps(kilobits_per_sec * 1_000)
    }

    pub fn from_mbps(megabits_per_sec: u64) -> Self {
        DataRate::from_bps(megabits_per_sec * 1_000_000)
    }

    pub fn bits_per_sec(&self) -> u64 {
        self.bits_per_sec
    }

    /// Time to serialize `size_bytes` onto a medium of this rate,
    /// rounded up to the next nanosecond.
    pub fn transmission_time(&self, size_bytes: u32) -> Duration {
        debug_assert!(self.bits_per_sec > 0);
        let bps = u128::from(self.bits_per_sec.max(1));
        let bits = u128::from(size_bytes) * 8;
        let nanos = (bits * 1_000_000_000 + (bps - 1)) / bps;
        Duration::from_nanos(nanos.min(u128::from(u64::max_value())) as u64)
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.bits_per_sec >= 1_000_000 && self.bits_per_sec % 1_000_000 == 0 {
            write!(f, "{}Mbps", self.bits_per_sec / 1_000_000)
        } else if self.bits_per_sec >= 1_000 && self.bits_per_sec % 1_000 == 0 {
            write!(f, "{}kbps", self.bits_per_sec / 1_000)
        } else {
            write!(f, "{}bps", self.bits_per_sec)
        }
    }
}

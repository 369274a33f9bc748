use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch: Tuesday, March 31, 2020 08:44:28.888 UTC
///
/// Chosen once at design time; 41 bits of milliseconds past this origin last
/// roughly 69 years.
pub const FLAKE_EPOCH: Duration = Duration::from_millis(1_585_644_268_888);

/// The standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH_ORIGIN: Duration = Duration::from_millis(0);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests, so the backward-clock guard can be exercised without
/// real sleeping.
///
/// The timestamp type `T` is generic (typically `u64`), and the unit is
/// expected to be **milliseconds** relative to a configurable epoch.
///
/// # Example
///
/// ```
/// use driftflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> T;
}

/// A wall-clock time source, offset from a configurable epoch.
///
/// Every call reads `SystemTime::now()`. Deliberately so: the generators'
/// backward-clock guard exists to absorb wall-clock regressions (NTP steps,
/// manual adjustment), and a monotonic source would hide the very condition
/// the guard is specified to handle. Regression shows up as `current_millis`
/// returning a value below the generator's time base, which stalls issuance
/// rather than producing duplicate or decreasing IDs.
#[derive(Clone, Debug)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to the default [`FLAKE_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FLAKE_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since the Unix epoch.
    ///
    /// The epoch defines the zero-point for all timestamps returned by this
    /// clock, and therefore for the time field of every ID generated against
    /// it. All generator state derived from this clock is epoch-relative, so
    /// the pack step never re-subtracts the epoch.
    pub fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource<u64> for WallClock {
    /// Returns the number of milliseconds since the configured epoch.
    ///
    /// Saturates to zero if the system clock reads earlier than the epoch.
    ///
    /// # Panics
    ///
    /// Panics if the system clock reads earlier than the Unix epoch.
    fn current_millis(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH");
        now.saturating_sub(self.epoch).as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_epoch_relative() {
        let unix = WallClock::with_epoch(UNIX_EPOCH_ORIGIN);
        let flake = WallClock::default();

        let unix_now = unix.current_millis();
        let flake_now = flake.current_millis();

        // The flake-epoch reading is the unix reading minus the epoch offset,
        // modulo the time elapsed between the two calls.
        let expected = unix_now - FLAKE_EPOCH.as_millis() as u64;
        assert!(flake_now >= expected);
        assert!(flake_now - expected < 1_000);
    }
}

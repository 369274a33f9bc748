use core::cell::Cell;
use std::thread;

use tracing::warn;

use crate::{
    DriftflakeGenerator, DriftflakeId, IdGenStatus, RandSource, Result, TimeSource,
    generator::{CLOCK_POLL_INTERVAL, check_node_id},
};

/// A non-concurrent driftflake generator suitable for single-threaded
/// environments.
///
/// This generator is lightweight and fast, but **not thread-safe**.
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ Works with any [`DriftflakeId`] layout
///
/// ## Recommended When
/// - You're in a single-threaded environment (no shared access)
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockDriftflakeGenerator`]
/// - [`AtomicDriftflakeGenerator`]
///
/// [`LockDriftflakeGenerator`]: crate::LockDriftflakeGenerator
/// [`AtomicDriftflakeGenerator`]: crate::AtomicDriftflakeGenerator
pub struct BasicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    state: Cell<ID>,
    time: T,
    rng: R,
}

impl<ID, T, R> BasicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    /// Creates a new [`BasicDriftflakeGenerator`] seeded with the current
    /// time.
    ///
    /// The time base is captured from `time` once, here; afterwards it only
    /// advances when the sequence wraps. `initial_sequence` is masked to the
    /// layout's sequence width, so any starting value is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] if `node_id` does not fit the
    /// layout's node field.
    ///
    /// # Example
    /// ```
    /// use driftflake::{BasicDriftflakeGenerator, Driftflake64, ThreadRandom, WallClock};
    ///
    /// let generator = BasicDriftflakeGenerator::<Driftflake64, _, _>::new(
    ///     0,
    ///     0,
    ///     WallClock::default(),
    ///     ThreadRandom,
    /// )
    /// .unwrap();
    ///
    /// let id = generator.next_id();
    /// assert_eq!(id.node_id(), 0);
    /// ```
    ///
    /// [`Error::NodeIdOutOfRange`]: crate::Error::NodeIdOutOfRange
    pub fn new(node_id: ID::Ty, initial_sequence: ID::Ty, time: T, rng: R) -> Result<Self> {
        let now = time.current_millis();
        Self::from_components(now, initial_sequence & ID::max_sequence(), node_id, time, rng)
    }

    /// Creates a new generator from explicit component values.
    ///
    /// Useful for pinning the time base in tests or controlling the starting
    /// point manually. Unlike [`Self::new`], the sequence is taken as an
    /// exact field value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] if `node_id` does not fit the
    /// layout's node field.
    ///
    /// [`Error::NodeIdOutOfRange`]: crate::Error::NodeIdOutOfRange
    pub fn from_components(
        timestamp: ID::Ty,
        sequence: ID::Ty,
        node_id: ID::Ty,
        time: T,
        rng: R,
    ) -> Result<Self> {
        check_node_id::<ID>(node_id)?;
        let id = ID::from_components(timestamp, sequence, node_id, ID::ZERO);
        Ok(Self {
            state: Cell::new(id),
            time,
            rng,
        })
    }

    /// Returns the node ID this generator encodes into every ID.
    pub fn node_id(&self) -> ID::Ty {
        self.state.get().node_id()
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// Returns [`IdGenStatus::Pending`] only while the wall clock reads
    /// behind the generator's time base.
    pub fn poll_id(&self) -> IdGenStatus<ID> {
        let now = self.time.current_millis();
        let state = self.state.get();
        let base = state.timestamp();

        if now < base {
            return Self::cold_clock_behind(now, base);
        }

        let random = self.rng.rand() & ID::max_random();
        let next = if state.has_sequence_room() {
            state.increment_sequence(random)
        } else {
            state.advance_timestamp(random)
        };
        self.state.set(next);
        IdGenStatus::Ready { id: next }
    }

    /// Generates the next available ID, blocking while the wall clock reads
    /// behind the time base.
    ///
    /// The wait re-reads the clock every [`CLOCK_POLL_INTERVAL`] until it
    /// observes a value past the base, then proceeds with the base unchanged.
    /// There is no timeout: a persistently regressed clock stalls callers
    /// indefinitely, which is the intended trade of availability of *fresh*
    /// real-time stamps for monotonic, duplicate-free output.
    pub fn next_id(&self) -> ID {
        let mut stalled = false;
        loop {
            match self.poll_id() {
                IdGenStatus::Ready { id } => return id,
                IdGenStatus::Pending { yield_for } => {
                    if !stalled {
                        stalled = true;
                        warn!(
                            node_id = %self.node_id(),
                            yield_for = %yield_for,
                            "wall clock is behind the time base; stalling ID issuance"
                        );
                    }
                    thread::sleep(CLOCK_POLL_INTERVAL);
                }
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: ID::Ty, base: ID::Ty) -> IdGenStatus<ID> {
        // Wait out the guard until the clock reads strictly past the base.
        IdGenStatus::Pending {
            yield_for: base - now + ID::ONE,
        }
    }
}

impl<ID, T, R> DriftflakeGenerator<ID, T, R> for BasicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    fn new(node_id: ID::Ty, initial_sequence: ID::Ty, time: T, rng: R) -> Result<Self> {
        Self::new(node_id, initial_sequence, time, rng)
    }

    fn node_id(&self) -> ID::Ty {
        self.node_id()
    }

    fn poll_id(&self) -> IdGenStatus<ID> {
        self.poll_id()
    }

    fn next_id(&self) -> ID {
        self.next_id()
    }
}

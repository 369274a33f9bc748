use std::{sync::Arc, thread};

use parking_lot::Mutex;
use tracing::warn;

use crate::{
    DriftflakeGenerator, DriftflakeId, IdGenStatus, RandSource, Result, TimeSource,
    generator::{CLOCK_POLL_INTERVAL, check_node_id},
};

/// A lock-based driftflake generator suitable for multi-threaded
/// environments.
///
/// This generator wraps the packed state in an [`Arc<Mutex<_>>`], allowing
/// safe shared use across threads. The read-modify-write of the time base and
/// sequence, the random draw, and the pack all execute under one lock
/// acquisition, so two IDs issued at the same time base can never share a
/// sequence value.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Works with any [`DriftflakeId`] layout
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`BasicDriftflakeGenerator`]
/// - [`AtomicDriftflakeGenerator`]
///
/// [`BasicDriftflakeGenerator`]: crate::BasicDriftflakeGenerator
/// [`AtomicDriftflakeGenerator`]: crate::AtomicDriftflakeGenerator
pub struct LockDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<ID>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<ID>>,
    time: T,
    rng: R,
}

impl<ID, T, R> LockDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    /// Creates a new [`LockDriftflakeGenerator`] seeded with the current
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
    /// use driftflake::{Driftflake64, LockDriftflakeGenerator, ThreadRandom, WallClock};
    ///
    /// let generator = LockDriftflakeGenerator::<Driftflake64, _, _>::new(
    ///     5,
    ///     0,
    ///     WallClock::default(),
    ///     ThreadRandom,
    /// )
    /// .unwrap();
    ///
    /// let id = generator.next_id();
    /// assert_eq!(id.node_id(), 5);
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
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            time,
            rng,
        })
    }

    /// Returns the node ID this generator encodes into every ID.
    pub fn node_id(&self) -> ID::Ty {
        self.state.lock().node_id()
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// Returns [`IdGenStatus::Pending`] only while the wall clock reads
    /// behind the generator's time base.
    pub fn poll_id(&self) -> IdGenStatus<ID> {
        let now = self.time.current_millis();
        let mut id = self.state.lock();
        let base = id.timestamp();

        if now < base {
            return Self::cold_clock_behind(now, base);
        }

        let random = self.rng.rand() & ID::max_random();
        *id = if id.has_sequence_room() {
            id.increment_sequence(random)
        } else {
            id.advance_timestamp(random)
        };
        IdGenStatus::Ready { id: *id }
    }

    /// Generates the next available ID, blocking while the wall clock reads
    /// behind the time base.
    ///
    /// The wait re-reads the clock every [`CLOCK_POLL_INTERVAL`] until it
    /// observes a value past the base, then proceeds with the base unchanged.
    /// The lock is not held while sleeping; concurrent callers each poll and
    /// park on the same guard. There is no timeout: a persistently regressed
    /// clock stalls callers indefinitely rather than producing duplicate or
    /// decreasing IDs.
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

impl<ID, T, R> DriftflakeGenerator<ID, T, R> for LockDriftflakeGenerator<ID, T, R>
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

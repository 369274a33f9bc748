use core::marker::PhantomData;
use std::thread;

use portable_atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::{
    DriftflakeGenerator, DriftflakeId, IdGenStatus, RandSource, Result, TimeSource,
    generator::{CLOCK_POLL_INTERVAL, check_node_id},
};

/// A lock-free driftflake generator suitable for multi-threaded environments.
///
/// This generator stores the packed state in an [`AtomicU64`] and advances it
/// with a single compare-and-swap, preserving the exact ordering and
/// sequence-wrap semantics of the lock flavor. A failed CAS means another
/// thread advanced the state first; the caller retries immediately.
///
/// ## Features
/// - ✅ Thread-safe
/// - ❌ Works with any [`DriftflakeId`] layout
///
/// ## Caveats
/// The state lives in an [`AtomicU64`], so only layouts whose scalar type is
/// [`u64`] are supported.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`BasicDriftflakeGenerator`]
/// - [`LockDriftflakeGenerator`]
///
/// [`BasicDriftflakeGenerator`]: crate::BasicDriftflakeGenerator
/// [`LockDriftflakeGenerator`]: crate::LockDriftflakeGenerator
pub struct AtomicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId<Ty = u64>,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    time: T,
    rng: R,
    _id: PhantomData<ID>,
}

impl<ID, T, R> AtomicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId<Ty = u64>,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    /// Creates a new [`AtomicDriftflakeGenerator`] seeded with the current
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
    /// use driftflake::{AtomicDriftflakeGenerator, Driftflake64, ThreadRandom, WallClock};
    ///
    /// let generator = AtomicDriftflakeGenerator::<Driftflake64, _, _>::new(
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
        let initial = ID::from_components(timestamp, sequence, node_id, ID::ZERO);
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial.to_raw())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial.to_raw()),
            time,
            rng,
            _id: PhantomData,
        })
    }

    /// Returns the node ID this generator encodes into every ID.
    pub fn node_id(&self) -> ID::Ty {
        ID::from_raw(self.state.load(Ordering::Relaxed)).node_id()
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// Returns [`IdGenStatus::Pending`] while the wall clock reads behind
    /// the generator's time base, or with `yield_for` of zero when a CAS race
    /// was lost and the caller should retry immediately.
    pub fn poll_id(&self) -> IdGenStatus<ID> {
        let now = self.time.current_millis();

        let current_raw = self.state.load(Ordering::Relaxed);
        let current = ID::from_raw(current_raw);
        let base = current.timestamp();

        if now < base {
            return Self::cold_clock_behind(now, base);
        }

        let random = self.rng.rand() & ID::max_random();
        let next = if current.has_sequence_room() {
            current.increment_sequence(random)
        } else {
            current.advance_timestamp(random)
        };

        if self
            .state
            .compare_exchange(current_raw, next.to_raw(), Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            IdGenStatus::Ready { id: next }
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            IdGenStatus::Pending {
                yield_for: ID::ZERO,
            }
        }
    }

    /// Generates the next available ID, blocking while the wall clock reads
    /// behind the time base.
    ///
    /// Lost CAS races spin and retry at once; only the clock guard sleeps,
    /// re-reading the clock every [`CLOCK_POLL_INTERVAL`] until it observes a
    /// value past the base. There is no timeout on the guard.
    pub fn next_id(&self) -> ID {
        let mut stalled = false;
        loop {
            match self.poll_id() {
                IdGenStatus::Ready { id } => return id,
                IdGenStatus::Pending { yield_for } => {
                    if yield_for == ID::ZERO {
                        core::hint::spin_loop();
                        continue;
                    }
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

impl<ID, T, R> DriftflakeGenerator<ID, T, R> for AtomicDriftflakeGenerator<ID, T, R>
where
    ID: DriftflakeId<Ty = u64>,
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

use core::time::Duration;

use crate::{DriftflakeId, Error, IdGenStatus, RandSource, Result, TimeSource, ToU64};

/// How long a blocking `next_id` sleeps between clock polls while the
/// backward-clock guard is active. One unit of the clock's own granularity;
/// a bounded-interval poll rather than a pure spin.
pub const CLOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A minimal interface for driftflake generators.
///
/// Unifies the single-threaded, mutex, and lock-free flavors so callers (and
/// the shared test-suite) can be generic over the state discipline.
pub trait DriftflakeGenerator<ID, T, R>: Sized
where
    ID: DriftflakeId,
    T: TimeSource<ID::Ty>,
    R: RandSource<ID::Ty>,
{
    /// Creates a new generator seeded from the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] if `node_id` does not fit the
    /// layout's node field. This is the only validated precondition.
    fn new(node_id: ID::Ty, initial_sequence: ID::Ty, time: T, rng: R) -> Result<Self>;

    /// Returns the node ID this generator encodes into every ID.
    fn node_id(&self) -> ID::Ty;

    /// Attempts to generate the next available ID without blocking.
    fn poll_id(&self) -> IdGenStatus<ID>;

    /// Generates the next available ID, blocking while the wall clock reads
    /// behind the generator's time base.
    fn next_id(&self) -> ID;
}

/// Rejects node IDs that do not fit the layout's node field.
pub(crate) fn check_node_id<ID: DriftflakeId>(node_id: ID::Ty) -> Result<()> {
    if node_id > ID::max_node_id() {
        return Err(Error::NodeIdOutOfRange {
            node_id: node_id.to_u64(),
            max: ID::max_node_id().to_u64(),
        });
    }
    Ok(())
}

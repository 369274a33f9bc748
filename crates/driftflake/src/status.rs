use crate::DriftflakeId;

/// Represents the result of attempting to generate a new ID.
///
/// This type models the outcome of a generator's `poll_id()`:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was generated.
/// - [`IdGenStatus::Pending`] means the wall clock currently reads behind the
///   generator's time base — either because the clock regressed, or because
///   sequence wraps have driven the time base ahead of real time — and the
///   caller should wait for the clock to pass the base before retrying.
///
/// Sequence exhaustion never surfaces here: wrapping the sequence advances
/// the virtual time base instead of throttling.
///
/// # Example
///
/// ```
/// use driftflake::{
///     BasicDriftflakeGenerator, Driftflake64, IdGenStatus, ThreadRandom, WallClock,
/// };
///
/// let generator = BasicDriftflakeGenerator::<Driftflake64, _, _>::new(
///     0,
///     0,
///     WallClock::default(),
///     ThreadRandom,
/// )
/// .unwrap();
///
/// match generator.poll_id() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("clock behind base by: {yield_for}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus<T: DriftflakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: T,
    },
    /// No ID could be generated because the wall clock is behind the time
    /// base.
    ///
    /// `yield_for` is the number of clock units until the wall clock reads
    /// strictly past the time base. A value of zero means a lock-free
    /// generator lost a compare-and-swap race and the caller should retry
    /// immediately.
    Pending {
        /// Milliseconds until generation can resume.
        yield_for: T::Ty,
    },
}

use core::fmt;

/// A result type defaulting to this crate's [`Error`].
///
/// Generation itself is infallible: once a generator is constructed, it can
/// only ever stall, never fail. The sole fallible operation is construction.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `driftflake` can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The node ID passed at construction does not fit the layout's node
    /// field.
    ///
    /// Node IDs identify co-located generator instances and must be assigned
    /// uniquely by an external mechanism; a value outside the field range is
    /// a configuration mistake, reported immediately rather than masked.
    NodeIdOutOfRange {
        /// The rejected node ID.
        node_id: u64,
        /// The largest node ID the layout can encode.
        max: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeIdOutOfRange { node_id, max } => {
                write!(f, "node id {node_id} can't be greater than {max}")
            }
        }
    }
}

impl core::error::Error for Error {}

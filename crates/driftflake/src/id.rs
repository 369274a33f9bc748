use core::fmt;
use core::hash::Hash;
use core::ops::{Add, BitAnd, Sub};

/// Trait for converting field scalars into a `u64`.
///
/// Used to normalize a layout's scalar type for error reporting and logging,
/// regardless of which unsigned width the layout chose.
pub trait ToU64 {
    fn to_u64(self) -> u64;
}

impl ToU64 for u8 {
    fn to_u64(self) -> u64 {
        self as u64
    }
}

impl ToU64 for u16 {
    fn to_u64(self) -> u64 {
        self as u64
    }
}

impl ToU64 for u32 {
    fn to_u64(self) -> u64 {
        self as u64
    }
}

impl ToU64 for u64 {
    fn to_u64(self) -> u64 {
        self
    }
}

/// A trait representing a layout-compatible driftflake ID.
///
/// This trait abstracts a packed ID with separate bit fields for a virtual
/// time base, a sequence counter, a node ID, and a random tail. The field
/// widths are properties of the implementing type, so a deployment that needs
/// a different balance (more node bits, fewer random bits) defines another
/// layout and reuses the generators unchanged.
///
/// # Example
///
/// ```
/// use driftflake::{Driftflake64, DriftflakeId};
///
/// let id = Driftflake64::from(1000, 2, 5, 9);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.sequence(), 2);
/// assert_eq!(id.node_id(), 5);
/// assert_eq!(id.random(), 9);
/// ```
pub trait DriftflakeId:
    Sized + Copy + Clone + fmt::Display + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Scalar type for all bit fields (typically `u64`)
    type Ty: Copy
        + Clone
        + Add<Output = Self::Ty>
        + Sub<Output = Self::Ty>
        + BitAnd<Output = Self::Ty>
        + Ord
        + PartialOrd
        + Eq
        + PartialEq
        + Hash
        + ToU64
        + fmt::Debug
        + fmt::Display;

    /// Zero value (used for resetting the sequence)
    const ZERO: Self::Ty;

    /// One value (used for advancing the sequence and the time base)
    const ONE: Self::Ty;

    /// Returns the time-base portion of the ID.
    fn timestamp(&self) -> Self::Ty;

    /// Returns the maximum possible value for the time field.
    fn max_timestamp() -> Self::Ty;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> Self::Ty;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> Self::Ty;

    /// Returns the node ID portion of the ID.
    fn node_id(&self) -> Self::Ty;

    /// Returns the maximum possible value for the node ID field.
    fn max_node_id() -> Self::Ty;

    /// Returns the random portion of the ID.
    fn random(&self) -> Self::Ty;

    /// Returns the maximum possible value for the random field.
    fn max_random() -> Self::Ty;

    /// Constructs a new ID from its components.
    fn from_components(
        timestamp: Self::Ty,
        sequence: Self::Ty,
        node_id: Self::Ty,
        random: Self::Ty,
    ) -> Self;

    /// Converts this type into its raw representation
    fn to_raw(&self) -> Self::Ty;

    /// Converts a raw value into this type
    fn from_raw(raw: Self::Ty) -> Self;

    /// Returns true if the current sequence value can be incremented without
    /// wrapping.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns the next sequence value.
    fn next_sequence(&self) -> Self::Ty {
        self.sequence() + Self::ONE
    }

    /// Returns the next ID at the current time base: sequence advanced by
    /// one, random tail replaced.
    fn increment_sequence(&self, random: Self::Ty) -> Self {
        Self::from_components(
            self.timestamp(),
            self.next_sequence(),
            self.node_id(),
            random,
        )
    }

    /// Returns the first ID of the next time-base unit: time advanced by one,
    /// sequence reset to zero, random tail replaced.
    ///
    /// The advance is driven purely by sequence wrap, never by the wall
    /// clock, so the time base may run ahead of real time under load.
    fn advance_timestamp(&self, random: Self::Ty) -> Self {
        Self::from_components(
            self.timestamp() + Self::ONE,
            Self::ZERO,
            self.node_id(),
            random,
        )
    }

    fn to_padded_string(&self) -> String;
}

/// A 64-bit driftflake ID
///
/// - 1 bit reserved (sign, always zero)
/// - 41 bits virtual time base (ms since [`FLAKE_EPOCH`])
/// - 12 bits sequence
/// - 6 bits node ID
/// - 4 bits random tail
///
/// ```text
///  Bit Index:  63           63 62            22 21             10 9           4 3          0
///              +--------------+----------------+-----------------+-------------+------------+
///  Field:      | reserved (1) | timestamp (41) |  sequence (12)  |  node (6)   | random (4) |
///              +--------------+----------------+-----------------+-------------+------------+
///              |<------------- MSB ------------- 64 bits ------------- LSB ---------------->|
/// ```
///
/// The random tail is an anti-collision tie-breaker for misconfigured
/// deployments where two generators share a node ID; it is not a security
/// control.
///
/// [`FLAKE_EPOCH`]: crate::FLAKE_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Driftflake64 {
    id: u64,
}

impl Driftflake64 {
    /// Width of the time field.
    pub const TIMESTAMP_BITS: u64 = 41;

    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u64 = 12;

    /// Width of the node ID field.
    pub const NODE_ID_BITS: u64 = 6;

    /// Width of the random field.
    pub const RANDOM_BITS: u64 = 4;

    /// Bitmask for extracting the 41-bit time field. Occupies bits 22 through
    /// 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 10
    /// through 21.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Bitmask for extracting the 6-bit node ID field. Occupies bits 4
    /// through 9.
    pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;

    /// Bitmask for extracting the 4-bit random field. Occupies bits 0 through
    /// 3.
    pub const RANDOM_MASK: u64 = (1 << Self::RANDOM_BITS) - 1;

    /// Number of bits to shift the time field to its correct position (bit
    /// 22).
    pub const TIMESTAMP_SHIFT: u64 = Self::SEQUENCE_BITS + Self::NODE_ID_BITS + Self::RANDOM_BITS;

    /// Number of bits to shift the sequence field to its correct position
    /// (bit 10).
    pub const SEQUENCE_SHIFT: u64 = Self::NODE_ID_BITS + Self::RANDOM_BITS;

    /// Number of bits to shift the node ID field to its correct position (bit
    /// 4).
    pub const NODE_ID_SHIFT: u64 = Self::RANDOM_BITS;

    /// Number of bits to shift the random field (bit 0).
    pub const RANDOM_SHIFT: u64 = 0;

    pub const fn from(timestamp: u64, sequence: u64, node_id: u64, random: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let random = (random & Self::RANDOM_MASK) << Self::RANDOM_SHIFT;
        Self {
            id: timestamp | sequence | node_id | random,
        }
    }

    /// Extracts the time base from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the random tail from the packed ID.
    pub const fn random(&self) -> u64 {
        (self.id >> Self::RANDOM_SHIFT) & Self::RANDOM_MASK
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl DriftflakeId for Driftflake64 {
    type Ty = u64;

    const ZERO: Self::Ty = 0;
    const ONE: Self::Ty = 1;

    fn timestamp(&self) -> Self::Ty {
        self.timestamp()
    }

    fn max_timestamp() -> Self::Ty {
        Self::TIMESTAMP_MASK
    }

    fn sequence(&self) -> Self::Ty {
        self.sequence()
    }

    fn max_sequence() -> Self::Ty {
        Self::SEQUENCE_MASK
    }

    fn node_id(&self) -> Self::Ty {
        self.node_id()
    }

    fn max_node_id() -> Self::Ty {
        Self::NODE_ID_MASK
    }

    fn random(&self) -> Self::Ty {
        self.random()
    }

    fn max_random() -> Self::Ty {
        Self::RANDOM_MASK
    }

    fn from_components(
        timestamp: Self::Ty,
        sequence: Self::Ty,
        node_id: Self::Ty,
        random: Self::Ty,
    ) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        debug_assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
        debug_assert!(random <= Self::RANDOM_MASK, "random overflow");
        Self::from(timestamp, sequence, node_id, random)
    }

    fn to_raw(&self) -> Self::Ty {
        self.id
    }

    fn from_raw(raw: Self::Ty) -> Self {
        Self { id: raw }
    }

    fn to_padded_string(&self) -> String {
        self.to_padded_string()
    }
}

impl fmt::Display for Driftflake64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Driftflake64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driftflake64")
            .field("timestamp", &self.timestamp())
            .field("sequence", &self.sequence())
            .field("node_id", &self.node_id())
            .field("random", &self.random())
            .field("raw", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_bounds_round_trip() {
        let ts = Driftflake64::max_timestamp();
        let seq = Driftflake64::max_sequence();
        let node = Driftflake64::max_node_id();
        let random = Driftflake64::max_random();

        let id = Driftflake64::from(ts, seq, node, random);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.node_id(), node);
        assert_eq!(id.random(), random);
        assert_eq!(Driftflake64::from_components(ts, seq, node, random), id);
    }

    #[test]
    fn pack_law_matches_field_shifts() {
        let id = Driftflake64::from(1, 2, 3, 4);
        assert_eq!(id.to_raw(), (1 << 22) | (2 << 10) | (3 << 4) | 4);
    }

    #[test]
    fn layout_fills_sixty_three_bits() {
        assert_eq!(
            Driftflake64::TIMESTAMP_BITS
                + Driftflake64::SEQUENCE_BITS
                + Driftflake64::NODE_ID_BITS
                + Driftflake64::RANDOM_BITS,
            63
        );
        // The sign bit stays clear even when every field is saturated.
        let id = Driftflake64::from(
            Driftflake64::max_timestamp(),
            Driftflake64::max_sequence(),
            Driftflake64::max_node_id(),
            Driftflake64::max_random(),
        );
        assert_eq!(id.to_raw() >> 63, 0);
    }

    #[test]
    fn node_id_occupies_bits_four_through_nine() {
        let id = Driftflake64::from(1000, 7, 42, 3);
        assert_eq!((id.to_raw() >> 4) & 0x3F, 42);
    }

    #[test]
    fn sequence_step_dominates_random_tail() {
        let lo = Driftflake64::from(1000, 7, 5, Driftflake64::max_random());
        let hi = Driftflake64::from(1000, 8, 5, 0);
        assert!(hi > lo);
    }

    #[test]
    fn timestamp_step_dominates_sequence_wrap() {
        let lo = Driftflake64::from(1000, Driftflake64::max_sequence(), 5, 0);
        let hi = Driftflake64::from(1001, 0, 5, 0);
        assert!(hi > lo);
    }

    #[test]
    fn advance_timestamp_resets_sequence() {
        let id = Driftflake64::from(1000, Driftflake64::max_sequence(), 5, 2);
        let next = id.advance_timestamp(9);
        assert_eq!(next.timestamp(), 1001);
        assert_eq!(next.sequence(), 0);
        assert_eq!(next.node_id(), 5);
        assert_eq!(next.random(), 9);
    }

    #[test]
    fn display_and_padding() {
        let id = Driftflake64::from(1, 0, 0, 0);
        assert_eq!(format!("{id}"), (1u64 << 22).to_string());
        assert_eq!(id.to_padded_string().len(), 20);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        let ts = Driftflake64::max_timestamp() + 1;
        Driftflake64::from_components(ts, 0, 0, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        let seq = Driftflake64::max_sequence() + 1;
        Driftflake64::from_components(0, seq, 0, 0);
    }

    #[test]
    #[should_panic(expected = "node_id overflow")]
    fn node_id_overflow_panics() {
        let node = Driftflake64::max_node_id() + 1;
        Driftflake64::from_components(0, 0, node, 0);
    }

    #[test]
    #[should_panic(expected = "random overflow")]
    fn random_overflow_panics() {
        let random = Driftflake64::max_random() + 1;
        Driftflake64::from_components(0, 0, 0, random);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let id = Driftflake64::from(1234, 56, 7, 8);
        let json = serde_json::to_string(&id).unwrap();
        let back: Driftflake64 = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

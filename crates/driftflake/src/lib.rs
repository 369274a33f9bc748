//! Time-ordered 64-bit unique IDs with a drifting virtual time base.
//!
//! A generator seeds its time base from the wall clock once, at construction.
//! From then on the base advances only when the 12-bit sequence wraps, and a
//! backward-clock guard stalls issuance whenever the wall clock reads behind
//! the base — so IDs never repeat and never decrease, even across clock
//! regressions, at the cost of the encoded timestamp lagging or leading real
//! time.
//!
//! ```
//! use driftflake::{Driftflake64, LockDriftflakeGenerator, ThreadRandom, WallClock};
//!
//! let generator = LockDriftflakeGenerator::<Driftflake64, _, _>::new(
//!     0,                    // node id, unique per instance
//!     0,                    // initial sequence
//!     WallClock::default(), // wall clock relative to FLAKE_EPOCH
//!     ThreadRandom,         // fills the 4-bit anti-collision tail
//! )
//! .unwrap();
//!
//! let a = generator.next_id();
//! let b = generator.next_id();
//! assert!(b > a);
//! ```

mod error;
mod generator;
mod id;
mod rand;
mod status;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::status::*;
pub use crate::time::*;

//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, opaque ids and (behind `server`) the
//! shared API state with the system router.
//!
//! ## ID generation
//! Use `opaque_id!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use cohort_kernel::opaque_id;
//! let id = opaque_id!();
//! assert_eq!(id.len(), 16);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Length of ids produced by [`opaque_id!`] without an explicit size.
pub const OPAQUE_ID_LEN: usize = 16;

pub use cohort_domain as domain;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! opaque_id {
    () => {
        $crate::nanoid!({ $crate::OPAQUE_ID_LEN }, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!({ $size }, $crate::SAFE_ALPHABET)
    };
}

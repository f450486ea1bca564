//! Fixed-window Rabin-Karp rolling hash.
//!
//! A [`RollingHasher`] is built once per window length and then produces the
//! hash of every window position of a buffer in O(1) per position:
//!
//! ```
//! use rkhash::{compute_hashes, RollingHasher};
//!
//! let hasher = RollingHasher::<u64>::new(4usize)?;
//! let hashes = compute_hashes(&hasher, b"abcde");
//! assert_eq!(hashes, vec![hasher.direct_hash(b"abcd"), hasher.direct_hash(b"bcde")]);
//! # Ok::<(), rkhash::ConfigError>(())
//! ```

pub mod batch;
pub mod error;
pub mod header;
pub mod roller;
pub mod rolling_hash;
pub mod verify;
pub mod word;

pub use batch::{compute_hashes, par_compute_hashes, window_count, Hashes};
pub use error::{ConfigError, HeaderError};
pub use header::{Header, Properties};
pub use roller::WindowRoller;
pub use rolling_hash::{RollingHasher, WindowLength};
pub use verify::{
    check_equivalence, seeded_bytes, sensitivity, spot_check, Mismatch, SensitivityReport,
    SensitivityWindowTooLarge,
};
pub use word::HashWord;

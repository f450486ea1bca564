//! Rabin-Karp polynomial rolling hash over a fixed-size window.
//!
//! The hash of a window `s` is `Σ s[k] * base^(w-1-k)` evaluated in
//! wraparound arithmetic. Sliding the window by one byte subtracts the
//! leading byte's contribution (looked up in a 256-entry table), multiplies
//! by the base and adds the incoming byte.
use std::fmt;

use tracing::debug;

use crate::error::ConfigError;
use crate::word::HashWord;

/// Number of bytes contributing to each hash. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowLength(usize);

impl WindowLength {
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::InvalidWindowLength { len: 0 });
        }
        Ok(Self(len))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for WindowLength {
    type Error = ConfigError;

    fn try_from(len: usize) -> Result<Self, Self::Error> {
        Self::new(len)
    }
}

impl TryFrom<i64> for WindowLength {
    type Error = ConfigError;

    fn try_from(len: i64) -> Result<Self, Self::Error> {
        if len <= 0 {
            return Err(ConfigError::InvalidWindowLength { len });
        }
        let len = usize::try_from(len)
            .map_err(|_| ConfigError::WindowTooLarge { len: len as u128 })?;
        Self::new(len)
    }
}

impl fmt::Display for WindowLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable rolling hasher for one window length.
///
/// Cheap to share: every method takes `&self`, so one instance can serve
/// any number of buffers and threads at once.
#[derive(Clone)]
pub struct RollingHasher<W: HashWord = u64> {
    window: WindowLength,
    base: W,
    /// `base^(window-1)`, the weight of the oldest byte in a window.
    oldest_coefficient: W,
    removal: Box<[W; 256]>,
}

impl<W: HashWord> RollingHasher<W> {
    /// Build a hasher with the default base for `W`.
    pub fn new<L>(window: L) -> Result<Self, ConfigError>
    where
        L: TryInto<WindowLength, Error = ConfigError>,
    {
        Self::with_base(window, W::DEFAULT_BASE)
    }

    /// Build a hasher with a caller-chosen base multiplier.
    ///
    /// Any base of at least 2 yields a valid rolling hash. Odd bases are
    /// invertible modulo `2^BITS`, which guarantees that changing a single
    /// byte of a window always changes its hash.
    pub fn with_base<L>(window: L, base: W) -> Result<Self, ConfigError>
    where
        L: TryInto<WindowLength, Error = ConfigError>,
    {
        let window = window.try_into()?;
        if base == W::ZERO || base == W::ONE {
            return Err(ConfigError::DegenerateBase {
                base: if base == W::ZERO { 0 } else { 1 },
            });
        }

        let oldest_coefficient = base.wrapping_pow_usize(window.get() - 1);

        let mut removal = Box::new([W::ZERO; 256]);
        for (byte, slot) in removal.iter_mut().enumerate() {
            *slot = W::from_byte(byte as u8).wrapping_mul(oldest_coefficient);
        }

        debug!(
            window = window.get(),
            bits = W::BITS,
            "Built rolling hasher with base {:#x}",
            base
        );

        Ok(Self {
            window,
            base,
            oldest_coefficient,
            removal,
        })
    }

    pub fn window_len(&self) -> usize {
        self.window.get()
    }

    pub fn window(&self) -> WindowLength {
        self.window
    }

    pub fn base(&self) -> W {
        self.base
    }

    pub fn oldest_coefficient(&self) -> W {
        self.oldest_coefficient
    }

    /// Hash a slice of any length from scratch (Horner's method).
    ///
    /// This is the ground truth the rolling update is checked against.
    /// The empty slice hashes to zero.
    pub fn direct_hash(&self, data: &[u8]) -> W {
        data.iter().fold(W::ZERO, |acc, &byte| {
            acc.wrapping_mul(self.base).wrapping_add(W::from_byte(byte))
        })
    }

    /// Slide the window one byte: drop `outgoing` from the front, append
    /// `incoming` at the back.
    ///
    /// If `current` is the direct hash of a window starting with `outgoing`,
    /// the result is the direct hash of that window shifted by one byte with
    /// `incoming` at its end.
    #[inline]
    pub fn roll_next(&self, current: W, outgoing: u8, incoming: u8) -> W {
        current
            .wrapping_sub(self.removal[outgoing as usize])
            .wrapping_mul(self.base)
            .wrapping_add(W::from_byte(incoming))
    }
}

impl<W: HashWord> fmt::Debug for RollingHasher<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingHasher")
            .field("window", &self.window.get())
            .field("bits", &W::BITS)
            .field("base", &format_args!("{:#x}", self.base))
            .field("oldest_coefficient", &format_args!("{:#x}", self.oldest_coefficient))
            .finish_non_exhaustive()
    }
}

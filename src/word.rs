use std::fmt::{Debug, LowerHex};
use std::hash::Hash;

/// Unsigned integer type a rolling hash is computed in.
///
/// Every operation wraps modulo `2^BITS`. The telescoping identity between
/// [`RollingHasher::direct_hash`](crate::RollingHasher::direct_hash) and
/// [`RollingHasher::roll_next`](crate::RollingHasher::roll_next) only holds
/// under wrapping arithmetic, so implementors must never trap on overflow.
pub trait HashWord: Copy + Eq + Hash + Debug + LowerHex + Send + Sync + 'static {
    /// Width of the hash in bits.
    const BITS: u32;

    const ZERO: Self;

    const ONE: Self;

    /// Odd multiplier used when the caller does not pick a base.
    const DEFAULT_BASE: Self;

    fn from_byte(byte: u8) -> Self;

    /// Narrow a `u128` into this width, or `None` if it does not fit.
    fn from_u128(value: u128) -> Option<Self>;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;

    fn wrapping_mul(self, rhs: Self) -> Self;

    /// `self^exp` by square-and-multiply.
    fn wrapping_pow_usize(self, mut exp: usize) -> Self {
        let mut base = self;
        let mut acc = Self::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc.wrapping_mul(base);
            }
            base = base.wrapping_mul(base);
            exp >>= 1;
        }
        acc
    }
}

macro_rules! implement_hash_word_for_unsigned {
    ($t:ty, $base:expr) => {
        impl $crate::word::HashWord for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const DEFAULT_BASE: Self = $base;

            #[inline]
            fn from_byte(byte: u8) -> Self {
                Self::from(byte)
            }

            fn from_u128(value: u128) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline]
            fn wrapping_mul(self, rhs: Self) -> Self {
                <$t>::wrapping_mul(self, rhs)
            }
        }
    };
}

implement_hash_word_for_unsigned! {u32, 0xd41d_5da1}
implement_hash_word_for_unsigned! {u64, 0x97b5_48ad_d41d_5da1}
implement_hash_word_for_unsigned! {u128, 0x2f6b_5a3e_c7d1_9e35_97b5_48ad_d41d_5da1}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bases_are_odd() {
        assert_eq!(<u32 as HashWord>::DEFAULT_BASE & 1, 1);
        assert_eq!(<u64 as HashWord>::DEFAULT_BASE & 1, 1);
        assert_eq!(<u128 as HashWord>::DEFAULT_BASE & 1, 1);
    }

    #[test]
    fn test_pow_matches_repeated_multiplication() {
        let base = <u64 as HashWord>::DEFAULT_BASE;
        let mut expected: u64 = 1;
        for exp in 0..70 {
            assert_eq!(base.wrapping_pow_usize(exp), expected, "exponent {}", exp);
            expected = expected.wrapping_mul(base);
        }
    }

    #[test]
    fn test_pow_zero_exponent() {
        assert_eq!(7u32.wrapping_pow_usize(0), 1);
        assert_eq!(0u128.wrapping_pow_usize(0), 1);
    }

    #[test]
    fn test_from_u128_narrowing() {
        assert_eq!(<u32 as HashWord>::from_u128(0xffff_ffff), Some(u32::MAX));
        assert_eq!(<u32 as HashWord>::from_u128(0x1_0000_0000), None);
        assert_eq!(<u64 as HashWord>::from_u128(u64::MAX as u128), Some(u64::MAX));
        assert_eq!(<u128 as HashWord>::from_u128(u128::MAX), Some(u128::MAX));
    }
}

//! Agreement checks between the rolling sequence and from-scratch hashes.

use thiserror::Error;
use tracing::{debug, warn};

use crate::batch::window_count;
use crate::rolling_hash::RollingHasher;
use crate::word::HashWord;

/// A window whose rolling hash disagrees with its direct hash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rolling hash {rolling:#x} differs from direct hash {direct:#x} at position {position}")]
pub struct Mismatch<W: HashWord> {
    pub position: usize,
    pub rolling: W,
    pub direct: W,
}

/// Reproducible pseudo-random buffer for tests and self-checks.
pub fn seeded_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data);
    data
}

/// Compare every rolling hash in `data` against a fresh direct hash.
///
/// Returns the number of windows checked, or the first disagreement.
pub fn check_equivalence<W: HashWord>(
    hasher: &RollingHasher<W>,
    data: &[u8],
) -> Result<usize, Mismatch<W>> {
    let w = hasher.window_len();
    let mut checked = 0;
    for (position, rolling) in hasher.hashes(data).enumerate() {
        let direct = hasher.direct_hash(&data[position..position + w]);
        if rolling != direct {
            let mismatch = Mismatch {
                position,
                rolling,
                direct,
            };
            warn!("{}", mismatch);
            return Err(mismatch);
        }
        checked += 1;
    }
    debug!(windows = checked, window = w, "Rolling hashes verified");
    Ok(checked)
}

/// Check `samples` randomly chosen positions instead of all of them.
///
/// The rolling sequence is still computed in full; only the direct hashes
/// are sampled. Returns the number of positions checked.
pub fn spot_check<W: HashWord>(
    hasher: &RollingHasher<W>,
    data: &[u8],
    samples: usize,
    seed: u64,
) -> Result<usize, Mismatch<W>> {
    let w = hasher.window_len();
    let count = window_count(w, data.len());
    if count == 0 {
        return Ok(0);
    }

    let hashes: Vec<W> = hasher.hashes(data).collect();
    let mut rng = fastrand::Rng::with_seed(seed);
    for _ in 0..samples {
        let position = rng.usize(..count);
        let direct = hasher.direct_hash(&data[position..position + w]);
        if hashes[position] != direct {
            let mismatch = Mismatch {
                position,
                rolling: hashes[position],
                direct,
            };
            warn!("{}", mismatch);
            return Err(mismatch);
        }
    }
    Ok(samples)
}

/// Longest window [`sensitivity`] will materialize.
pub const MAX_SENSITIVITY_WINDOW: usize = 1 << 20;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("window of {len} bytes exceeds the {max}-byte limit of the sensitivity check")]
pub struct SensitivityWindowTooLarge {
    pub len: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitivityReport {
    pub trials: usize,
    /// Trials where substituting one byte left the hash unchanged.
    pub unchanged: usize,
}

/// Substitute one byte in random windows and count unchanged hashes.
///
/// With an odd base the count is always zero: the hash moves by
/// `d * base^k` with `0 < |d| < 256`, which never vanishes modulo `2^BITS`.
///
/// Each trial builds a whole window in memory, so windows longer than
/// [`MAX_SENSITIVITY_WINDOW`] are refused.
pub fn sensitivity<W: HashWord>(
    hasher: &RollingHasher<W>,
    trials: usize,
    seed: u64,
) -> Result<SensitivityReport, SensitivityWindowTooLarge> {
    let w = hasher.window_len();
    if w > MAX_SENSITIVITY_WINDOW {
        return Err(SensitivityWindowTooLarge {
            len: w,
            max: MAX_SENSITIVITY_WINDOW,
        });
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut window = vec![0u8; w];
    let mut unchanged = 0;

    for _ in 0..trials {
        rng.fill(&mut window);
        let before = hasher.direct_hash(&window);

        let idx = rng.usize(..w);
        let old = window[idx];
        window[idx] = old.wrapping_add(rng.u8(1..=255));

        if hasher.direct_hash(&window) == before {
            unchanged += 1;
        }
    }

    debug!(trials, unchanged, "Sensitivity probe finished");
    Ok(SensitivityReport { trials, unchanged })
}

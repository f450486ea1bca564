use std::iter::FusedIterator;

use rayon::prelude::*;

use crate::rolling_hash::RollingHasher;
use crate::word::HashWord;

/// Lazy sequence of window hashes over one buffer.
///
/// The first window is hashed directly; every later position costs one
/// [`RollingHasher::roll_next`] call.
#[derive(Debug, Clone)]
pub struct Hashes<'a, W: HashWord> {
    hasher: &'a RollingHasher<W>,
    data: &'a [u8],
    /// Start of the next window to emit.
    pos: usize,
    current: Option<W>,
}

impl<'a, W: HashWord> Hashes<'a, W> {
    fn new(hasher: &'a RollingHasher<W>, data: &'a [u8]) -> Self {
        Self {
            hasher,
            data,
            pos: 0,
            current: None,
        }
    }

    fn remaining(&self) -> usize {
        match self.data.len().checked_sub(self.hasher.window_len()) {
            Some(last) if self.pos <= last => last - self.pos + 1,
            _ => 0,
        }
    }
}

impl<W: HashWord> Iterator for Hashes<'_, W> {
    type Item = W;

    fn next(&mut self) -> Option<W> {
        if self.remaining() == 0 {
            return None;
        }

        let w = self.hasher.window_len();
        let hash = match self.current {
            None => self.hasher.direct_hash(&self.data[..w]),
            Some(prev) => self.hasher.roll_next(
                prev,
                self.data[self.pos - 1],
                self.data[self.pos + w - 1],
            ),
        };

        self.current = Some(hash);
        self.pos += 1;
        Some(hash)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<W: HashWord> ExactSizeIterator for Hashes<'_, W> {}

impl<W: HashWord> FusedIterator for Hashes<'_, W> {}

impl<W: HashWord> RollingHasher<W> {
    /// Iterate over the hash of every window position in `data`.
    pub fn hashes<'a>(&'a self, data: &'a [u8]) -> Hashes<'a, W> {
        Hashes::new(self, data)
    }
}

/// Number of window positions in a buffer of `len` bytes.
pub fn window_count(window_len: usize, len: usize) -> usize {
    len.checked_sub(window_len).map_or(0, |last| last + 1)
}

/// Compute the hash of every window position in `data`.
///
/// Returns `max(0, data.len() - w + 1)` values; a buffer shorter than the
/// window yields an empty vector.
pub fn compute_hashes<W: HashWord>(hasher: &RollingHasher<W>, data: &[u8]) -> Vec<W> {
    hasher.hashes(data).collect()
}

/// Same output as [`compute_hashes`], computed on the rayon pool.
///
/// Window positions are split into runs of `segment` positions. Each run is
/// seeded with its own direct hash and rolled independently, so runs share
/// nothing but the read-only hasher. A `segment` of 0 means one run.
pub fn par_compute_hashes<W: HashWord>(
    hasher: &RollingHasher<W>,
    data: &[u8],
    segment: usize,
) -> Vec<W> {
    let w = hasher.window_len();
    let count = window_count(w, data.len());
    if count == 0 {
        return Vec::new();
    }
    let segment = if segment == 0 { count } else { segment };

    let mut out = vec![W::ZERO; count];
    out.par_chunks_mut(segment)
        .enumerate()
        .for_each(|(idx, chunk)| {
            let start = idx * segment;
            let span = &data[start..start + chunk.len() + w - 1];
            for (slot, hash) in chunk.iter_mut().zip(hasher.hashes(span)) {
                *slot = hash;
            }
        });
    out
}

use crate::rolling_hash::RollingHasher;
use crate::word::HashWord;

/// Byte-at-a-time form of the rolling hash for data that arrives in pieces.
///
/// Keeps the last `w` bytes in a ring buffer so the outgoing byte is known
/// when the window slides. Feeding a stream through a roller in any chunking
/// produces the same hashes as [`compute_hashes`](crate::compute_hashes) on
/// the whole stream.
#[derive(Debug, Clone)]
pub struct WindowRoller<'a, W: HashWord> {
    hasher: &'a RollingHasher<W>,
    ring: Vec<u8>,
    /// Index of the oldest byte once the ring is full.
    head: usize,
    hash: W,
}

impl<'a, W: HashWord> WindowRoller<'a, W> {
    pub fn new(hasher: &'a RollingHasher<W>) -> Self {
        Self {
            hasher,
            ring: Vec::new(),
            head: 0,
            hash: W::ZERO,
        }
    }

    pub fn window_len(&self) -> usize {
        self.hasher.window_len()
    }

    /// Bytes currently held, at most the window length.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.len() == self.hasher.window_len()
    }

    /// Push one byte. Returns the hash of the window ending at this byte, or
    /// `None` while fewer than `w` bytes have been seen.
    pub fn roll_byte(&mut self, byte: u8) -> Option<W> {
        if !self.is_full() {
            self.ring.push(byte);
            self.hash = self
                .hash
                .wrapping_mul(self.hasher.base())
                .wrapping_add(W::from_byte(byte));
            return self.is_full().then_some(self.hash);
        }

        let outgoing = std::mem::replace(&mut self.ring[self.head], byte);
        self.head += 1;
        if self.head == self.ring.len() {
            self.head = 0;
        }
        self.hash = self.hasher.roll_next(self.hash, outgoing, byte);
        Some(self.hash)
    }

    /// Roll every byte of `data`, appending each produced hash to `out`.
    pub fn feed(&mut self, data: &[u8], out: &mut Vec<W>) {
        out.reserve(data.len());
        out.extend(data.iter().filter_map(|&byte| self.roll_byte(byte)));
    }

    /// Forget all buffered bytes, keeping the hasher.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.head = 0;
        self.hash = W::ZERO;
    }
}
